//! Compiled matcher memoisation
//!
//! Compilation dominates scrubber construction, and the same identifier
//! (a common surname, a shared GP surgery postcode) recurs across many
//! patients. [`MatcherCache`] shares compiled matchers between scrubbers
//! through a bounded moka cache keyed by method, normalised value and the
//! fingerprint of the configuration that shaped the matcher.

use super::matcher::CompiledMatcher;
use super::rule::RuleKey;
use crate::domain::{Result, ScrubError};
use moka::sync::Cache;
use std::sync::Arc;

/// Cache key: rule identity plus the configuration that built it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatcherCacheKey {
    pub rule: RuleKey,
    pub config_fingerprint: Arc<str>,
}

/// Bounded, thread-safe cache of compiled matchers
pub struct MatcherCache {
    cache: Cache<MatcherCacheKey, Arc<CompiledMatcher>>,
}

impl MatcherCache {
    /// Create a cache holding at most `max_entries` matchers
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_entries).build();
        Self { cache }
    }

    /// Returns the cached matcher for `key`, compiling and storing it on a miss
    ///
    /// Concurrent misses for the same key compile once. Failed compilations
    /// are not cached.
    pub fn get_or_compile<F>(&self, key: MatcherCacheKey, compile: F) -> Result<Arc<CompiledMatcher>>
    where
        F: FnOnce() -> Result<CompiledMatcher>,
    {
        self.cache
            .try_get_with(key, || compile().map(Arc::new))
            .map_err(|e: Arc<ScrubError>| (*e).clone())
    }

    /// Whether a matcher for `key` is cached
    pub fn contains(&self, key: &MatcherCacheKey) -> bool {
        self.cache.contains_key(key)
    }

    /// Approximate number of cached matchers
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached matcher
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl std::fmt::Debug for MatcherCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatcherCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
