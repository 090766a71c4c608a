//! Read-through cache of current field content.
//!
//! Owned by the [`EditSession`](crate::session::EditSession) that composes it.
//! Entries are populated on first read and the whole cache is cleared after
//! every successful save; serving a stale entry after a save is a bug.

use std::collections::HashMap;

/// A cached lookup: `Some(content)` for saved fields, `None` for keys the
/// ledger reported as never saved.
pub type CachedContent = Option<String>;

#[derive(Debug, Clone, Default)]
pub struct TextCache {
    entries: HashMap<String, CachedContent>,
}

impl TextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached lookup result for `key`. The outer `None` is a cache miss.
    pub fn get(&self, key: &str) -> Option<&CachedContent> {
        self.entries.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, content: CachedContent) {
        self.entries.insert(key.into(), content);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_then_hit() {
        let mut cache = TextCache::new();
        assert!(cache.get("k").is_none());

        cache.set("k", Some("v".to_string()));
        assert_eq!(cache.get("k"), Some(&Some("v".to_string())));
    }

    #[test]
    fn absent_keys_are_cached_as_none() {
        let mut cache = TextCache::new();
        cache.set("missing", None);
        assert_eq!(cache.get("missing"), Some(&None));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_drops_all_entries() {
        let mut cache = TextCache::new();
        cache.set("a", Some("1".to_string()));
        cache.set("b", None);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }
}
