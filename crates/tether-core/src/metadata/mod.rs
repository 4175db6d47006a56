use std::sync::Arc;

use dashmap::DashMap;
use tether_model::Metadata;

/// Live key/value annotations attached to the instance.
///
/// Cloning is cheap and every clone sees the same entries. Writes to a single key are
/// atomic; a [`snapshot`](MetadataStore::snapshot) may mix the latest values of
/// different keys from different moments.
#[derive(Clone, Debug, Default)]
pub struct MetadataStore {
    entries: Arc<DashMap<String, String>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given entries.
    pub fn with_entries(initial: &Metadata) -> Self {
        let store = Self::new();
        for (key, value) in initial {
            store.set(key.clone(), value.clone());
        }
        store
    }

    /// Insert or overwrite a value. Last write wins.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Remove a key, returning its last value.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    /// Point-in-time copy, safe to hand to a concurrent sender.
    pub fn snapshot(&self) -> Metadata {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
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
    fn set_and_get() {
        let store = MetadataStore::new();
        assert!(store.get("zone").is_none());

        store.set("zone", "a");
        assert_eq!(store.get("zone").as_deref(), Some("a"));
    }

    #[test]
    fn last_write_wins() {
        let store = MetadataStore::new();
        store.set("version", "1");
        store.set("version", "2");

        assert_eq!(store.get("version").as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clones_share_entries() {
        let store = MetadataStore::new();
        let other = store.clone();

        other.set("k", "v");
        assert_eq!(store.get("k").as_deref(), Some("v"));

        assert_eq!(store.remove("k").as_deref(), Some("v"));
        assert!(other.is_empty());
    }

    #[test]
    fn seeded_from_initial_metadata() {
        let initial = Metadata::from([
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ]);
        let store = MetadataStore::with_entries(&initial);
        assert_eq!(store.snapshot(), initial);
    }

    #[test]
    fn snapshot_is_detached() {
        let store = MetadataStore::new();
        store.set("k", "before");

        let snap = store.snapshot();
        store.set("k", "after");

        assert_eq!(snap["k"], "before");
        assert_eq!(store.get("k").as_deref(), Some("after"));
    }

    #[test]
    fn concurrent_writes_to_distinct_keys_are_all_visible() {
        const WRITERS: usize = 8;
        const PER_WRITER: usize = 250;

        let store = MetadataStore::new();
        std::thread::scope(|s| {
            for w in 0..WRITERS {
                let store = store.clone();
                s.spawn(move || {
                    for i in 0..PER_WRITER {
                        store.set(format!("w{w}-k{i}"), format!("{w}:{i}"));
                    }
                });
            }
            // Concurrent reader; must never see a torn value.
            let reader = store.clone();
            s.spawn(move || {
                for _ in 0..50 {
                    for (key, value) in reader.snapshot() {
                        let (w, i) = value.split_once(':').unwrap();
                        assert_eq!(key, format!("w{w}-k{i}"));
                    }
                }
            });
        });

        let snap = store.snapshot();
        assert_eq!(snap.len(), WRITERS * PER_WRITER);
        for w in 0..WRITERS {
            for i in 0..PER_WRITER {
                assert_eq!(snap[&format!("w{w}-k{i}")], format!("{w}:{i}"));
            }
        }
    }
}
