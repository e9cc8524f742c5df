use std::collections::HashMap;
use tokio::sync::RwLock;

/// Read-through cache of store records, keyed by document id. The store stays
/// authoritative: entries are replaced with store truth after a successful
/// mutation and invalidated after a failed one, never patched speculatively.
pub struct RecordCache<T> {
    entries: RwLock<HashMap<String, T>>,
}

impl<T: Clone> RecordCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.entries.read().await.get(id).cloned()
    }

    pub async fn put(&self, id: &str, record: T) {
        self.entries.write().await.insert(id.to_string(), record);
    }

    pub async fn invalidate(&self, id: &str) {
        self.entries.write().await.remove(id);
    }

    /// Replace the whole cache with a freshly fetched window.
    pub async fn replace_all(&self, records: impl IntoIterator<Item = (String, T)>) {
        let mut guard = self.entries.write().await;
        guard.clear();
        guard.extend(records);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<T: Clone> Default for RecordCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
