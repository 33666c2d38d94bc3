use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::models::{Status, StatusEntry};

/// Current status of every configured target.
///
/// The key set is fixed at construction. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct StatusStore {
    inner: Arc<RwLock<HashMap<String, Status>>>,
}

impl StatusStore {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let map = targets
            .into_iter()
            .map(|t| (t.into(), Status::Unknown))
            .collect();
        Self { inner: Arc::new(RwLock::new(map)) }
    }

    /// Point-in-time copy of every entry, in no particular order.
    pub async fn get_all(&self) -> Vec<StatusEntry> {
        let map = self.inner.read().await;
        map.iter()
            .map(|(url, status)| StatusEntry { url: url.clone(), status: *status })
            .collect()
    }

    pub async fn get(&self, target: &str) -> Status {
        self.inner.read().await.get(target).copied().unwrap_or_default()
    }

    /// Overwrites the status of a known target. Unknown targets are ignored
    /// so the key set never grows; returns whether a write happened.
    pub async fn set(&self, target: &str, status: Status) -> bool {
        let mut map = self.inner.write().await;
        match map.get_mut(target) {
            Some(slot) => {
                *slot = status;
                true
            }
            None => {
                warn!(url = target, "Ignoring status update for unconfigured target");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_unknown_for_every_target() {
        let store = StatusStore::new(["a.com", "b.com"]);
        assert_eq!(store.get_all().await.len(), 2);
        assert_eq!(store.get("a.com").await, Status::Unknown);
        assert!(store.get_all().await.iter().all(|e| e.status == Status::Unknown));
    }

    #[tokio::test]
    async fn set_overwrites_known_target() {
        let store = StatusStore::new(["a.com"]);
        assert!(store.set("a.com", Status::Down).await);
        assert_eq!(store.get("a.com").await, Status::Down);
        assert!(store.set("a.com", Status::Up).await);
        assert_eq!(store.get("a.com").await, Status::Up);
    }

    #[tokio::test]
    async fn set_never_adds_keys() {
        let store = StatusStore::new(["a.com"]);
        assert!(!store.set("other.com", Status::Up).await);
        assert_eq!(store.get_all().await.len(), 1);
        assert_eq!(store.get("other.com").await, Status::Unknown);
    }

    #[tokio::test]
    async fn snapshot_is_detached_from_later_writes() {
        let store = StatusStore::new(["a.com"]);
        let snapshot = store.get_all().await;
        store.set("a.com", Status::Up).await;
        assert_eq!(snapshot[0].status, Status::Unknown);
    }

    #[tokio::test]
    async fn concurrent_writers_on_distinct_targets() {
        let targets: Vec<String> = (0..64).map(|i| format!("t{i}.com")).collect();
        let store = StatusStore::new(targets.clone());

        let handles: Vec<_> = targets
            .into_iter()
            .map(|t| {
                let store = store.clone();
                tokio::spawn(async move { store.set(&t, Status::Up).await })
            })
            .collect();
        for h in handles {
            assert!(h.await.unwrap());
        }
        assert!(store.get_all().await.iter().all(|e| e.status == Status::Up));
    }
}
