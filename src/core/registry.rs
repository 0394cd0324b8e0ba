use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::models::{Region, Subscription};

/// Registry of live subscriptions, one per connection
///
/// Install replaces atomically, remove is a no-op on unknown connections, and
/// dispatch iterates a point-in-time copy so it never observes a half-updated
/// map. Constructed once per process and shared by handle.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscriptions: RwLock<HashMap<String, Subscription>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the subscription for a connection
    ///
    /// `techs` must already be normalized by the caller.
    pub async fn install(&self, connection_id: &str, region: Region, techs: Vec<String>) {
        let subscription = Subscription {
            connection_id: connection_id.to_string(),
            region,
            techs,
        };

        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.insert(connection_id.to_string(), subscription);
    }

    /// Drop a connection's subscription; no-op if it has none
    pub async fn remove(&self, connection_id: &str) {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.remove(connection_id);
    }

    /// Point-in-time copy of all active subscriptions
    pub async fn snapshot(&self) -> Vec<Subscription> {
        let subscriptions = self.subscriptions.read().await;
        subscriptions.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    pub async fn get(&self, connection_id: &str) -> Option<Subscription> {
        self.subscriptions.read().await.get(connection_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_then_snapshot() {
        let registry = SubscriptionRegistry::new();
        registry
            .install("conn-1", Region::new(0.0, 0.0, 10.0), vec!["go".to_string()])
            .await;

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].connection_id, "conn-1");
        assert_eq!(snapshot[0].techs, vec!["go".to_string()]);
    }

    #[tokio::test]
    async fn test_install_replaces_previous() {
        let registry = SubscriptionRegistry::new();
        registry
            .install("conn-1", Region::new(0.0, 0.0, 10.0), vec!["go".to_string()])
            .await;
        registry
            .install("conn-1", Region::new(50.0, 8.0, 25.0), vec!["rust".to_string()])
            .await;

        assert_eq!(registry.len().await, 1);
        let current = registry.get("conn-1").await.unwrap();
        assert_eq!(current.region.radius_km, 25.0);
        assert_eq!(current.techs, vec!["rust".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_unknown_is_noop() {
        let registry = SubscriptionRegistry::new();
        registry.remove("never-installed").await;
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_install_after_remove_recreates() {
        let registry = SubscriptionRegistry::new();
        registry
            .install("conn-1", Region::new(0.0, 0.0, 10.0), vec![])
            .await;
        registry.remove("conn-1").await;
        assert!(registry.get("conn-1").await.is_none());

        registry
            .install("conn-1", Region::new(1.0, 1.0, 5.0), vec![])
            .await;
        assert!(registry.get("conn-1").await.is_some());
    }

    #[tokio::test]
    async fn test_snapshot_is_a_copy() {
        let registry = SubscriptionRegistry::new();
        registry
            .install("conn-1", Region::new(0.0, 0.0, 10.0), vec![])
            .await;

        let snapshot = registry.snapshot().await;
        registry.remove("conn-1").await;

        // The copy taken before the removal is unaffected
        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len().await, 0);
    }
}
