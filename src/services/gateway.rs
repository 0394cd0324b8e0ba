use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::RwLock;

use crate::models::Notification;

/// Duplex channel registry, one entry per live client connection
///
/// The networking layer opens a channel per connection and drains the
/// receiver (SSE, WebSocket, whatever it chooses); MatchEngine pushes
/// notifications into the sender. Delivery is fire-and-forget: a missing or
/// torn-down connection is a no-op, never an error, because disconnect races
/// are expected.
#[derive(Debug, Default)]
pub struct ConnectionGateway {
    connections: RwLock<HashMap<String, ConnectionHandle>>,
    next_epoch: AtomicU64,
}

#[derive(Debug)]
struct ConnectionHandle {
    sender: mpsc::UnboundedSender<Notification>,
    epoch: u64,
}

impl ConnectionGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or re-open) the channel for a connection
    ///
    /// Replaces any previous channel; the returned epoch identifies this
    /// binding so a stale stream's teardown cannot close its replacement.
    pub async fn open(&self, connection_id: &str) -> (u64, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed);

        let mut connections = self.connections.write().await;
        if connections
            .insert(connection_id.to_string(), ConnectionHandle { sender, epoch })
            .is_some()
        {
            tracing::debug!("Replaced gateway channel for connection {}", connection_id);
        }

        (epoch, receiver)
    }

    /// Deliver a notification to a connection; silently dropped if the
    /// connection is gone or its receiver has been torn down
    pub async fn deliver(&self, connection_id: &str, notification: Notification) {
        let connections = self.connections.read().await;
        match connections.get(connection_id) {
            Some(handle) => {
                if handle.sender.send(notification).is_err() {
                    tracing::trace!(
                        "Dropped notification for connection {} (receiver gone)",
                        connection_id
                    );
                }
            }
            None => {
                tracing::trace!("Dropped notification for unknown connection {}", connection_id);
            }
        }
    }

    /// Close a connection's channel; no-op if unknown
    pub async fn close(&self, connection_id: &str) {
        let mut connections = self.connections.write().await;
        connections.remove(connection_id);
    }

    /// Close only if the stored binding still carries `epoch`
    ///
    /// Returns true when this call actually removed the channel. Used by
    /// stream teardown: a reconnect bumps the epoch, so the old stream's drop
    /// must not disturb the new binding.
    pub async fn close_if_current(&self, connection_id: &str, epoch: u64) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get(connection_id) {
            Some(handle) if handle.epoch == epoch => {
                connections.remove(connection_id);
                true
            }
            _ => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_open(&self, connection_id: &str) -> bool {
        self.connections.read().await.contains_key(connection_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Developer;

    fn developer(id: &str) -> Developer {
        Developer {
            id: id.to_string(),
            name: format!("Dev {}", id),
            bio: None,
            avatar_url: None,
            latitude: 0.0,
            longitude: 0.0,
            techs: vec!["go".to_string()],
        }
    }

    #[tokio::test]
    async fn test_open_deliver_receive() {
        let gateway = ConnectionGateway::new();
        let (_epoch, mut rx) = gateway.open("conn-1").await;

        gateway.deliver("conn-1", Notification::new(developer("a"))).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.developer.id, "a");
    }

    #[tokio::test]
    async fn test_deliver_to_unknown_connection_is_noop() {
        let gateway = ConnectionGateway::new();
        gateway.deliver("ghost", Notification::new(developer("a"))).await;
    }

    #[tokio::test]
    async fn test_deliver_after_receiver_dropped_is_noop() {
        let gateway = ConnectionGateway::new();
        let (_epoch, rx) = gateway.open("conn-1").await;
        drop(rx);

        gateway.deliver("conn-1", Notification::new(developer("a"))).await;
    }

    #[tokio::test]
    async fn test_reopen_replaces_channel() {
        let gateway = ConnectionGateway::new();
        let (_old_epoch, mut old_rx) = gateway.open("conn-1").await;
        let (_new_epoch, mut new_rx) = gateway.open("conn-1").await;

        gateway.deliver("conn-1", Notification::new(developer("a"))).await;

        assert!(old_rx.try_recv().is_err());
        assert_eq!(new_rx.try_recv().unwrap().developer.id, "a");
    }

    #[tokio::test]
    async fn test_close_if_current_ignores_stale_epoch() {
        let gateway = ConnectionGateway::new();
        let (old_epoch, _old_rx) = gateway.open("conn-1").await;
        let (new_epoch, _new_rx) = gateway.open("conn-1").await;

        // Teardown of the replaced stream must leave the new binding alone
        assert!(!gateway.close_if_current("conn-1", old_epoch).await);
        assert!(gateway.is_open("conn-1").await);

        assert!(gateway.close_if_current("conn-1", new_epoch).await);
        assert!(!gateway.is_open("conn-1").await);
    }

    #[tokio::test]
    async fn test_close_unknown_is_noop() {
        let gateway = ConnectionGateway::new();
        gateway.close("ghost").await;
        assert_eq!(gateway.len().await, 0);
    }
}
