//! Live push channel registry
//!
//! At most one channel per user; a new connection replaces the old one.
//! Delivery is best effort: nothing is queued for users who are not connected.

use crate::error::Result;
use crate::workflow::Notifier;
use approval_types::{DeliveryOutcome, EmployeeId, NotificationPayload};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identifies one push connection, so a closing socket only unregisters itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Channel {
    connection_id: ConnectionId,
    sender: mpsc::UnboundedSender<Value>,
}

#[derive(Default)]
pub struct ChannelRegistry {
    channels: DashMap<EmployeeId, Channel>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel for `user_id`; the receiver feeds the connection's writer task
    pub fn connect(&self, user_id: EmployeeId) -> (ConnectionId, mpsc::UnboundedReceiver<Value>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::new();

        let previous = self.channels.insert(
            user_id,
            Channel {
                connection_id,
                sender,
            },
        );
        if let Some(previous) = previous {
            log::info!(
                "User {} reconnected, replacing connection {}",
                user_id,
                previous.connection_id
            );
        } else {
            log::info!("User {} connected ({})", user_id, connection_id);
        }

        (connection_id, receiver)
    }

    /// Remove the entry only if it still belongs to `connection_id`
    pub fn disconnect(&self, user_id: EmployeeId, connection_id: ConnectionId) -> bool {
        let removed = self
            .channels
            .remove_if(&user_id, |_, channel| channel.connection_id == connection_id)
            .is_some();
        if removed {
            log::info!("User {} disconnected ({})", user_id, connection_id);
        }
        removed
    }

    pub fn connected_count(&self) -> usize {
        self.channels.len()
    }

    /// Push `payload` to the user's live channel, or skip if there is none
    pub fn notify(&self, target: EmployeeId, payload: Value) -> DeliveryOutcome {
        let connection_id = match self.channels.get(&target) {
            Some(channel) => match channel.sender.send(payload) {
                Ok(()) => return DeliveryOutcome::Sent,
                Err(_) => channel.connection_id,
            },
            None => {
                log::debug!("No channel for user {}, notification skipped", target);
                return DeliveryOutcome::Skipped;
            }
        };

        // Receiver is gone: the socket died without unregistering
        self.disconnect(target, connection_id);
        log::debug!("Channel for user {} was closed, notification skipped", target);
        DeliveryOutcome::Skipped
    }
}

/// In-process fan-out for a coordinator sharing this process
#[async_trait]
impl Notifier for ChannelRegistry {
    async fn notify(&self, target: EmployeeId, payload: NotificationPayload) -> Result<DeliveryOutcome> {
        let value = serde_json::to_value(&payload)?;
        Ok(ChannelRegistry::notify(self, target, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_notify_without_channel_is_skipped() {
        let registry = ChannelRegistry::new();
        assert_eq!(
            registry.notify(EmployeeId::new(1), json!({"requestId": 1})),
            DeliveryOutcome::Skipped
        );
    }

    #[test]
    fn test_last_connect_wins() {
        let registry = ChannelRegistry::new();
        let user = EmployeeId::new(1);
        let (_first_id, mut first) = registry.connect(user);
        let (_second_id, mut second) = registry.connect(user);

        assert_eq!(registry.notify(user, json!({"n": 1})), DeliveryOutcome::Sent);
        assert_eq!(second.try_recv().unwrap(), json!({"n": 1}));
        assert!(first.try_recv().is_err());
        assert_eq!(registry.connected_count(), 1);
    }

    #[test]
    fn test_stale_disconnect_keeps_newer_connection() {
        let registry = ChannelRegistry::new();
        let user = EmployeeId::new(1);
        let (old_id, _old) = registry.connect(user);
        let (new_id, _new) = registry.connect(user);

        assert!(!registry.disconnect(user, old_id));
        assert_eq!(registry.connected_count(), 1);
        assert!(registry.disconnect(user, new_id));
        assert_eq!(registry.connected_count(), 0);
        // Disconnecting twice is a no-op
        assert!(!registry.disconnect(user, new_id));
    }

    #[test]
    fn test_dropped_receiver_is_pruned() {
        let registry = ChannelRegistry::new();
        let user = EmployeeId::new(3);
        let (_id, receiver) = registry.connect(user);
        drop(receiver);

        assert_eq!(registry.notify(user, json!({})), DeliveryOutcome::Skipped);
        assert_eq!(registry.connected_count(), 0);
    }

    #[tokio::test]
    async fn test_notifier_serializes_payload() {
        use approval_types::RequestId;

        let registry = ChannelRegistry::new();
        let (_id, mut receiver) = registry.connect(EmployeeId::new(9));
        let outcome = Notifier::notify(
            &registry,
            EmployeeId::new(9),
            NotificationPayload::rejected(RequestId::new(4), EmployeeId::new(2)),
        )
        .await
        .unwrap();

        assert_eq!(outcome, DeliveryOutcome::Sent);
        let pushed = receiver.recv().await.unwrap();
        assert_eq!(pushed["result"], "rejected");
        assert_eq!(pushed["rejectedBy"], 2);
    }
}
