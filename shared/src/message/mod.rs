//! Message bus types
//!
//! Shared between the server and connected dashboard clients, for both
//! in-process (memory) and network (TCP) delivery.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// Wire protocol version
pub const PROTOCOL_VERSION: u16 = 1;

/// Bus event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Client handshake
    Handshake = 0,
    /// Role-scoped notification (reception bell, waiter alerts)
    Notification = 1,
    /// Resource state change (dashboards refetch on receipt)
    Sync = 2,
}

impl TryFrom<u8> for EventType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EventType::Handshake),
            1 => Ok(EventType::Notification),
            2 => Ok(EventType::Sync),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Handshake => write!(f, "handshake"),
            EventType::Notification => write!(f, "notification"),
            EventType::Sync => write!(f, "sync"),
        }
    }
}

/// Named broadcast channels
///
/// Clients subscribe to the bus and filter on the channel carried in
/// each message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Reception bell: table assigned, order cancelled, order updated
    ReceptionNotifications,
    /// Broad state changes consumed by every dashboard
    RestaurantUpdates,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::ReceptionNotifications => "reception-notifications",
            Channel::RestaurantUpdates => "restaurant-updates",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bus message envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event_type: EventType,
    pub channel: Channel,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(event_type: EventType, channel: Channel, payload: Vec<u8>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event_type,
            channel,
            payload,
        }
    }

    /// Handshake message (client → server)
    pub fn handshake(payload: &HandshakePayload) -> Self {
        Self::new(
            EventType::Handshake,
            Channel::RestaurantUpdates,
            serde_json::to_vec(payload).expect("Failed to serialize handshake payload"),
        )
    }

    /// Notification event on the reception channel
    pub fn notification(payload: &NotificationPayload) -> Self {
        Self::new(
            EventType::Notification,
            Channel::ReceptionNotifications,
            serde_json::to_vec(payload).expect("Failed to serialize notification"),
        )
    }

    /// Sync event on the restaurant-updates channel
    pub fn sync(payload: &SyncPayload) -> Self {
        Self::new(
            EventType::Sync,
            Channel::RestaurantUpdates,
            serde_json::to_vec(payload).expect("Failed to serialize sync payload"),
        )
    }

    /// Parse the payload as a concrete type
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_roundtrip() {
        let payload = NotificationPayload::new(
            "TableAssigned",
            "Table T1 has been assigned to Order order:1",
        );
        let msg = BusMessage::notification(&payload);

        assert_eq!(msg.event_type, EventType::Notification);
        assert_eq!(msg.channel, Channel::ReceptionNotifications);
        assert!(!msg.request_id.is_nil());

        let parsed: NotificationPayload = msg.parse_payload().unwrap();
        assert_eq!(parsed.event, "TableAssigned");
    }

    #[test]
    fn sync_goes_to_restaurant_updates() {
        let payload = SyncPayload {
            resource: "dining_table".to_string(),
            version: 3,
            action: "status_changed".to_string(),
            id: "dining_table:t1".to_string(),
            data: None,
        };
        let msg = BusMessage::sync(&payload);
        assert_eq!(msg.channel, Channel::RestaurantUpdates);
        assert_eq!(msg.event_type, EventType::Sync);
    }

    #[test]
    fn event_type_byte_roundtrip() {
        for et in [EventType::Handshake, EventType::Notification, EventType::Sync] {
            assert_eq!(EventType::try_from(et as u8), Ok(et));
        }
        assert!(EventType::try_from(9).is_err());
    }
}
