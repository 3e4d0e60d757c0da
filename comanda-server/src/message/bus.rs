//! Message bus core
//!
//! # Message flow
//!
//! ```text
//! Engine/Fanout ──▶ publish() ──▶ server_tx ──▶ connected clients
//! Client        ──▶ handshake ──▶ client_tx ──▶ server log
//! ```
//!
//! Publishing is fire-and-forget: a send with no active receivers is
//! not an error worth surfacing to the caller.

use std::sync::Arc;

use dashmap::DashMap;
use shared::message::BusMessage;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::ConnectedClient;
use super::transport::{MemoryTransport, TcpTransport, Transport};
use crate::utils::AppError;

/// Configuration for the transport layer
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tcp_listen_addr: String,
    /// Capacity of the broadcast channel (default: 1024)
    pub channel_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tcp_listen_addr: "0.0.0.0:8081".to_string(),
            channel_capacity: 1024,
        }
    }
}

/// Message bus - routing and client management
#[derive(Debug, Clone)]
pub struct MessageBus {
    /// Client → server messages (handshakes)
    client_tx: broadcast::Sender<BusMessage>,
    /// Server → clients broadcast channel
    server_tx: broadcast::Sender<BusMessage>,
    pub(crate) config: TransportConfig,
    shutdown_token: CancellationToken,
    /// Connected clients (client id → transport)
    clients: Arc<DashMap<String, (Arc<dyn Transport>, Option<std::net::SocketAddr>)>>,
}

impl std::fmt::Debug for dyn Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<Transport>")
    }
}

impl MessageBus {
    /// Create a bus with default configuration
    pub fn new() -> Self {
        Self::from_config(TransportConfig::default())
    }

    /// Create a bus from configuration
    pub fn from_config(config: TransportConfig) -> Self {
        let capacity = config.channel_capacity;
        let (client_tx, _) = broadcast::channel(capacity);
        let (server_tx, _) = broadcast::channel(capacity);
        Self {
            client_tx,
            server_tx,
            config,
            shutdown_token: CancellationToken::new(),
            clients: Arc::new(DashMap::new()),
        }
    }

    /// Publish a message (server → all subscribers)
    ///
    /// Returns Ok even with zero receivers - delivery is best-effort.
    pub fn publish(&self, msg: BusMessage) -> Result<(), AppError> {
        if self.server_tx.send(msg).is_err() {
            tracing::debug!("Bus publish with no active receivers");
        }
        Ok(())
    }

    /// Subscribe to server broadcasts (clients use this)
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.server_tx.subscribe()
    }

    /// Subscribe to client messages (server side)
    pub fn subscribe_to_clients(&self) -> broadcast::Receiver<BusMessage> {
        self.client_tx.subscribe()
    }

    /// Get a memory transport for in-process subscribers
    pub fn memory_transport(&self) -> MemoryTransport {
        MemoryTransport::new(&self.server_tx)
    }

    /// Get a client memory transport that can also write to the server
    pub fn client_memory_transport(&self) -> MemoryTransport {
        MemoryTransport::with_client_sender(&self.server_tx, &self.client_tx)
    }

    /// Broadcast sender (advanced use)
    pub fn sender(&self) -> &broadcast::Sender<BusMessage> {
        &self.server_tx
    }

    /// Shutdown token (for monitoring shutdown signals)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// Connected client list (diagnostics)
    pub fn get_connected_clients(&self) -> Vec<ConnectedClient> {
        self.clients
            .iter()
            .map(|entry| ConnectedClient {
                id: entry.key().clone(),
                addr: entry.value().1,
            })
            .collect()
    }

    /// Gracefully shut down the bus, cancelling the TCP server
    pub fn shutdown(&self) {
        tracing::info!("Shutting down message bus");
        self.shutdown_token.cancel();
    }

    /// Start the TCP server for external dashboard clients
    ///
    /// 1. Accepts connections
    /// 2. Forwards server broadcasts to each connected client
    /// 3. Reads client messages (handshakes) into `client_tx`
    /// 4. Stops on the shutdown token
    pub async fn start_tcp_server(&self) -> Result<(), AppError> {
        let listener = TcpListener::bind(&self.config.tcp_listen_addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind: {}", e)))?;

        tracing::info!(
            "Message bus TCP server listening on {}",
            self.config.tcp_listen_addr
        );

        let server_tx = self.server_tx.clone();
        let client_tx = self.client_tx.clone();
        let shutdown_token = self.shutdown_token.clone();
        let clients = self.clients.clone();

        loop {
            tokio::select! {
                _ = shutdown_token.cancelled() => {
                    tracing::info!("Message bus TCP server shutting down");
                    break;
                }

                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            tracing::info!("Client connected: {}", addr);

                            let client_id = Uuid::new_v4().to_string();
                            let transport: Arc<dyn Transport> =
                                Arc::new(TcpTransport::from_stream(stream));
                            clients.insert(client_id.clone(), (transport.clone(), Some(addr)));

                            let mut rx = server_tx.subscribe();
                            let transport_clone = transport.clone();
                            let forward_shutdown = shutdown_token.clone();

                            // Forward server broadcasts to this client
                            tokio::spawn(async move {
                                loop {
                                    tokio::select! {
                                        _ = forward_shutdown.cancelled() => {
                                            break;
                                        }
                                        msg_result = rx.recv() => {
                                            match msg_result {
                                                Ok(msg) => {
                                                    if let Err(e) = transport_clone.write_message(&msg).await {
                                                        tracing::info!("Client {} disconnected: {}", addr, e);
                                                        break;
                                                    }
                                                }
                                                Err(broadcast::error::RecvError::Lagged(n)) => {
                                                    // Dropped frames are recovered by the
                                                    // client's refresh-on-load, keep going
                                                    tracing::warn!("Client {} lagged, {} messages dropped", addr, n);
                                                }
                                                Err(_) => break,
                                            }
                                        }
                                    }
                                }
                            });

                            // Read client messages (handshakes)
                            let client_tx_clone = client_tx.clone();
                            let read_shutdown = shutdown_token.clone();
                            let clients_map = clients.clone();
                            tokio::spawn(async move {
                                loop {
                                    tokio::select! {
                                        _ = read_shutdown.cancelled() => {
                                            break;
                                        }
                                        read_result = transport.read_message() => {
                                            match read_result {
                                                Ok(msg) => {
                                                    if client_tx_clone.send(msg).is_err() {
                                                        tracing::debug!("No server-side receiver for client message");
                                                    }
                                                }
                                                Err(e) => {
                                                    tracing::info!("Client {} read error: {}", addr, e);
                                                    break;
                                                }
                                            }
                                        }
                                    }
                                }
                                clients_map.remove(&client_id);
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Transport;
    use shared::message::{Channel, EventType, NotificationPayload, SyncPayload};

    #[tokio::test]
    async fn memory_transport_receives_published_messages() {
        let bus = MessageBus::new();
        let transport = bus.memory_transport();

        let payload = NotificationPayload::new("TableAssigned", "Table T1 assigned");
        bus.publish(BusMessage::notification(&payload)).unwrap();

        let received = transport.read_message().await.unwrap();
        assert_eq!(received.event_type, EventType::Notification);
        assert_eq!(received.channel, Channel::ReceptionNotifications);

        let parsed: NotificationPayload = received.parse_payload().unwrap();
        assert_eq!(parsed.event, "TableAssigned");
    }

    #[tokio::test]
    async fn every_subscriber_sees_the_broadcast() {
        let bus = MessageBus::new();
        let t1 = bus.memory_transport();
        let t2 = bus.memory_transport();

        let payload = SyncPayload {
            resource: "order".to_string(),
            version: 1,
            action: "created".to_string(),
            id: "order:o1".to_string(),
            data: None,
        };
        bus.publish(BusMessage::sync(&payload)).unwrap();

        let r1 = t1.read_message().await.unwrap();
        let r2 = t2.read_message().await.unwrap();
        assert_eq!(r1.event_type, EventType::Sync);
        assert_eq!(r2.event_type, EventType::Sync);
        assert_eq!(r1.channel, Channel::RestaurantUpdates);
    }

    #[tokio::test]
    async fn publish_without_receivers_is_not_an_error() {
        let bus = MessageBus::new();
        let payload = NotificationPayload::new("OrderUpdated", "no one is listening");
        assert!(bus.publish(BusMessage::notification(&payload)).is_ok());
    }

    #[tokio::test]
    async fn tcp_roundtrip_delivers_frames() {
        let bus = MessageBus::from_config(TransportConfig {
            tcp_listen_addr: "127.0.0.1:0".to_string(),
            channel_capacity: 16,
        });

        // Bind manually so the test knows the ephemeral port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server_tx = bus.sender().clone();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let transport = TcpTransport::from_stream(stream);
            let mut rx = server_tx.subscribe();
            let msg = rx.recv().await.unwrap();
            transport.write_message(&msg).await.unwrap();
        });

        let client = TcpTransport::connect(&addr.to_string()).await.unwrap();

        let payload = NotificationPayload::new("OrderCancelled", "Order order:o9 cancelled");
        let sent = BusMessage::notification(&payload);
        bus.publish(sent.clone()).unwrap();

        let received = client.read_message().await.unwrap();
        assert_eq!(received, sent);
    }
}
