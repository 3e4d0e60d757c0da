//! Server Implementation
//!
//! HTTP server startup and shutdown.

use crate::core::{Config, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (shared with tests/tools)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await,
        };

        // Message bus TCP server for dashboard clients
        let bus = state.message_bus.clone();
        tokio::spawn(async move {
            if let Err(e) = bus.start_tcp_server().await {
                tracing::error!("Message bus TCP server failed: {}", e);
            }
        });

        let app = crate::api::router(state.clone());

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("Comanda server listening on {}", addr);
        tracing::info!(
            "Message bus on tcp://0.0.0.0:{}",
            self.config.message_tcp_port
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await?;

        state.message_bus.shutdown();
        Ok(())
    }
}
