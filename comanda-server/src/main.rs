use comanda_server::{Config, Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment (dotenv, logging)
    setup_environment()?;

    tracing::info!("Comanda server starting...");

    // 2. Configuration
    let config = Config::from_env();

    // 3. State (database, bus, auth)
    let state = ServerState::initialize(&config).await;

    // 4. HTTP server + message bus
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
