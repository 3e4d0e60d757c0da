//! Server state

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::models::EmployeeCreate;
use crate::db::repository::EmployeeRepository;
use crate::message::{BusMessage, MessageBus, SyncPayload, TransportConfig};
use crate::orders::OrderEngine;
use crate::services::Fanout;
use shared::Role;

/// Per-resource broadcast version counters
///
/// Lock-free via DashMap; each resource kind keeps an independent
/// monotonic counter so clients can detect missed sync events.
#[derive(Debug, Default)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// Increment the counter for a resource and return the new value
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Current counter for a resource (0 if never bumped)
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

/// Server state - shared handles for every request
///
/// Cloning is shallow (Arc everywhere it matters).
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    /// Embedded database (SurrealDB)
    pub db: Surreal<Db>,
    /// Real-time message bus
    pub message_bus: Arc<MessageBus>,
    /// JWT service
    pub jwt_service: Arc<JwtService>,
    /// Per-resource broadcast versions
    pub resource_versions: Arc<ResourceVersions>,
}

impl ServerState {
    /// Initialize the server state
    ///
    /// 1. Ensure the work directory structure exists
    /// 2. Open the database (work_dir/database/comanda.db)
    /// 3. Construct bus and JWT services
    /// 4. Seed the default owner account on an empty staff table
    ///
    /// # Panics
    ///
    /// Panics when the database cannot be opened - the server cannot
    /// run without it.
    pub async fn initialize(config: &Config) -> Self {
        let db_dir = config.database_dir();
        std::fs::create_dir_all(&db_dir).expect("Failed to create database directory");
        std::fs::create_dir_all(config.log_dir()).expect("Failed to create log directory");

        let db_path = db_dir.join("comanda.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");
        let db = db_service.db;

        let message_bus = Arc::new(MessageBus::from_config(TransportConfig {
            tcp_listen_addr: format!("0.0.0.0:{}", config.message_tcp_port),
            ..Default::default()
        }));
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let resource_versions = Arc::new(ResourceVersions::new());

        let state = Self {
            config: config.clone(),
            db,
            message_bus,
            jwt_service,
            resource_versions,
        };

        state.seed_default_owner().await;
        state
    }

    /// Construct the fan-out service
    pub fn fanout(&self) -> Fanout {
        Fanout::new(
            self.db.clone(),
            self.message_bus.clone(),
            self.resource_versions.clone(),
        )
    }

    /// Construct the order engine
    pub fn order_engine(&self) -> OrderEngine {
        OrderEngine::new(self.db.clone(), self.fanout())
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// Broadcast a resource sync event to all connected clients
    ///
    /// The version is bumped per resource so clients can detect gaps.
    pub fn broadcast_sync<T: serde::Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: &str,
        data: Option<&T>,
    ) {
        let version = self.resource_versions.increment(resource);
        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action: action.to_string(),
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        if let Err(e) = self.message_bus.publish(BusMessage::sync(&payload)) {
            tracing::warn!(error = %e, "Sync broadcast failed");
        }
    }

    /// Create the default owner account when the staff table is empty
    ///
    /// Credentials come from ADMIN_USERNAME/ADMIN_PASSWORD, defaulting
    /// to admin/admin with a loud warning.
    async fn seed_default_owner(&self) {
        let repo = EmployeeRepository::new(self.db.clone());
        match repo.find_all().await {
            Ok(list) if list.is_empty() => {
                let username =
                    std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
                let password =
                    std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());
                if password == "admin" {
                    tracing::warn!(
                        "Seeding default owner account with the default password - change it"
                    );
                }
                if let Err(e) = repo
                    .create(EmployeeCreate {
                        username: username.clone(),
                        password,
                        display_name: Some("Owner".to_string()),
                        role: Role::Owner,
                    })
                    .await
                {
                    tracing::error!(error = %e, "Failed to seed default owner");
                } else {
                    tracing::info!(username = %username, "Seeded default owner account");
                }
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Failed to inspect staff table"),
        }
    }
}
