//! Table API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    DiningTable, DiningTableCreate, DiningTableUpdate, OrderDetail, OrderSummary, Reservation,
    TableLayout,
};
use crate::db::repository::{DiningTableRepository, OrderRepository};
use crate::orders::AssignTableRequest;
use crate::utils::{AppError, AppResult};
use shared::TableStatus;
use shared::util::now_millis;

/// Table with its current (non-terminal) order, if any
#[derive(Debug, Serialize)]
pub struct TableOverview {
    #[serde(flatten)]
    pub table: DiningTable,
    pub current_order: Option<OrderSummary>,
}

#[derive(Debug, Default, Serialize)]
pub struct TableStats {
    pub total: usize,
    pub available: usize,
    pub occupied: usize,
    pub reserved: usize,
    pub maintenance: usize,
}

#[derive(Debug, Serialize)]
pub struct TablesOverviewResponse {
    pub tables: Vec<TableOverview>,
    pub stats: TableStats,
}

/// Build the tables overview shared by the tables and reception views
pub(crate) async fn build_overview(state: &ServerState) -> AppResult<TablesOverviewResponse> {
    let tables = DiningTableRepository::new(state.db.clone()).find_all().await?;
    let orders = OrderRepository::new(state.db.clone());

    let mut stats = TableStats {
        total: tables.len(),
        ..Default::default()
    };
    let mut overview = Vec::with_capacity(tables.len());

    for table in tables {
        match table.status {
            TableStatus::Available => stats.available += 1,
            TableStatus::Occupied => stats.occupied += 1,
            TableStatus::Reserved => stats.reserved += 1,
            TableStatus::Maintenance => stats.maintenance += 1,
        }

        let current_order = match &table.id {
            Some(id) => match orders.find_active_by_table(id).await? {
                Some(order) => {
                    let rec = order.id.clone();
                    let items_count = match &rec {
                        Some(r) => orders.find_items(r).await?.len(),
                        None => 0,
                    };
                    Some(OrderSummary {
                        id: order.id_string(),
                        status: order.status,
                        total_amount: order.total_amount,
                        items_count,
                    })
                }
                None => None,
            },
            None => None,
        };

        overview.push(TableOverview {
            table,
            current_order,
        });
    }

    Ok(TablesOverviewResponse {
        tables: overview,
        stats,
    })
}

/// GET /api/tables
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<TablesOverviewResponse>> {
    Ok(Json(build_overview(&state).await?))
}

/// GET /api/tables/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DiningTable>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))?;
    Ok(Json(table))
}

/// POST /api/tables
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    crate::utils::validation::validate_name(&payload.name, "name")?;
    if let Some(capacity) = payload.capacity
        && !(1..=20).contains(&capacity)
    {
        return Err(AppError::validation("capacity must be between 1 and 20"));
    }

    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo.create(payload).await?;

    state.broadcast_sync(
        "dining_table",
        "created",
        &table.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
        Some(&table),
    );
    Ok(Json(table))
}

/// PATCH /api/tables/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo.update(&id, payload).await?;

    state.fanout().table_status_changed(&table).await?;
    Ok(Json(table))
}

/// DELETE /api/tables/{id}
///
/// Refused while the table has a non-terminal order.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))?;

    if let Some(rec) = &table.id
        && OrderRepository::new(state.db.clone())
            .find_active_by_table(rec)
            .await?
            .is_some()
    {
        return Err(AppError::business_rule(
            "Cannot delete table with active orders",
        ));
    }

    let result = repo.delete(&id).await?;
    if result {
        state.broadcast_sync::<()>("dining_table", "deleted", &id, None);
    }
    Ok(Json(result))
}

#[derive(Debug, Serialize)]
pub struct AssignResponse {
    pub message: String,
    pub order: OrderDetail,
}

/// POST /api/tables/{id}/assign
pub async fn assign(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<AssignTableRequest>,
) -> AppResult<Json<AssignResponse>> {
    let order = state
        .order_engine()
        .assign_table(&user.actor(), &id, payload)
        .await?;
    Ok(Json(AssignResponse {
        message: "Table assigned successfully".to_string(),
        order,
    }))
}

#[derive(Debug, Serialize)]
pub struct UnassignResponse {
    pub message: String,
    pub table: DiningTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_order: Option<OrderDetail>,
}

/// POST /api/tables/{id}/unassign
pub async fn unassign(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<UnassignResponse>> {
    let (table, cancelled_order) = state
        .order_engine()
        .unassign_table(&user.actor(), &id)
        .await?;
    Ok(Json(UnassignResponse {
        message: "Table cleared successfully".to_string(),
        table,
        cancelled_order,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    /// Reservation time (Unix millis), must be in the future
    pub reservation_time: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_count: i32,
}

/// POST /api/tables/{id}/reserve
pub async fn reserve(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ReserveRequest>,
) -> AppResult<Json<DiningTable>> {
    crate::utils::validation::validate_name(&payload.customer_name, "customer_name")?;
    if payload.reservation_time <= now_millis() {
        return Err(AppError::validation("reservation_time must be in the future"));
    }

    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))?;
    if payload.customer_count < 1 || payload.customer_count > table.capacity {
        return Err(AppError::validation(format!(
            "customer_count must be between 1 and {}",
            table.capacity
        )));
    }
    let rec = table
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Table without id"))?;

    let reserved = repo
        .try_reserve(
            &rec,
            Reservation {
                time: payload.reservation_time,
                customer_name: payload.customer_name,
                customer_phone: payload.customer_phone,
                customer_count: payload.customer_count,
            },
        )
        .await?
        .ok_or_else(|| AppError::conflict(format!("Table {} is not available", table.name)))?;

    state.fanout().table_status_changed(&reserved).await?;
    Ok(Json(reserved))
}

/// Layout entry with a default grid fallback for tables that were
/// never placed on the floor plan
#[derive(Debug, Serialize)]
pub struct LayoutEntry {
    pub id: String,
    pub name: String,
    pub capacity: i32,
    pub status: TableStatus,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub layout: Vec<LayoutEntry>,
    pub total_tables: usize,
}

/// GET /api/tables/layout
pub async fn get_layout(State(state): State<ServerState>) -> AppResult<Json<LayoutResponse>> {
    let tables = DiningTableRepository::new(state.db.clone()).find_all().await?;

    let layout: Vec<LayoutEntry> = tables
        .into_iter()
        .enumerate()
        .map(|(i, table)| {
            let rect = table.layout.unwrap_or(TableLayout {
                x: ((i % 4) * 120) as f64,
                y: ((i / 4) * 120) as f64,
                width: 100.0,
                height: 100.0,
            });
            LayoutEntry {
                id: table.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
                name: table.name,
                capacity: table.capacity,
                status: table.status,
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
            }
        })
        .collect();

    let total_tables = layout.len();
    Ok(Json(LayoutResponse {
        layout,
        total_tables,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LayoutUpdateEntry {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Deserialize)]
pub struct LayoutUpdateRequest {
    pub tables: Vec<LayoutUpdateEntry>,
}

/// PUT /api/tables/layout
pub async fn update_layout(
    State(state): State<ServerState>,
    Json(payload): Json<LayoutUpdateRequest>,
) -> AppResult<Json<bool>> {
    let repo = DiningTableRepository::new(state.db.clone());
    for entry in payload.tables {
        if entry.width < 50.0 || entry.height < 50.0 {
            return Err(AppError::validation(
                "layout width/height must be at least 50",
            ));
        }
        repo.update_layout(
            &entry.id,
            TableLayout {
                x: entry.x,
                y: entry.y,
                width: entry.width,
                height: entry.height,
            },
        )
        .await?;
    }
    Ok(Json(true))
}
