//! Dining Table Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{DiningTable, DiningTableCreate, DiningTableUpdate, Reservation, TableLayout};
use shared::TableStatus;
use shared::util::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "dining_table";

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active dining tables, ordered by name
    pub async fn find_all(&self) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE is_active = true ORDER BY name")
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<DiningTable>> {
        let thing = parse_record_id(id, TABLE)?;
        let table: Option<DiningTable> = self.base.db().select(thing).await?;
        Ok(table)
    }

    /// Find table by name
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Create a new dining table
    pub async fn create(&self, data: DiningTableCreate) -> RepoResult<DiningTable> {
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Table '{}' already exists",
                data.name
            )));
        }

        let table = DiningTable {
            id: None,
            name: data.name,
            capacity: data.capacity.unwrap_or(4),
            status: TableStatus::Available,
            reservation: None,
            layout: data.layout,
            is_active: true,
            created_at: now_millis(),
        };

        let created: Option<DiningTable> = self.base.db().create(TABLE).content(table).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create dining table".to_string()))
    }

    /// Update a dining table
    pub async fn update(&self, id: &str, data: DiningTableUpdate) -> RepoResult<DiningTable> {
        let thing = parse_record_id(id, TABLE)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", id)))?;

        if let Some(name) = data.name.as_ref()
            && let Some(found) = self.find_by_name(name).await?
            && found.id != existing.id
        {
            return Err(RepoError::Duplicate(format!(
                "Table '{}' already exists",
                name
            )));
        }

        let name = data.name.unwrap_or(existing.name);
        let capacity = data.capacity.unwrap_or(existing.capacity);
        let status = data.status.unwrap_or(existing.status);
        let layout = data.layout.or(existing.layout);
        let is_active = data.is_active.unwrap_or(existing.is_active);

        self.base
            .db()
            .query("UPDATE $thing SET name = $name, capacity = $capacity, status = $status, layout = $layout, is_active = $is_active")
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("capacity", capacity))
            .bind(("status", status.as_str().to_string()))
            .bind(("layout", layout))
            .bind(("is_active", is_active))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Dining table {} not found", id)))
    }

    /// Update only the layout rectangle
    pub async fn update_layout(&self, id: &str, layout: TableLayout) -> RepoResult<()> {
        let thing = parse_record_id(id, TABLE)?;
        self.base
            .db()
            .query("UPDATE $thing SET layout = $layout")
            .bind(("thing", thing))
            .bind(("layout", layout))
            .await?;
        Ok(())
    }

    /// Conditionally transition a table's status
    ///
    /// The update only applies while the current status is one of
    /// `from`; returns `None` when the precondition no longer holds,
    /// which is how two racing claims are decided - the loser sees
    /// `None` and reports a conflict, with no state change.
    pub async fn try_set_status(
        &self,
        id: &RecordId,
        from: &[TableStatus],
        to: TableStatus,
    ) -> RepoResult<Option<DiningTable>> {
        let allowed: Vec<String> = from.iter().map(|s| s.as_str().to_string()).collect();
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET status = $to, reservation = NONE WHERE status INSIDE $allowed RETURN AFTER")
            .bind(("thing", id.clone()))
            .bind(("to", to.as_str().to_string()))
            .bind(("allowed", allowed))
            .await?;
        let updated: Vec<DiningTable> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Reserve an available table
    pub async fn try_reserve(
        &self,
        id: &RecordId,
        reservation: Reservation,
    ) -> RepoResult<Option<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET status = 'reserved', reservation = $reservation WHERE status = 'available' RETURN AFTER")
            .bind(("thing", id.clone()))
            .bind(("reservation", reservation))
            .await?;
        let updated: Vec<DiningTable> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Hard delete a dining table
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id, TABLE)?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
