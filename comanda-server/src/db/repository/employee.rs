//! Employee Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Employee, EmployeeCreate};
use shared::Role;
use shared::util::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "employee";

#[derive(Clone)]
pub struct EmployeeRepository {
    base: BaseRepository,
}

impl EmployeeRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All employees, ordered by username
    pub async fn find_all(&self) -> RepoResult<Vec<Employee>> {
        let employees: Vec<Employee> = self
            .base
            .db()
            .query("SELECT * FROM employee ORDER BY username")
            .await?
            .take(0)?;
        Ok(employees)
    }

    /// Find employee by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Employee>> {
        let thing = parse_record_id(id, TABLE)?;
        self.find_by_record(&thing).await
    }

    /// Find employee by record id
    pub async fn find_by_record(&self, id: &RecordId) -> RepoResult<Option<Employee>> {
        let employee: Option<Employee> = self.base.db().select(id.clone()).await?;
        Ok(employee)
    }

    /// Find employee by username
    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<Employee>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM employee WHERE username = $username LIMIT 1")
            .bind(("username", username.to_string()))
            .await?;
        let employees: Vec<Employee> = result.take(0)?;
        Ok(employees.into_iter().next())
    }

    /// Active employees holding a role - the fan-out recipient query
    pub async fn find_active_by_role(&self, role: Role) -> RepoResult<Vec<Employee>> {
        let employees: Vec<Employee> = self
            .base
            .db()
            .query("SELECT * FROM employee WHERE role = $role AND is_active = true")
            .bind(("role", role.as_str().to_string()))
            .await?
            .take(0)?;
        Ok(employees)
    }

    /// Create an employee with an argon2-hashed password
    pub async fn create(&self, data: EmployeeCreate) -> RepoResult<Employee> {
        if self.find_by_username(&data.username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                data.username
            )));
        }

        let hash_pass = Employee::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Password hashing failed: {}", e)))?;

        let employee = Employee {
            id: None,
            display_name: data.display_name.unwrap_or_else(|| data.username.clone()),
            username: data.username,
            hash_pass,
            role: data.role,
            is_active: true,
            created_at: now_millis(),
        };

        let created: Option<Employee> = self.base.db().create(TABLE).content(employee).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create employee".to_string()))
    }

    /// Toggle the active flag, returning the new state
    pub async fn toggle_active(&self, id: &str) -> RepoResult<Employee> {
        let thing = parse_record_id(id, TABLE)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET is_active = !is_active RETURN AFTER")
            .bind(("thing", thing))
            .await?;
        let updated: Vec<Employee> = result.take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Employee {} not found", id)))
    }
}
