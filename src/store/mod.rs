//! Persistence boundary for departments and employees.
//!
//! Handlers only ever see `dyn Store`. `PgStore` is what the server runs on;
//! `MemoryStore` has the same semantics without a database.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::department::{Department, DepartmentChanges, DepartmentInput};
use crate::models::employee::{Employee, EmployeeChanges, EmployeeDetail, EmployeeInput};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
        StoreError::Database(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_department(&self, input: DepartmentInput) -> StoreResult<Department>;
    async fn list_departments(&self) -> StoreResult<Vec<Department>>;
    async fn find_department(&self, id: Uuid) -> StoreResult<Option<Department>>;
    /// Returns `None` when no department has this id.
    async fn update_department(&self, id: Uuid, changes: DepartmentChanges) -> StoreResult<Option<Department>>;
    /// Deleting an absent id is not an error.
    async fn delete_department(&self, id: Uuid) -> StoreResult<()>;

    async fn insert_employee(&self, input: EmployeeInput) -> StoreResult<Employee>;
    async fn list_employees(&self) -> StoreResult<Vec<EmployeeDetail>>;
    async fn find_employee(&self, id: Uuid) -> StoreResult<Option<EmployeeDetail>>;
    async fn update_employee(&self, id: Uuid, changes: EmployeeChanges) -> StoreResult<Option<EmployeeDetail>>;
    async fn delete_employee(&self, id: Uuid) -> StoreResult<()>;
}
