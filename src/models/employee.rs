use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use super::department::Department;

/// An employee as stored, with the department held as a bare id.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[sqlx(rename = "department_id")]
    pub department: Uuid,
    pub role: String,
    pub hire_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An employee with its department reference resolved.
///
/// `department` is `None` when the referenced department no longer exists
/// (or never did); the reference is not checked on write. `department_id`
/// always carries the stored reference.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDetail {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department_id: Uuid,
    pub department: Option<Department>,
    pub role: String,
    pub hire_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmployeeDetail {
    pub fn new(employee: Employee, department: Option<Department>) -> Self {
        Self {
            id: employee.id,
            first_name: employee.first_name,
            last_name: employee.last_name,
            email: employee.email,
            department_id: employee.department,
            department,
            role: employee.role,
            hire_date: employee.hire_date,
            created_at: employee.created_at,
            updated_at: employee.updated_at,
        }
    }
}

/// Fields accepted when creating an employee, already validated.
#[derive(Debug, Clone)]
pub struct EmployeeInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: Uuid,
    pub role: String,
    pub hire_date: Option<DateTime<Utc>>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct EmployeeChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<Uuid>,
    pub role: Option<String>,
    pub hire_date: Option<DateTime<Utc>>,
}
