use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::department::{Department, DepartmentChanges, DepartmentInput};
use crate::models::employee::{Employee, EmployeeChanges, EmployeeDetail, EmployeeInput};

#[derive(Default)]
struct Collections {
    departments: Vec<Department>,
    employees: Vec<Employee>,
}

impl Collections {
    fn expand(&self, employee: &Employee) -> EmployeeDetail {
        let department = self.departments.iter().find(|d| d.id == employee.department).cloned();
        EmployeeDetail::new(employee.clone(), department)
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.employees.iter().any(|e| e.email == email && Some(e.id) != except)
    }
}

/// Store kept entirely in process memory, in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_email(email: &str) -> StoreError {
    StoreError::Conflict(format!("duplicate key value violates unique constraint: email \"{}\"", email))
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_department(&self, input: DepartmentInput) -> StoreResult<Department> {
        let now = Utc::now();
        let department = Department {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.departments.push(department.clone());
        Ok(department)
    }

    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        Ok(self.inner.read().await.departments.clone())
    }

    async fn find_department(&self, id: Uuid) -> StoreResult<Option<Department>> {
        Ok(self.inner.read().await.departments.iter().find(|d| d.id == id).cloned())
    }

    async fn update_department(&self, id: Uuid, changes: DepartmentChanges) -> StoreResult<Option<Department>> {
        let mut inner = self.inner.write().await;
        let Some(department) = inner.departments.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            department.name = name;
        }
        if let Some(description) = changes.description {
            department.description = description;
        }
        department.updated_at = Utc::now();
        Ok(Some(department.clone()))
    }

    async fn delete_department(&self, id: Uuid) -> StoreResult<()> {
        self.inner.write().await.departments.retain(|d| d.id != id);
        Ok(())
    }

    async fn insert_employee(&self, input: EmployeeInput) -> StoreResult<Employee> {
        let mut inner = self.inner.write().await;
        if inner.email_taken(&input.email, None) {
            return Err(duplicate_email(&input.email));
        }
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            department: input.department,
            role: input.role,
            hire_date: input.hire_date.unwrap_or(now),
            created_at: now,
            updated_at: now,
        };
        inner.employees.push(employee.clone());
        Ok(employee)
    }

    async fn list_employees(&self) -> StoreResult<Vec<EmployeeDetail>> {
        let inner = self.inner.read().await;
        Ok(inner.employees.iter().map(|e| inner.expand(e)).collect())
    }

    async fn find_employee(&self, id: Uuid) -> StoreResult<Option<EmployeeDetail>> {
        let inner = self.inner.read().await;
        Ok(inner.employees.iter().find(|e| e.id == id).map(|e| inner.expand(e)))
    }

    async fn update_employee(&self, id: Uuid, changes: EmployeeChanges) -> StoreResult<Option<EmployeeDetail>> {
        let mut inner = self.inner.write().await;
        let Some(index) = inner.employees.iter().position(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(email) = &changes.email {
            if inner.email_taken(email, Some(id)) {
                return Err(duplicate_email(email));
            }
        }
        let employee = &mut inner.employees[index];
        if let Some(first_name) = changes.first_name {
            employee.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            employee.last_name = last_name;
        }
        if let Some(email) = changes.email {
            employee.email = email;
        }
        if let Some(department) = changes.department {
            employee.department = department;
        }
        if let Some(role) = changes.role {
            employee.role = role;
        }
        if let Some(hire_date) = changes.hire_date {
            employee.hire_date = hire_date;
        }
        employee.updated_at = Utc::now();
        let updated = employee.clone();
        Ok(Some(inner.expand(&updated)))
    }

    async fn delete_employee(&self, id: Uuid) -> StoreResult<()> {
        self.inner.write().await.employees.retain(|e| e.id != id);
        Ok(())
    }
}
