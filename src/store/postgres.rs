use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::models::department::{Department, DepartmentChanges, DepartmentInput};
use crate::models::employee::{Employee, EmployeeChanges, EmployeeDetail, EmployeeInput};

const DEPARTMENT_COLUMNS: &str = "id, name, description, created_at, updated_at";

const EMPLOYEE_COLUMNS: &str =
    "id, first_name, last_name, email, department_id, role, hire_date, created_at, updated_at";

const EMPLOYEE_DETAIL_COLUMNS: &str = "e.id, e.first_name, e.last_name, e.email, e.department_id, e.role, \
     e.hire_date, e.created_at, e.updated_at, \
     d.id AS dept_id, d.name AS dept_name, d.description AS dept_description, \
     d.created_at AS dept_created_at, d.updated_at AS dept_updated_at";

// LEFT JOIN so that employees pointing at a missing department still come back.
const DEPARTMENT_JOIN: &str = "LEFT JOIN departments d ON d.id = e.department_id";

#[derive(sqlx::FromRow)]
struct EmployeeDetailRow {
    #[sqlx(flatten)]
    employee: Employee,
    dept_id: Option<Uuid>,
    dept_name: Option<String>,
    dept_description: Option<String>,
    dept_created_at: Option<DateTime<Utc>>,
    dept_updated_at: Option<DateTime<Utc>>,
}

impl From<EmployeeDetailRow> for EmployeeDetail {
    fn from(row: EmployeeDetailRow) -> Self {
        let department = match (row.dept_id, row.dept_name, row.dept_created_at, row.dept_updated_at) {
            (Some(id), Some(name), Some(created_at), Some(updated_at)) => Some(Department {
                id,
                name,
                description: row.dept_description,
                created_at,
                updated_at,
            }),
            _ => None,
        };
        EmployeeDetail::new(row.employee, department)
    }
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_department(&self, input: DepartmentInput) -> StoreResult<Department> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO departments (id, name, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) RETURNING {}",
            DEPARTMENT_COLUMNS
        );
        let department = sqlx::query_as::<_, Department>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.name)
            .bind(&input.description)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(department)
    }

    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        let sql = format!("SELECT {} FROM departments ORDER BY created_at", DEPARTMENT_COLUMNS);
        let departments = sqlx::query_as::<_, Department>(&sql).fetch_all(&self.pool).await?;
        Ok(departments)
    }

    async fn find_department(&self, id: Uuid) -> StoreResult<Option<Department>> {
        let sql = format!("SELECT {} FROM departments WHERE id = $1", DEPARTMENT_COLUMNS);
        let department = sqlx::query_as::<_, Department>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(department)
    }

    async fn update_department(&self, id: Uuid, changes: DepartmentChanges) -> StoreResult<Option<Department>> {
        let sql = format!(
            "UPDATE departments SET name = COALESCE($2, name), \
             description = CASE WHEN $3 THEN $4 ELSE description END, \
             updated_at = $5 WHERE id = $1 RETURNING {}",
            DEPARTMENT_COLUMNS
        );
        let (set_description, description) = match changes.description {
            Some(description) => (true, description),
            None => (false, None),
        };
        let department = sqlx::query_as::<_, Department>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(set_description)
            .bind(description)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;
        Ok(department)
    }

    async fn delete_department(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_employee(&self, input: EmployeeInput) -> StoreResult<Employee> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO employees (id, first_name, last_name, email, department_id, role, hire_date, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING {}",
            EMPLOYEE_COLUMNS
        );
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(input.department)
            .bind(&input.role)
            .bind(input.hire_date.unwrap_or(now))
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn list_employees(&self) -> StoreResult<Vec<EmployeeDetail>> {
        let sql = format!(
            "SELECT {} FROM employees e {} ORDER BY e.created_at",
            EMPLOYEE_DETAIL_COLUMNS, DEPARTMENT_JOIN
        );
        let rows = sqlx::query_as::<_, EmployeeDetailRow>(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(EmployeeDetail::from).collect())
    }

    async fn find_employee(&self, id: Uuid) -> StoreResult<Option<EmployeeDetail>> {
        let sql = format!(
            "SELECT {} FROM employees e {} WHERE e.id = $1",
            EMPLOYEE_DETAIL_COLUMNS, DEPARTMENT_JOIN
        );
        let row = sqlx::query_as::<_, EmployeeDetailRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(EmployeeDetail::from))
    }

    async fn update_employee(&self, id: Uuid, changes: EmployeeChanges) -> StoreResult<Option<EmployeeDetail>> {
        // One statement, so the expanded row always reflects this update.
        let sql = format!(
            "WITH e AS (UPDATE employees SET first_name = COALESCE($2, first_name), \
             last_name = COALESCE($3, last_name), email = COALESCE($4, email), \
             department_id = COALESCE($5, department_id), role = COALESCE($6, role), \
             hire_date = COALESCE($7, hire_date), updated_at = $8 WHERE id = $1 RETURNING *) \
             SELECT {} FROM e {}",
            EMPLOYEE_DETAIL_COLUMNS, DEPARTMENT_JOIN
        );
        let row = sqlx::query_as::<_, EmployeeDetailRow>(&sql)
            .bind(id)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.email)
            .bind(changes.department)
            .bind(changes.role)
            .bind(changes.hire_date)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(EmployeeDetail::from))
    }

    async fn delete_employee(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// These run against the database named by DATABASE_URL and return early
// when it is unset. Every test uses fresh ids and emails so runs can share
// one database.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use sqlx::postgres::PgPoolOptions;

    async fn store() -> Option<PgStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = PgPoolOptions::new().max_connections(2).connect(&url).await.unwrap();
        crate::db::run_migrations(&pool).await.unwrap();
        Some(PgStore::new(pool))
    }

    fn unique_email() -> String {
        format!("{}@example.com", Uuid::new_v4())
    }

    fn employee(email: &str, department: Uuid) -> EmployeeInput {
        EmployeeInput {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            department,
            role: "Engineer".into(),
            hire_date: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_maps_to_conflict() {
        let Some(store) = store().await else { return };
        let email = unique_email();
        store.insert_employee(employee(&email, Uuid::new_v4())).await.unwrap();

        let err = store.insert_employee(employee(&email, Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "got {:?}", err);

        let other = store.insert_employee(employee(&unique_email(), Uuid::new_v4())).await.unwrap();
        let changes = EmployeeChanges { email: Some(email), ..Default::default() };
        let err = store.update_employee(other.id, changes).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn missing_employee_with_taken_email_is_none() {
        let Some(store) = store().await else { return };
        let email = unique_email();
        store.insert_employee(employee(&email, Uuid::new_v4())).await.unwrap();
        let changes = EmployeeChanges { email: Some(email), ..Default::default() };
        assert!(store.update_employee(Uuid::new_v4(), changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn dangling_department_is_unresolved() {
        let Some(store) = store().await else { return };
        let ghost = Uuid::new_v4();
        let ada = store.insert_employee(employee(&unique_email(), ghost)).await.unwrap();
        assert_eq!(ada.department, ghost);

        let detail = store.find_employee(ada.id).await.unwrap().unwrap();
        assert!(detail.department.is_none());
        assert_eq!(detail.department_id, ghost);
        assert_eq!(detail.hire_date, ada.hire_date);
    }

    #[tokio::test]
    async fn employee_expands_existing_department() {
        let Some(store) = store().await else { return };
        let dept = store
            .insert_department(DepartmentInput { name: "Engineering".into(), description: Some("Builds".into()) })
            .await
            .unwrap();
        let ada = store.insert_employee(employee(&unique_email(), dept.id)).await.unwrap();

        let listed = store.list_employees().await.unwrap();
        let found = listed.iter().find(|e| e.id == ada.id).unwrap();
        assert_eq!(found.department.as_ref().map(|d| d.name.as_str()), Some("Engineering"));
        assert_eq!(found.department.as_ref().and_then(|d| d.description.as_deref()), Some("Builds"));
    }

    #[tokio::test]
    async fn partial_employee_update_keeps_other_fields() {
        let Some(store) = store().await else { return };
        let dept = store
            .insert_department(DepartmentInput { name: "Operations".into(), description: None })
            .await
            .unwrap();
        let email = unique_email();
        let ada = store.insert_employee(employee(&email, Uuid::new_v4())).await.unwrap();

        let changes = EmployeeChanges { role: Some("SRE".into()), department: Some(dept.id), ..Default::default() };
        let updated = store.update_employee(ada.id, changes).await.unwrap().unwrap();
        assert_eq!(updated.role, "SRE");
        assert_eq!(updated.department.map(|d| d.name), Some("Operations".to_string()));
        assert_eq!(updated.email, email);
        assert_eq!(updated.first_name, "Ada");
        assert_eq!(updated.hire_date, ada.hire_date);
    }

    #[tokio::test]
    async fn department_update_keeps_or_clears_description() {
        let Some(store) = store().await else { return };
        let dept = store
            .insert_department(DepartmentInput { name: "Legal".into(), description: Some("Contracts".into()) })
            .await
            .unwrap();

        let rename = DepartmentChanges { name: Some("Compliance".into()), ..Default::default() };
        let renamed = store.update_department(dept.id, rename).await.unwrap().unwrap();
        assert_eq!(renamed.name, "Compliance");
        assert_eq!(renamed.description.as_deref(), Some("Contracts"));

        let clear = DepartmentChanges { description: Some(None), ..Default::default() };
        let cleared = store.update_department(dept.id, clear).await.unwrap().unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.name, "Compliance");

        assert!(store.update_department(Uuid::new_v4(), DepartmentChanges::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let Some(store) = store().await else { return };
        let dept = store
            .insert_department(DepartmentInput { name: "Temp".into(), description: None })
            .await
            .unwrap();
        store.delete_department(dept.id).await.unwrap();
        store.delete_department(dept.id).await.unwrap();
        assert!(store.find_department(dept.id).await.unwrap().is_none());
    }
}
