use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::errors::AppError;
use crate::models::employee::{EmployeeChanges, EmployeeInput};
use crate::store::Store;
use crate::utils::validation::{parse_id, validate_payload};

// Email format is checked by the browser client only; the API accepts any
// non-empty string and relies on the store for uniqueness.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[validate(required, length(min = 1))]
    first_name: Option<String>,
    #[validate(required, length(min = 1))]
    last_name: Option<String>,
    #[validate(required, length(min = 1))]
    email: Option<String>,
    #[validate(required, length(min = 1))]
    department: Option<String>,
    #[validate(required, length(min = 1))]
    role: Option<String>,
    hire_date: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    #[validate(length(min = 1))]
    first_name: Option<String>,
    #[validate(length(min = 1))]
    last_name: Option<String>,
    #[validate(length(min = 1))]
    email: Option<String>,
    department: Option<String>,
    #[validate(length(min = 1))]
    role: Option<String>,
    hire_date: Option<DateTime<Utc>>,
}

pub async fn create_employee(
    store: web::Data<dyn Store>,
    new_employee: web::Json<NewEmployee>,
) -> Result<HttpResponse, AppError> {
    const CONTEXT: &str = "Failed to create employee";
    validate_payload(&*new_employee, CONTEXT)?;

    let new_employee = new_employee.into_inner();
    // Only the id's syntax is checked; the department may not exist.
    let department = parse_id(&new_employee.department.unwrap_or_default(), "department")?;

    let input = EmployeeInput {
        first_name: new_employee.first_name.unwrap_or_default(),
        last_name: new_employee.last_name.unwrap_or_default(),
        email: new_employee.email.unwrap_or_default(),
        department,
        role: new_employee.role.unwrap_or_default(),
        hire_date: new_employee.hire_date,
    };

    let employee = store
        .insert_employee(input)
        .await
        .map_err(|err| AppError::from_store(CONTEXT, err))?;

    Ok(HttpResponse::Created().json(employee))
}

pub async fn get_employees(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let employees = store
        .list_employees()
        .await
        .map_err(|err| AppError::from_store("Failed to fetch employees", err))?;

    Ok(HttpResponse::Ok().json(employees))
}

pub async fn get_employee(
    store: web::Data<dyn Store>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = parse_id(&employee_id.into_inner(), "employee")?;

    let employee = store
        .find_employee(employee_id)
        .await
        .map_err(|err| AppError::from_store("Failed to fetch employee", err))?
        .ok_or_else(|| AppError::not_found("Employee not found"))?;

    Ok(HttpResponse::Ok().json(employee))
}

pub async fn update_employee(
    store: web::Data<dyn Store>,
    employee_id: web::Path<String>,
    updates: web::Json<EmployeeUpdate>,
) -> Result<HttpResponse, AppError> {
    const CONTEXT: &str = "Failed to update employee";
    validate_payload(&*updates, CONTEXT)?;
    let employee_id = parse_id(&employee_id.into_inner(), "employee")?;

    let updates = updates.into_inner();
    let department = updates
        .department
        .as_deref()
        .map(|raw| parse_id(raw, "department"))
        .transpose()?;

    let changes = EmployeeChanges {
        first_name: updates.first_name,
        last_name: updates.last_name,
        email: updates.email,
        department,
        role: updates.role,
        hire_date: updates.hire_date,
    };

    let employee = store
        .update_employee(employee_id, changes)
        .await
        .map_err(|err| AppError::from_store(CONTEXT, err))?
        .ok_or_else(|| AppError::not_found("Employee not found"))?;

    Ok(HttpResponse::Ok().json(employee))
}

pub async fn delete_employee(
    store: web::Data<dyn Store>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = parse_id(&employee_id.into_inner(), "employee")?;

    store
        .delete_employee(employee_id)
        .await
        .map_err(|err| AppError::from_store("Failed to delete employee", err))?;

    Ok(HttpResponse::NoContent().finish())
}
