use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use crate::errors::AppError;
use crate::models::department::{DepartmentChanges, DepartmentInput};
use crate::store::Store;
use crate::utils::validation::{nullable, parse_id, validate_payload};

#[derive(Deserialize, Validate)]
pub struct NewDepartment {
    #[validate(required, length(min = 1))]
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct DepartmentUpdate {
    #[validate(length(min = 1))]
    name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    description: Option<Option<String>>,
}

pub async fn create_department(
    store: web::Data<dyn Store>,
    new_department: web::Json<NewDepartment>,
) -> Result<HttpResponse, AppError> {
    const CONTEXT: &str = "Failed to create department";
    validate_payload(&*new_department, CONTEXT)?;

    let new_department = new_department.into_inner();
    let input = DepartmentInput {
        name: new_department.name.unwrap_or_default(),
        description: new_department.description,
    };

    let department = store
        .insert_department(input)
        .await
        .map_err(|err| AppError::from_store(CONTEXT, err))?;

    Ok(HttpResponse::Created().json(department))
}

pub async fn get_departments(store: web::Data<dyn Store>) -> Result<HttpResponse, AppError> {
    let departments = store
        .list_departments()
        .await
        .map_err(|err| AppError::from_store("Failed to fetch departments", err))?;

    Ok(HttpResponse::Ok().json(departments))
}

pub async fn get_department(
    store: web::Data<dyn Store>,
    department_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let department_id = parse_id(&department_id.into_inner(), "department")?;

    let department = store
        .find_department(department_id)
        .await
        .map_err(|err| AppError::from_store("Failed to fetch department", err))?
        .ok_or_else(|| AppError::not_found("Department not found"))?;

    Ok(HttpResponse::Ok().json(department))
}

pub async fn update_department(
    store: web::Data<dyn Store>,
    department_id: web::Path<String>,
    updates: web::Json<DepartmentUpdate>,
) -> Result<HttpResponse, AppError> {
    const CONTEXT: &str = "Failed to update department";
    validate_payload(&*updates, CONTEXT)?;
    let department_id = parse_id(&department_id.into_inner(), "department")?;

    let updates = updates.into_inner();
    let changes = DepartmentChanges { name: updates.name, description: updates.description };

    let department = store
        .update_department(department_id, changes)
        .await
        .map_err(|err| AppError::from_store(CONTEXT, err))?
        .ok_or_else(|| AppError::not_found("Department not found"))?;

    Ok(HttpResponse::Ok().json(department))
}

pub async fn delete_department(
    store: web::Data<dyn Store>,
    department_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let department_id = parse_id(&department_id.into_inner(), "department")?;

    store
        .delete_department(department_id)
        .await
        .map_err(|err| AppError::from_store("Failed to delete department", err))?;

    Ok(HttpResponse::NoContent().finish())
}
