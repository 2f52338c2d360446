pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod store;
pub mod utils;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::errors::AppError;

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::bad_request("Invalid JSON payload", err.to_string()).into()
}

/// Registers the REST API. Shared by the server binary and the tests; the
/// caller provides the `web::Data<dyn Store>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(
            web::scope("/api/departments")
                .service(
                    web::resource("")
                        .route(web::post().to(handlers::department::create_department))
                        .route(web::get().to(handlers::department::get_departments)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(handlers::department::get_department))
                        .route(web::put().to(handlers::department::update_department))
                        .route(web::delete().to(handlers::department::delete_department)),
                ),
        )
        .service(
            web::scope("/api/employees")
                .service(
                    web::resource("")
                        .route(web::post().to(handlers::employee::create_employee))
                        .route(web::get().to(handlers::employee::get_employees)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(handlers::employee::get_employee))
                        .route(web::put().to(handlers::employee::update_employee))
                        .route(web::delete().to(handlers::employee::delete_employee)),
                ),
        );
}
