use actix_cors::Cors;
use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use std::io;
use std::sync::Arc;

use hr_records::config::Config;
use hr_records::store::{PgStore, Store};
use hr_records::{configure, db};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|err| {
        error!("Invalid configuration: {}", err);
        io::Error::new(io::ErrorKind::InvalidInput, err)
    })?;

    // No point serving requests that would all fail at the store.
    let pool = db::create_pool(&config).await.map_err(|err| {
        error!("Failed to connect to the database: {}", err);
        io::Error::new(io::ErrorKind::ConnectionRefused, err)
    })?;

    db::run_migrations(&pool).await.map_err(|err| {
        error!("Failed to run migrations: {}", err);
        io::Error::new(io::ErrorKind::Other, err)
    })?;

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
    let store = web::Data::from(store);
    let static_dir = config.static_dir.clone();

    info!("Starting server at {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(store.clone())
            .configure(configure)
            .service(Files::new("/", static_dir.clone()).index_file("index.html"))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
