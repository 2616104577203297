//! Storage engine - stores submitted files and answers duplicate lookups.

use actix_web::{App, HttpServer, web};
use tracing::info;

use submission_checker_lib::config::ServiceKind;
use submission_checker_lib::middleware::RequestLogger;
use submission_checker_lib::services::{FileStore, StorageEngine};
use submission_checker_lib::startup;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    startup::init_tracing()?;

    let config = startup::load_config(ServiceKind::StorageEngine)?;
    let pool = startup::connect_database(&config).await?;

    let store = FileStore::new(&config.storage.root_dir);
    store
        .validate()
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    info!(
        "Storage root {} ({}MB max upload)",
        store.root().display(),
        config.storage.max_upload_size / 1024 / 1024
    );

    let engine = web::Data::new(StorageEngine::new(
        pool.clone(),
        store,
        config.storage.max_upload_size,
    ));
    let pool = web::Data::new(pool);
    let is_development = config.is_development();
    let workers = startup::worker_count(&config);

    HttpServer::new(move || {
        App::new()
            .wrap(startup::cors(is_development))
            .wrap(RequestLogger::new(ServiceKind::StorageEngine.as_str()))
            .configure(|cfg| startup::configure_storage_engine(cfg, engine.clone(), pool.clone()))
    })
    .workers(workers)
    .bind(config.bind_address())?
    .run()
    .await
}
