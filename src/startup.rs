//! Process wiring shared by the three service binaries.
//!
//! Each binary loads its [`Config`], calls one of the `configure_*` functions
//! from its `HttpServer` factory, and wraps the app in [`cors`] and
//! [`RequestLogger`](crate::middleware::RequestLogger).

use std::io;

use actix_cors::Cors;
use actix_web::http::header::{self, HeaderName};
use actix_web::web;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::config::{Config, REQUEST_ID_HEADER, ServiceKind};
use crate::db::DbPool;
use crate::services::{AnalysisEngine, StorageEngine, SubmissionService};

/// Install the global tracing subscriber (INFO, overridable with `RUST_LOG`).
pub fn init_tracing() -> io::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| io::Error::other(format!("Failed to set tracing subscriber: {}", e)))
}

/// Load the service's configuration, logging a startup banner.
pub fn load_config(service: ServiceKind) -> io::Result<Config> {
    let config = Config::from_env(service).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("");
        error!("Please check your environment variables:");
        error!("  - RUST_ENV must be set to 'development' or 'production'");
        error!("  - In production, DATABASE_URL must be set for the storage and analysis engines");
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("========================================");
    info!("  {}", service);
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    Ok(config)
}

/// Connect to the database and apply migrations when enabled.
pub async fn connect_database(config: &Config) -> io::Result<DbPool> {
    let pool = DbPool::new(&config.database)
        .await
        .map_err(|e| io::Error::other(e.to_string()))?;
    info!("Database connection established");

    if config.database.run_migrations {
        pool.run_migrations()
            .await
            .map_err(|e| io::Error::other(e.to_string()))?;
    }

    Ok(pool)
}

/// Number of actix workers: 4 in development, one per CPU otherwise.
pub fn worker_count(config: &Config) -> usize {
    if config.is_development() {
        info!(
            "Starting {} at http://{} (4 workers - development mode)",
            config.service,
            config.bind_address()
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting {} at http://{} ({} workers)",
            config.service,
            config.bind_address(),
            cpus
        );
        cpus
    }
}

/// CORS policy: local frontends in development, same-origin in production.
pub fn cors(is_development: bool) -> Cors {
    let methods = vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"];
    let headers = vec![
        header::ACCEPT,
        header::CONTENT_TYPE,
        HeaderName::from_static(REQUEST_ID_HEADER),
    ];

    if is_development {
        Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_methods(methods)
            .allowed_headers(headers)
            .max_age(3600)
    } else {
        Cors::default()
            .allowed_methods(methods)
            .allowed_headers(headers)
            .max_age(3600)
    }
}

fn swagger<D: OpenApi>() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", D::openapi())
}

/// Register the storage engine's state, routes and docs.
pub fn configure_storage_engine(
    cfg: &mut web::ServiceConfig,
    engine: web::Data<StorageEngine>,
    pool: web::Data<DbPool>,
) {
    let max_upload_size = engine.max_upload_size();
    cfg.app_data(engine)
        .app_data(pool)
        .app_data(web::Data::new(ServiceKind::StorageEngine))
        .app_data(web::PayloadConfig::new(max_upload_size * 2))
        .configure(api::configure_health_routes)
        .configure(api::configure_storage_routes)
        .service(swagger::<api::StorageApiDoc>());
}

/// Register the analysis engine's state, routes and docs.
pub fn configure_analysis_engine(
    cfg: &mut web::ServiceConfig,
    engine: web::Data<AnalysisEngine>,
    pool: web::Data<DbPool>,
) {
    cfg.app_data(engine)
        .app_data(pool)
        .app_data(web::Data::new(ServiceKind::AnalysisEngine))
        .configure(api::configure_health_routes)
        .configure(api::configure_analysis_routes)
        .service(swagger::<api::AnalysisApiDoc>());
}

/// Register the gateway's state, routes and docs.
pub fn configure_gateway(
    cfg: &mut web::ServiceConfig,
    service: web::Data<SubmissionService>,
    limits: web::Data<crate::config::StorageSettings>,
) {
    let max_upload_size = limits.max_upload_size;
    cfg.app_data(service)
        .app_data(limits)
        .app_data(web::PayloadConfig::new(max_upload_size * 2))
        .configure(api::configure_gateway_routes)
        .service(swagger::<api::GatewayApiDoc>());
}
