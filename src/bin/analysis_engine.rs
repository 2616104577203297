//! Analysis engine - scores stored files and keeps plagiarism reports.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing::info;

use submission_checker_lib::config::ServiceKind;
use submission_checker_lib::middleware::RequestLogger;
use submission_checker_lib::services::upstream::build_http_client;
use submission_checker_lib::services::{AnalysisEngine, FixedScorer, ReportCache, StorageClient};
use submission_checker_lib::startup;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    startup::init_tracing()?;

    let config = startup::load_config(ServiceKind::AnalysisEngine)?;
    let pool = startup::connect_database(&config).await?;

    let http = build_http_client(&config.upstream).map_err(|e| std::io::Error::other(e.to_string()))?;
    let storage = StorageClient::new(
        http,
        config.upstream.file_storage_url.clone(),
        config.upstream.request_timeout,
    );
    info!("File storage at {}", config.upstream.file_storage_url);

    let cache = config.analysis.enable_caching.then(|| {
        info!(
            "Report cache enabled ({} entries, {}s TTL)",
            config.analysis.cache_capacity,
            config.analysis.cache_ttl.as_secs()
        );
        ReportCache::new(config.analysis.cache_capacity, config.analysis.cache_ttl)
    });

    let engine = web::Data::new(AnalysisEngine::new(
        pool.clone(),
        Arc::new(storage),
        Arc::new(FixedScorer::default()),
        cache,
        config.analysis.plagiarism_threshold,
        config.storage.max_upload_size,
        config.upstream.request_timeout,
    ));
    let pool = web::Data::new(pool);
    let is_development = config.is_development();
    let workers = startup::worker_count(&config);

    HttpServer::new(move || {
        App::new()
            .wrap(startup::cors(is_development))
            .wrap(RequestLogger::new(ServiceKind::AnalysisEngine.as_str()))
            .configure(|cfg| startup::configure_analysis_engine(cfg, engine.clone(), pool.clone()))
    })
    .workers(workers)
    .bind(config.bind_address())?
    .run()
    .await
}
