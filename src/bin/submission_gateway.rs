//! Submission gateway - public entry point for submissions and reports.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing::info;

use submission_checker_lib::config::ServiceKind;
use submission_checker_lib::middleware::RequestLogger;
use submission_checker_lib::services::upstream::build_http_client;
use submission_checker_lib::services::{AnalysisClient, StorageClient, SubmissionService};
use submission_checker_lib::startup;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    startup::init_tracing()?;

    let config = startup::load_config(ServiceKind::Gateway)?;

    let http = build_http_client(&config.upstream).map_err(|e| std::io::Error::other(e.to_string()))?;
    let storage = StorageClient::new(
        http.clone(),
        config.upstream.file_storage_url.clone(),
        config.upstream.request_timeout,
    );
    let analysis = AnalysisClient::new(
        http,
        config.upstream.file_analysis_url.clone(),
        config.upstream.request_timeout,
    );
    info!(
        "Upstreams: storage {} / analysis {} ({}s submission budget)",
        config.upstream.file_storage_url,
        config.upstream.file_analysis_url,
        config.upstream.submission_timeout.as_secs()
    );

    let service = web::Data::new(SubmissionService::new(
        Arc::new(storage),
        Arc::new(analysis),
        config.upstream.submission_timeout,
    ));
    let limits = web::Data::new(config.storage.clone());
    let is_development = config.is_development();
    let workers = startup::worker_count(&config);

    HttpServer::new(move || {
        App::new()
            .wrap(startup::cors(is_development))
            .wrap(RequestLogger::new(ServiceKind::Gateway.as_str()))
            .configure(|cfg| startup::configure_gateway(cfg, service.clone(), limits.clone()))
    })
    .workers(workers)
    .bind(config.bind_address())?
    .run()
    .await
}
