//! API endpoint modules.

pub mod analysis;
pub mod gateway;
pub mod health;
pub mod openapi;
pub mod storage;
pub mod transfer;

pub use analysis::configure_routes as configure_analysis_routes;
pub use gateway::configure_routes as configure_gateway_routes;
pub use health::configure_health_routes;
pub use openapi::{AnalysisApiDoc, GatewayApiDoc, StorageApiDoc};
pub use storage::configure_routes as configure_storage_routes;
