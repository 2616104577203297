//! Gateway DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response to a work submission. Identical whether or not analysis succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkSubmissionResponse {
    pub work_id: String,
    pub file_id: String,
    pub submitted_at: DateTime<Utc>,
}

/// Aggregated liveness of the gateway and its downstream services.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GatewayHealthResponse {
    pub status: String,
    pub gateway: String,
    pub file_storage: String,
    pub file_analysis: String,
}
