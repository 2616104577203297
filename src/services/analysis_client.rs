//! HTTP client for the analysis engine.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{AnalyzeRequest, Report, WorkReportsResponse};
use crate::services::upstream::{Deadline, decode_json, endpoint, error_from_response};

const SERVICE: &str = "analysis-engine";

/// Analysis operations the gateway performs on behalf of clients.
#[async_trait]
pub trait FileAnalysisApi: Send + Sync {
    async fn analyze(&self, request: &AnalyzeRequest, deadline: Deadline) -> AppResult<Report>;
    async fn report(&self, report_id: &str, deadline: Deadline) -> AppResult<Report>;
    async fn reports_for_work(
        &self,
        work_id: &str,
        deadline: Deadline,
    ) -> AppResult<WorkReportsResponse>;
    async fn health(&self, deadline: Deadline) -> AppResult<()>;
}

/// reqwest-backed analysis engine client.
#[derive(Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl AnalysisClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            request_timeout,
        }
    }
}

#[async_trait]
impl FileAnalysisApi for AnalysisClient {
    async fn analyze(&self, request: &AnalyzeRequest, deadline: Deadline) -> AppResult<Report> {
        let response = self
            .http
            .post(endpoint(&self.base_url, &["analyze"]))
            .timeout(deadline.call_timeout(self.request_timeout)?)
            .json(request)
            .send()
            .await?;

        decode_json(SERVICE, response).await
    }

    async fn report(&self, report_id: &str, deadline: Deadline) -> AppResult<Report> {
        let response = self
            .http
            .get(endpoint(&self.base_url, &["reports", report_id]))
            .timeout(deadline.call_timeout(self.request_timeout)?)
            .send()
            .await?;

        decode_json(SERVICE, response).await
    }

    async fn reports_for_work(
        &self,
        work_id: &str,
        deadline: Deadline,
    ) -> AppResult<WorkReportsResponse> {
        let response = self
            .http
            .get(endpoint(&self.base_url, &["reports", "work", work_id]))
            .timeout(deadline.call_timeout(self.request_timeout)?)
            .send()
            .await?;

        decode_json(SERVICE, response).await
    }

    async fn health(&self, deadline: Deadline) -> AppResult<()> {
        let response = self
            .http
            .get(endpoint(&self.base_url, &["health"]))
            .timeout(deadline.call_timeout(self.request_timeout)?)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(SERVICE, response).await)
        }
    }
}
