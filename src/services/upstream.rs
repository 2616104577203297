//! Shared plumbing for calls to sibling services.

use std::time::{Duration, Instant};

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::UpstreamSettings;
use crate::error::{AppError, AppResult, ErrorResponse};

/// Point in time by which a multi-step operation must finish.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Timeout for the next call: the per-call limit, capped by what is left.
    pub fn call_timeout(&self, per_call: Duration) -> AppResult<Duration> {
        let remaining = self.remaining();
        if remaining.is_zero() {
            return Err(AppError::ServiceUnavailable(
                "deadline exceeded before call".to_string(),
            ));
        }
        Ok(remaining.min(per_call))
    }
}

/// Build the shared outbound HTTP client.
pub fn build_http_client(settings: &UpstreamSettings) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .build()
        .map_err(|e| AppError::ServiceUnavailable(format!("Failed to build HTTP client: {}", e)))
}

/// Join a base URL and path segments, percent-encoding each segment.
pub fn endpoint(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        url.push('/');
        url.push_str(&urlencoding::encode(segment));
    }
    url
}

/// Map a non-success response onto the error taxonomy.
///
/// 404 stays `NotFound`; anything else is the sibling being unavailable.
pub async fn error_from_response(service: &str, response: Response) -> AppError {
    let status = response.status();
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.message,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };

    if status == StatusCode::NOT_FOUND {
        AppError::NotFound(message.trim_end_matches(" not found").to_string())
    } else {
        AppError::ServiceUnavailable(format!("{} returned {}: {}", service, status.as_u16(), message))
    }
}

/// Decode a JSON body from a successful response.
pub async fn decode_json<T: DeserializeOwned>(service: &str, response: Response) -> AppResult<T> {
    if !response.status().is_success() {
        return Err(error_from_response(service, response).await);
    }
    response.json::<T>().await.map_err(|e| {
        AppError::ServiceUnavailable(format!("{} sent an unreadable body: {}", service, e))
    })
}
