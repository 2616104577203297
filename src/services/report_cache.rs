//! Bounded in-process report cache.
//!
//! Local to one analysis engine instance; replicas do not share or
//! invalidate each other's entries.

use std::time::Duration;

use moka::future::Cache;

use crate::models::Report;

/// Report cache keyed by report id.
#[derive(Clone)]
pub struct ReportCache {
    inner: Cache<String, Report>,
}

impl ReportCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }

    pub async fn get(&self, report_id: &str) -> Option<Report> {
        self.inner.get(report_id).await
    }

    pub async fn insert(&self, report: Report) {
        self.inner.insert(report.report_id.clone(), report).await;
    }

    pub async fn invalidate(&self, report_id: &str) {
        self.inner.invalidate(report_id).await;
    }
}
