//! Business logic services.

pub mod analysis;
pub mod analysis_client;
pub mod file_store;
pub mod report_cache;
pub mod scoring;
pub mod storage_client;
pub mod storage_engine;
pub mod submission;
pub mod upstream;

pub use analysis::{AnalysisEngine, AnalysisError};
pub use analysis_client::{AnalysisClient, FileAnalysisApi};
pub use file_store::FileStore;
pub use report_cache::ReportCache;
pub use scoring::{FixedScorer, PlagiarismScorer};
pub use storage_client::{FileContentSource, FileStorageApi, StorageClient};
pub use storage_engine::{NewUpload, StorageEngine};
pub use submission::SubmissionService;
pub use upstream::Deadline;
