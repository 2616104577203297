//! Submission checker library.
//!
//! Shared code for the three services: the storage engine (content-addressed
//! file storage), the analysis engine (plagiarism reports) and the gateway
//! that drives the submission workflow across both.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
pub mod startup;
