//! Service integration test suite.
//!
//! Runs each service in-process against in-memory SQLite and temporary
//! storage directories. End-to-end scenarios bind real listeners on
//! 127.0.0.1 so the reqwest clients talk to live engines.
//!
//! Run with: cargo test --test services


mod analysis_tests;
mod e2e_tests;
mod gateway_tests;
mod storage_tests;
