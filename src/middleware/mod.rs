//! Actix middleware shared by the three services.

pub mod request_logger;

pub use request_logger::RequestLogger;
