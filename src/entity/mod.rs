//! SeaORM entity definitions.
//!
//! `work` and `file` belong to the storage engine; `report` and
//! `similar_work` belong to the analysis engine.

pub mod file;
pub mod report;
pub mod similar_work;
pub mod work;
