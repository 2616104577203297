//! SeaORM database migrations.
//!
//! All services share one relational store, so a single migrator owns the
//! full schema and any service may run it on startup.

pub use sea_orm_migration::prelude::*;

mod m20261019_000001_create_works_and_files;
mod m20261019_000002_create_reports;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_works_and_files::Migration),
            Box::new(m20261019_000002_create_reports::Migration),
        ]
    }
}
