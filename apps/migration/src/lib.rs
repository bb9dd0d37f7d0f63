//! Schema for the two tables the server reads and writes.

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_profiles;
mod m20240101_000002_create_blogs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_profiles::Migration),
            Box::new(m20240101_000002_create_blogs::Migration),
        ]
    }
}
