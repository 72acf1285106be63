//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_account;
mod m20240601_000002_create_account_credentials;
mod m20240601_000003_create_gardener_profile;
mod m20240601_000004_create_client_profile;
mod m20240601_000005_create_visit_request;
mod m20240601_000006_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_account::Migration),
            Box::new(m20240601_000002_create_account_credentials::Migration),
            Box::new(m20240601_000003_create_gardener_profile::Migration),
            Box::new(m20240601_000004_create_client_profile::Migration),
            Box::new(m20240601_000005_create_visit_request::Migration),
            // Indexes should always be applied last
            Box::new(m20240601_000006_add_indexes::Migration),
        ]
    }
}
