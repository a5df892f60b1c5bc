pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_farm_tables;
mod m20240301_000002_enable_row_level_security;

pub mod rls;

pub use m20240301_000001_create_farm_tables::{
    create_chickens, create_coops, create_egg_production, create_feed, create_health_records,
    create_profiles, create_sales,
};
pub use m20240301_000002_enable_row_level_security::policies;
pub use rls::{disable_rls_sql, enable_rls_sql, RlsCommand, RlsPolicy, RlsRole};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_farm_tables::Migration),
            Box::new(m20240301_000002_enable_row_level_security::Migration),
        ]
    }
}
