use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;

mod initial_001;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(initial_001::Migration)]
    }
}

/// Bring the schema up to date. Called by the server on startup and by
/// tests against fresh databases.
pub async fn run(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await
}
