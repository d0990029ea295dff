pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::{RevokedTokenRepository, UserRepository};

use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use migrator::Migrator;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./auth.db?mode=rwc")
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./auth.db?mode=rwc".to_string(),
        }
    }
}

/// Connect and bring the schema up to date
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!(url = %config.url, "Connecting to database");
    let db = Database::connect(&config.url).await?;
    info!("Running database migrations...");
    Migrator::up(&db, None).await?;
    info!("Database ready");
    Ok(db)
}
