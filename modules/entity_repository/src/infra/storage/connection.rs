//! Database connection and schema helpers

use crate::contract::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityName, EntityTrait, Schema,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Open a pooled connection shared by repositories.
///
/// In-memory SQLite databases are per-connection, so their pool is pinned to
/// a single connection.
pub async fn connect(url: &str) -> Result<Arc<DatabaseConnection>> {
    let mut options = ConnectOptions::new(url.to_string());
    if url.contains(":memory:") || url.contains("mode=memory") {
        options.max_connections(1).min_connections(1);
    }
    options.sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!(backend = ?db.get_database_backend(), "Connected to database");
    Ok(Arc::new(db))
}

/// Create the table backing `entity` unless it already exists
pub async fn create_table_for<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<()> {
    let backend = db.get_database_backend();
    let mut table = Schema::new(backend).create_table_from_entity(entity);
    table.if_not_exists();

    db.execute(backend.build(&table)).await?;
    debug!(table = entity.table_name(), "Ensured table exists");
    Ok(())
}
