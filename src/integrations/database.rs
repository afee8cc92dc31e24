use std::collections::BTreeMap;
use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::config::DatabaseConfig;

/// Name of the connection holding the `user` table.
pub const PRIMARY: &str = "mysql";

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("no database connection named `{0}`")]
    Unknown(String),

    #[error("database `{name}` is unreachable: {source}")]
    Unreachable { name: String, source: DbErr },
}

/// Opens a pool for `config`. Pools are lazy: with a minimum of zero no
/// connection is made until the first query.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.url()?);
    options
        .min_connections(config.pool_min)
        .max_connections(config.pool_max)
        .sqlx_logging(config.debug)
        .connect_lazy(true);

    let connection = Database::connect(options).await?;

    tracing::info!(
        connection = %config.name,
        driver = ?config.driver,
        host = %config.host,
        port = config.port,
        database = %config.database,
        "database pool configured"
    );

    Ok(connection)
}

/// Every open pool, by connection name.
#[derive(Clone, Default)]
pub struct Databases {
    connections: Arc<BTreeMap<String, DatabaseConnection>>,
}

impl FromIterator<(String, DatabaseConnection)> for Databases {
    fn from_iter<I: IntoIterator<Item = (String, DatabaseConnection)>>(iter: I) -> Self {
        Databases {
            connections: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl Databases {
    pub fn get(&self, name: &str) -> Option<&DatabaseConnection> {
        self.connections.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.connections.keys().map(String::as_str)
    }

    pub async fn ping(&self, name: &str) -> Result<(), DatabaseError> {
        let connection = self
            .get(name)
            .ok_or_else(|| DatabaseError::Unknown(name.to_owned()))?;

        connection
            .ping()
            .await
            .map_err(|source| DatabaseError::Unreachable { name: name.to_owned(), source })
    }

    /// Applies pending migrations on the primary connection.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        let connection = self
            .get(PRIMARY)
            .ok_or_else(|| DatabaseError::Unknown(PRIMARY.to_owned()))?;

        Migrator::up(connection, None).await?;
        tracing::info!(connection = PRIMARY, "migrations applied");

        Ok(())
    }

    pub async fn close(&self) {
        for (name, connection) in self.connections.iter() {
            match connection.clone().close().await {
                Ok(()) => tracing::info!(connection = %name, "database pool closed"),
                Err(err) => tracing::warn!(connection = %name, error = %err, "cannot close database pool"),
            }
        }
    }
}
