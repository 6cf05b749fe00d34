//! Connection pool for MySQL.

use std::sync::Arc;

use bedb_core::{ConnectDefaults, DbConfig, DbError, DbResult, Stage};
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Pool};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use crate::config::{MysqlPoolSettings, TARGET};

/// A pooled MySQL handle.
#[derive(Clone)]
pub struct MysqlPool {
    inner: Pool,
    settings: Arc<MysqlPoolSettings>,
}

impl MysqlPool {
    /// Get a connection from the pool.
    pub async fn get_conn(&self) -> mysql_async::Result<Conn> {
        debug!("Acquiring connection from pool");
        self.inner.get_conn().await
    }

    /// Settings the pool was built with.
    pub fn settings(&self) -> &MysqlPoolSettings {
        &self.settings
    }

    /// Get the underlying `mysql_async` pool.
    pub fn inner(&self) -> &Pool {
        &self.inner
    }

    /// Check if the pool is healthy by pinging one connection.
    pub async fn is_healthy(&self) -> bool {
        ping(&self.inner).await.is_ok()
    }

    /// Disconnect all connections and close the pool.
    pub async fn disconnect(self) -> mysql_async::Result<()> {
        self.inner.disconnect().await?;
        info!("MySQL connection pool closed");
        Ok(())
    }
}

impl std::fmt::Debug for MysqlPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MysqlPool")
            .field("min_connections", &self.settings.min_connections)
            .field("max_connections", &self.settings.max_connections)
            .finish()
    }
}

/// Build a MySQL pool from `config` with the default settings.
pub async fn connect_mysql(config: &DbConfig) -> DbResult<MysqlPool> {
    connect_mysql_with(config, &ConnectDefaults::default()).await
}

/// Build a MySQL pool from `config`.
///
/// Connections are opened lazily. With `validate_ping` set, one connection
/// is opened and pinged before the connect deadline; on failure the pool is
/// disconnected and only the error is returned.
pub async fn connect_mysql_with(
    config: &DbConfig,
    defaults: &ConnectDefaults,
) -> DbResult<MysqlPool> {
    let started = Instant::now();
    let settings = MysqlPoolSettings::from_config(config, defaults)?;
    let deadline = Instant::from_std(ConnectDefaults::deadline(
        started.into_std(),
        settings.connect_timeout,
    ));

    let pool = Pool::new(settings.opts.clone());

    info!(
        host = %config.host,
        port = %config.port,
        database = %config.database,
        max_connections = %settings.max_connections,
        "MySQL connection pool created"
    );

    if config.validate_ping {
        let outcome = match timeout_at(deadline, ping(&pool)).await {
            Ok(result) => result,
            Err(_) => Err(DbError::timeout(
                TARGET,
                Stage::Ping,
                u64::try_from(settings.connect_timeout.as_millis()).unwrap_or(u64::MAX),
            )),
        };
        if let Err(err) = outcome {
            warn!(error = %err, "ping failed, disconnecting pool");
            if let Err(e) = pool.disconnect().await {
                debug!(error = %e, "pool disconnect after failed ping");
            }
            return Err(err);
        }
        info!("ping successful");
    }

    Ok(MysqlPool {
        inner: pool,
        settings: Arc::new(settings),
    })
}

async fn ping(pool: &Pool) -> DbResult<()> {
    let mut conn = pool
        .get_conn()
        .await
        .map_err(|e| DbError::rejected(TARGET, Stage::Ping, e))?;
    conn.ping()
        .await
        .map_err(|e| DbError::rejected(TARGET, Stage::Ping, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DbConfig {
        DbConfig::builder()
            .host("localhost")
            .port(3306)
            .user("root")
            .password("root")
            .database("test")
            .build()
    }

    #[tokio::test]
    async fn test_pool_is_lazy() {
        let pool = connect_mysql(&config()).await.unwrap();
        assert_eq!(pool.settings().max_connections, 10);
        pool.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_configuration_error_before_io() {
        let mut config = config();
        config.host.clear();

        let err = connect_mysql(&config).await.unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.target(), "mysql");
    }

    #[tokio::test]
    async fn test_huge_connect_timeout_does_not_overflow() {
        let mut config = config();
        config.connect_timeout = i64::MAX as u64;

        let pool = connect_mysql(&config).await.unwrap();
        pool.disconnect().await.unwrap();
    }
}
