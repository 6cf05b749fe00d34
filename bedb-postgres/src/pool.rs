//! Connection pool for PostgreSQL.

use std::sync::Arc;

use bedb_core::{ConnectDefaults, DbConfig, DbError, DbResult, Stage};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, PoolError, RecyclingMethod, Runtime};
use tokio::time::{Instant, timeout_at};
use tokio_postgres::NoTls;
use tracing::{debug, info, warn};

use crate::config::{PgSettings, TARGET};

/// A pooled PostgreSQL handle.
#[derive(Clone)]
pub struct PgPool {
    inner: Pool,
    settings: Arc<PgSettings>,
}

impl PgPool {
    /// Get a connection from the pool.
    pub async fn get(&self) -> Result<Object, PoolError> {
        debug!("Acquiring connection from pool");
        self.inner.get().await
    }

    /// Get the current pool status.
    pub fn status(&self) -> PoolStatus {
        let status = self.inner.status();
        PoolStatus {
            available: status.available,
            size: status.size,
            max_size: status.max_size,
            waiting: status.waiting,
        }
    }

    /// Settings the pool was built with.
    pub fn settings(&self) -> &PgSettings {
        &self.settings
    }

    /// Get the underlying deadpool pool.
    pub fn inner(&self) -> &Pool {
        &self.inner
    }

    /// Check if the pool is healthy by running `SELECT 1`.
    pub async fn is_healthy(&self) -> bool {
        ping(&self.inner).await.is_ok()
    }

    /// Close the pool and all connections.
    pub fn close(&self) {
        self.inner.close();
        info!("PostgreSQL connection pool closed");
    }
}

impl std::fmt::Debug for PgPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgPool")
            .field("max_connections", &self.settings.max_connections)
            .finish()
    }
}

/// Pool status information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStatus {
    /// Number of available (idle) connections.
    pub available: usize,
    /// Current total size of the pool.
    pub size: usize,
    /// Maximum size of the pool.
    pub max_size: usize,
    /// Number of tasks waiting for a connection.
    pub waiting: usize,
}

/// Build a PostgreSQL pool from `config` with the default settings.
pub async fn connect_postgres(config: &DbConfig) -> DbResult<PgPool> {
    connect_postgres_with(config, &ConnectDefaults::default()).await
}

/// Build a PostgreSQL pool from `config`.
///
/// The pool opens connections lazily. With `validate_ping` set, one
/// connection is checked out and `SELECT 1` is run before the connect
/// deadline; on failure the pool is closed and only the error is returned.
pub async fn connect_postgres_with(
    config: &DbConfig,
    defaults: &ConnectDefaults,
) -> DbResult<PgPool> {
    let started = Instant::now();
    let settings = PgSettings::from_config(config, defaults)?;
    let deadline = Instant::from_std(ConnectDefaults::deadline(
        started.into_std(),
        settings.connect_timeout,
    ));

    let manager = Manager::from_config(
        settings.pg_config.clone(),
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );

    let pool = Pool::builder(manager)
        .max_size(settings.max_connections)
        .runtime(Runtime::Tokio1)
        .create_timeout(Some(settings.connect_timeout))
        .wait_timeout(Some(settings.connect_timeout))
        .build()
        .map_err(|e| DbError::config(TARGET, format!("failed to create pool: {}", e)))?;

    info!(
        host = %config.host,
        port = %config.port,
        database = %config.database,
        max_connections = %settings.max_connections,
        "PostgreSQL connection pool created"
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
            warn!(error = %err, "ping failed, closing pool");
            pool.close();
            return Err(err);
        }
        info!("ping successful");
    }

    Ok(PgPool {
        inner: pool,
        settings: Arc::new(settings),
    })
}

async fn ping(pool: &Pool) -> DbResult<()> {
    let client = pool
        .get()
        .await
        .map_err(|e| DbError::rejected(TARGET, Stage::Ping, e))?;
    client
        .simple_query("SELECT 1")
        .await
        .map_err(|e| DbError::rejected(TARGET, Stage::Ping, e))?;
    Ok(())
}
