//! Mapping from the configuration record to tokio-postgres settings.

use std::time::Duration;

use bedb_core::{ConnectDefaults, DbConfig, DbError, DbResult};
use tokio_postgres::config::SslMode;

pub(crate) const TARGET: &str = "postgres";

/// Resolved PostgreSQL connection and pool settings.
#[derive(Debug, Clone)]
pub struct PgSettings {
    /// Driver configuration (host, credentials, session options).
    pub pg_config: tokio_postgres::Config,
    /// Pool max size.
    pub max_connections: usize,
    /// Budget for creating a connection and for the optional ping.
    pub connect_timeout: Duration,
    /// Server-side `statement_timeout`.
    pub statement_timeout: Duration,
}

impl PgSettings {
    /// Validate `config` and derive the settings, substituting `defaults` for
    /// zero values.
    pub fn from_config(config: &DbConfig, defaults: &ConnectDefaults) -> DbResult<Self> {
        config.validate_identity(TARGET, true)?;

        let settings = &config.postgres;
        let ssl_mode = parse_ssl_mode(&settings.ssl_mode)?;
        let connect_timeout =
            ConnectDefaults::seconds_or(config.connect_timeout, defaults.connect_timeout);
        let statement_timeout =
            ConnectDefaults::seconds_or(settings.statement_timeout, defaults.statement_timeout);

        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&config.host)
            .port(config.port)
            .user(&config.user)
            .password(&config.password)
            .dbname(&config.database)
            .ssl_mode(ssl_mode)
            .connect_timeout(connect_timeout)
            .options(&format!(
                "-c statement_timeout={}",
                statement_timeout.as_millis()
            ));

        if let Some(ref name) = settings.application_name {
            pg_config.application_name(name);
        }

        Ok(Self {
            pg_config,
            max_connections: ConnectDefaults::count_or(
                settings.max_open_conns,
                defaults.max_open_connections,
            ),
            connect_timeout,
            statement_timeout,
        })
    }
}

/// Connections are made without TLS, so only modes that allow plaintext are
/// accepted.
fn parse_ssl_mode(value: &str) -> DbResult<SslMode> {
    match value {
        "" | "disable" => Ok(SslMode::Disable),
        "prefer" => Ok(SslMode::Prefer),
        "require" => Err(DbError::config(
            TARGET,
            "sslmode=require needs TLS, which this connector does not negotiate",
        )),
        other => Err(DbError::config(TARGET, format!("invalid sslmode: {other}"))),
    }
}
