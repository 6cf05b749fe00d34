//! Mapping from the configuration record to `mysql_async` options.

use std::time::Duration;

use bedb_core::{ConnectDefaults, DbConfig, DbError, DbResult};
use mysql_async::{Opts, OptsBuilder, PoolConstraints, PoolOpts};

pub(crate) const TARGET: &str = "mysql";

/// Resolved MySQL connection and pool settings.
#[derive(Debug, Clone)]
pub struct MysqlPoolSettings {
    pub opts: Opts,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub min_connections: usize,
    pub max_connections: usize,
}

impl MysqlPoolSettings {
    /// Validate `config` and derive the settings, substituting `defaults` for
    /// zero values.
    pub fn from_config(config: &DbConfig, defaults: &ConnectDefaults) -> DbResult<Self> {
        config.validate_identity(TARGET, true)?;

        let mysql = &config.mysql;
        let read_timeout = ConnectDefaults::seconds_or(mysql.read_timeout, defaults.read_timeout);
        let write_timeout =
            ConnectDefaults::seconds_or(mysql.write_timeout, defaults.write_timeout);
        let max_connections =
            ConnectDefaults::count_or(mysql.max_open_conns, defaults.max_open_connections);
        // Idle connections never exceed the open limit.
        let min_connections =
            ConnectDefaults::count_or(mysql.max_idle_conns, defaults.max_idle_connections)
                .min(max_connections);

        let constraints = PoolConstraints::new(min_connections, max_connections).ok_or_else(|| {
            DbError::config(
                TARGET,
                format!("invalid pool bounds: {min_connections}..{max_connections}"),
            )
        })?;

        let builder = OptsBuilder::default()
            .ip_or_hostname(config.host.as_str())
            .tcp_port(config.port)
            .user(Some(config.user.as_str()))
            .pass(Some(config.password.as_str()))
            .db_name(Some(config.database.as_str()))
            .init(vec![
                format!("SET SESSION net_read_timeout = {}", read_timeout.as_secs()),
                format!("SET SESSION net_write_timeout = {}", write_timeout.as_secs()),
            ])
            .pool_opts(PoolOpts::new().with_constraints(constraints));

        Ok(Self {
            opts: Opts::from(builder),
            connect_timeout: ConnectDefaults::seconds_or(
                config.connect_timeout,
                defaults.connect_timeout,
            ),
            read_timeout,
            write_timeout,
            min_connections,
            max_connections,
        })
    }
}
