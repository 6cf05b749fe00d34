//! The connection configuration record.
//!
//! One [`DbConfig`] shape serves every connector: the identity fields and the
//! connect budget are shared, `mode`/`query_params` drive MongoDB resolution,
//! and the `postgres`/`mysql` sections carry pool and session settings.
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 27017
//! user = "mongo"
//! password = "${MONGO_PASSWORD}"
//! database = "admin"
//! connect_timeout = 5
//! validate_ping = true
//! mode = "tunnel"
//!
//! [query_params]
//! replicaSet = "rs0"
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::env::{EnvExpander, EnvSource};
use crate::error::{DbError, DbResult};

/// Extra connection options keyed by the driver's option names.
///
/// Keys are case-sensitive. The map keeps insertion order and removals use
/// `shift_remove`, so rendering follows that order; it is not a stable
/// contract and must not be relied upon.
pub type QueryParams = IndexMap<String, String>;

/// Deployment topology used to reach a MongoDB server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum MongoMode {
    /// Port-forwarded through an SSM/SSH tunnel to a local address.
    #[serde(rename = "tunnel")]
    Tunnel,
    /// Managed cloud cluster reached through an SRV record.
    #[serde(rename = "direct")]
    DirectCloud,
    /// Private network address (VPC peering, private endpoint).
    #[serde(rename = "private")]
    Private,
}

impl MongoMode {
    /// The literal used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tunnel => "tunnel",
            Self::DirectCloud => "direct",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for MongoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MongoMode {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tunnel" => Ok(Self::Tunnel),
            "direct" => Ok(Self::DirectCloud),
            "private" => Ok(Self::Private),
            other => Err(DbError::config(
                "mongodb",
                format!("unknown mongo mode: {other}"),
            )),
        }
    }
}

/// PostgreSQL-only settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostgresSettings {
    /// `disable`, `prefer` or `require`; empty means `disable`.
    pub ssl_mode: String,
    /// Shown in `pg_stat_activity`.
    pub application_name: Option<String>,
    /// Seconds; 0 means the default.
    pub statement_timeout: u64,
    pub max_idle_conns: usize,
    pub max_open_conns: usize,
}

/// MySQL-only settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MysqlSettings {
    /// Seconds; 0 means the default.
    pub read_timeout: u64,
    /// Seconds; 0 means the default.
    pub write_timeout: u64,
    pub max_idle_conns: usize,
    pub max_open_conns: usize,
}

/// Declarative connection configuration.
///
/// The record is read once per connect call. MongoDB resolution consumes
/// `query_params` in place: keys a mode reinterprets as structured options
/// are removed and mode defaults are inserted, so the map is not the same
/// after the call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Seconds for the whole connect sequence; 0 means the default.
    pub connect_timeout: u64,
    /// Run a liveness probe after opening.
    pub validate_ping: bool,
    /// MongoDB deployment mode. Required by the MongoDB connector.
    pub mode: Option<MongoMode>,
    /// MongoDB pass-through and overridable options.
    pub query_params: QueryParams,
    pub postgres: PostgresSettings,
    pub mysql: MysqlSettings,
}

impl DbConfig {
    /// Create a builder.
    pub fn builder() -> DbConfigBuilder {
        DbConfigBuilder::default()
    }

    /// Load configuration from a TOML file, expanding environment variables.
    pub fn from_file(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DbError::config("config", format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML, expanding `${VAR}` references from the
    /// process environment first.
    pub fn from_toml_str(content: &str) -> DbResult<Self> {
        Self::from_toml_str_with(content, &EnvExpander::new())
    }

    /// Parse configuration from TOML with a custom variable source.
    pub fn from_toml_str_with<S: EnvSource>(
        content: &str,
        expander: &EnvExpander<S>,
    ) -> DbResult<Self> {
        let expanded = expander.expand(content)?;
        toml::from_str(&expanded)
            .map_err(|e| DbError::config("config", format!("invalid TOML: {}", e)))
    }

    /// Check that the identity fields are present.
    ///
    /// `require_port` is false only for SRV-style addressing where the port
    /// comes from DNS.
    pub fn validate_identity(&self, target: &str, require_port: bool) -> DbResult<()> {
        let missing = [
            ("host", self.host.is_empty()),
            ("user", self.user.is_empty()),
            ("password", self.password.is_empty()),
            ("database", self.database.is_empty()),
            ("port", require_port && self.port == 0),
        ];

        match missing.iter().find(|(_, absent)| *absent) {
            Some((field, _)) => Err(DbError::config(target, format!("{field} is required"))),
            None => Ok(()),
        }
    }
}

/// Builder for [`DbConfig`].
#[derive(Debug, Default)]
pub struct DbConfigBuilder {
    config: DbConfig,
}

impl DbConfigBuilder {
    /// Set the host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the username.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.config.user = user.into();
        self
    }

    /// Set the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    /// Set the database name.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.database = database.into();
        self
    }

    /// Set the connect budget in seconds.
    pub fn connect_timeout(mut self, seconds: u64) -> Self {
        self.config.connect_timeout = seconds;
        self
    }

    /// Enable or disable the post-open liveness probe.
    pub fn validate_ping(mut self, enabled: bool) -> Self {
        self.config.validate_ping = enabled;
        self
    }

    /// Set the MongoDB mode.
    pub fn mode(mut self, mode: MongoMode) -> Self {
        self.config.mode = Some(mode);
        self
    }

    /// Add a MongoDB query parameter.
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.query_params.insert(key.into(), value.into());
        self
    }

    /// Set the PostgreSQL settings.
    pub fn postgres(mut self, settings: PostgresSettings) -> Self {
        self.config.postgres = settings;
        self
    }

    /// Set the MySQL settings.
    pub fn mysql(mut self, settings: MysqlSettings) -> Self {
        self.config.mysql = settings;
        self
    }

    /// Finish the record. Validation happens at connect time.
    pub fn build(self) -> DbConfig {
        self.config
    }
}
