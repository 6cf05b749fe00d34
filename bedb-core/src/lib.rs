//! # bedb-core
//!
//! Shared building blocks for the bedb connectors:
//! - [`DbConfig`], the one configuration record every connector accepts
//! - [`MongoMode`] and the ordered [`QueryParams`] map
//! - [`ConnectDefaults`], the injectable fallback values
//! - [`DbError`], separating configuration failures from connectivity failures
//! - TOML loading with `${VAR}` expansion, and opt-in log setup

pub mod config;
pub mod defaults;
pub mod env;
pub mod error;
pub mod logging;

pub use config::{
    DbConfig, DbConfigBuilder, MongoMode, MysqlSettings, PostgresSettings, QueryParams,
};
pub use defaults::ConnectDefaults;
pub use env::{EnvExpander, EnvSource, MapEnvSource, StdEnvSource};
pub use error::{BoxError, DbError, DbResult, ErrorKind, Stage};
