//! # bedb-mysql
//!
//! Builds a pooled MySQL handle from a [`DbConfig`](bedb_core::DbConfig)
//! using `mysql_async`.
//!
//! ```rust,ignore
//! use bedb_core::DbConfig;
//! use bedb_mysql::connect_mysql;
//! use mysql_async::prelude::*;
//!
//! let config = DbConfig::builder()
//!     .host("localhost")
//!     .port(3306)
//!     .user("root")
//!     .password("root")
//!     .database("test")
//!     .validate_ping(true)
//!     .build();
//!
//! let pool = connect_mysql(&config).await?;
//! let mut conn = pool.get_conn().await?;
//! let one: Option<u32> = conn.query_first("SELECT 1").await?;
//! pool.disconnect().await?;
//! ```

pub mod config;
pub mod pool;

pub use config::MysqlPoolSettings;
pub use pool::{MysqlPool, connect_mysql, connect_mysql_with};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::pool::{MysqlPool, connect_mysql, connect_mysql_with};
    pub use bedb_core::{ConnectDefaults, DbConfig, DbError, DbResult};
}
