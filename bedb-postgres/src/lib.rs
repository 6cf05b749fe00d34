//! # bedb-postgres
//!
//! Builds a pooled PostgreSQL handle from a [`DbConfig`](bedb_core::DbConfig)
//! using `tokio-postgres` and `deadpool-postgres`.
//!
//! ```rust,ignore
//! use bedb_core::DbConfig;
//! use bedb_postgres::connect_postgres;
//!
//! let config = DbConfig::builder()
//!     .host("localhost")
//!     .port(5432)
//!     .user("postgres")
//!     .password("postgres")
//!     .database("test")
//!     .validate_ping(true)
//!     .build();
//!
//! let pool = connect_postgres(&config).await?;
//! let client = pool.get().await?;
//! let rows = client.query("SELECT 1", &[]).await?;
//! ```

pub mod config;
pub mod pool;

pub use config::PgSettings;
pub use pool::{PgPool, PoolStatus, connect_postgres, connect_postgres_with};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::pool::{PgPool, connect_postgres, connect_postgres_with};
    pub use bedb_core::{ConnectDefaults, DbConfig, DbError, DbResult};
}
