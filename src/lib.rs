//! # bedb
//!
//! Declarative database connections: describe a database in a
//! [`DbConfig`] (in code or in a TOML file) and get back a ready client.
//!
//! bedb provides:
//! - MongoDB connection-mode resolution (`tunnel`, `direct`, `private`)
//! - Pooled PostgreSQL handles on `deadpool-postgres`
//! - Pooled MySQL handles on `mysql_async`
//! - One connect deadline bounding both the open and the optional ping
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bedb::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DbError> {
//!     bedb::logging::init();
//!
//!     let mut config = DbConfig::from_file("bedb.toml")?;
//!     let client = bedb::mongodb::connect_mongo(&mut config).await?;
//!
//!     let names = client.list_database_names().await;
//!     println!("{names:?}");
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Configuration, defaults, and error types shared by every backend.
pub mod core {
    pub use bedb_core::*;
}

/// Log subscriber setup driven by `BEDB_*` environment variables.
pub mod logging {
    pub use bedb_core::logging::*;
}

/// MongoDB mode resolution and client construction.
#[cfg(feature = "mongodb")]
#[cfg_attr(docsrs, doc(cfg(feature = "mongodb")))]
pub mod mongodb {
    pub use bedb_mongodb::*;
}

/// Pooled PostgreSQL connections.
#[cfg(feature = "postgres")]
#[cfg_attr(docsrs, doc(cfg(feature = "postgres")))]
pub mod postgres {
    pub use bedb_postgres::*;
}

/// Pooled MySQL connections.
#[cfg(feature = "mysql")]
#[cfg_attr(docsrs, doc(cfg(feature = "mysql")))]
pub mod mysql {
    pub use bedb_mysql::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{ConnectDefaults, DbConfig, DbError, DbResult, MongoMode};

    #[cfg(feature = "mongodb")]
    pub use crate::mongodb::{MongoClient, connect_mongo};
    #[cfg(feature = "mysql")]
    pub use crate::mysql::{MysqlPool, connect_mysql};
    #[cfg(feature = "postgres")]
    pub use crate::postgres::{PgPool, connect_postgres};
}

// Re-export key types at the crate root
pub use bedb_core::{ConnectDefaults, DbConfig, DbError, DbResult, ErrorKind, MongoMode, Stage};
