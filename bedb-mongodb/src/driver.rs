//! The seam between connection resolution and the MongoDB driver.

use async_trait::async_trait;
use bedb_core::{DbError, DbResult, Stage};
use mongodb::Client;
use mongodb::error::ErrorKind;

use crate::client::MongoClient;
use crate::resolver::ResolvedConnection;

/// Opens, probes and closes clients for resolved connections.
///
/// Deadlines are enforced by the caller; implementations only perform the
/// operation and report its outcome.
#[async_trait]
pub trait MongoDriver: Send + Sync {
    /// The client handle produced by [`open`](Self::open).
    type Handle: Send + Sync;

    /// Build a client for `resolved`.
    async fn open(&self, resolved: &ResolvedConnection) -> DbResult<Self::Handle>;

    /// One liveness round-trip.
    async fn ping(&self, handle: &Self::Handle) -> DbResult<()>;

    /// Release the client and everything it holds.
    async fn close(&self, handle: Self::Handle);
}

/// [`MongoDriver`] backed by the official `mongodb` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfficialDriver;

#[async_trait]
impl MongoDriver for OfficialDriver {
    type Handle = MongoClient;

    async fn open(&self, resolved: &ResolvedConnection) -> DbResult<MongoClient> {
        let target = resolved.target();

        let options = resolved
            .options
            .to_client_options(&resolved.uri)
            .await
            .map_err(|e| open_error(&target, e))?;

        let client = Client::with_options(options).map_err(|e| open_error(&target, e))?;

        Ok(MongoClient::new(client, &resolved.database, resolved.mode))
    }

    async fn ping(&self, handle: &MongoClient) -> DbResult<()> {
        handle.ping().await.map_err(|e| {
            DbError::rejected(format!("mongodb:{}", handle.mode()), Stage::Ping, e)
        })
    }

    async fn close(&self, handle: MongoClient) {
        handle.shutdown().await;
    }
}

/// Invalid options are a configuration problem; anything else (DNS for SRV
/// records, resolver failures) is a rejected open.
fn open_error(target: &str, err: mongodb::error::Error) -> DbError {
    match err.kind.as_ref() {
        ErrorKind::InvalidArgument { message, .. } => DbError::config(target, message.clone()),
        _ => DbError::rejected(target, Stage::Open, err),
    }
}

#[cfg(test)]
mod tests {
    use bedb_core::{ConnectDefaults, DbConfig, MongoMode};

    use super::*;
    use crate::resolver::resolve;

    fn private_config() -> DbConfig {
        DbConfig::builder()
            .host("10.0.0.5")
            .port(27017)
            .user("svc")
            .password("pw")
            .database("orders")
            .mode(MongoMode::Private)
            .build()
    }

    #[tokio::test]
    async fn test_open_is_lazy_and_keeps_database() {
        let mut config = private_config();
        let resolved = resolve(&mut config, &ConnectDefaults::default()).unwrap();

        let client = OfficialDriver.open(&resolved).await.unwrap();
        assert_eq!(client.database().name(), "orders");
        assert_eq!(client.mode(), MongoMode::Private);

        OfficialDriver.close(client).await;
    }

    #[tokio::test]
    async fn test_invalid_option_is_configuration_error() {
        let mut config = private_config();
        config
            .query_params
            .insert("maxPoolSize".into(), "lots".into());
        let resolved = resolve(&mut config, &ConnectDefaults::default()).unwrap();

        let err = OfficialDriver.open(&resolved).await.unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.target(), "mongodb:private");
    }
}
