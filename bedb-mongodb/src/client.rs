//! Handle returned by a successful MongoDB connect.

use bedb_core::MongoMode;
use bson::{Document, doc};
use mongodb::{Client, Collection, Database};
use tracing::info;

/// A connected MongoDB client.
///
/// The driver pools connections internally; cloning the handle shares the
/// pool. The caller owns teardown through [`MongoClient::shutdown`].
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    database: Database,
    mode: MongoMode,
}

impl MongoClient {
    pub(crate) fn new(client: Client, database: &str, mode: MongoMode) -> Self {
        let database = client.database(database);
        Self {
            client,
            database,
            mode,
        }
    }

    /// Get the configured database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Get a different database from the same client.
    pub fn get_database(&self, name: &str) -> Database {
        self.client.database(name)
    }

    /// Get a collection of BSON documents in the configured database.
    pub fn collection_doc(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }

    /// Get the underlying MongoDB client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// The mode this client was resolved with.
    pub fn mode(&self) -> MongoMode {
        self.mode
    }

    /// Run `{ping: 1}` against `admin`.
    pub async fn ping(&self) -> mongodb::error::Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map(|_| ())
    }

    /// Check if the server answers a ping.
    pub async fn is_healthy(&self) -> bool {
        self.ping().await.is_ok()
    }

    /// List the databases visible to the connected user.
    pub async fn list_database_names(&self) -> mongodb::error::Result<Vec<String>> {
        self.client.list_database_names(None, None).await
    }

    /// Close the client and its pooled connections.
    pub async fn shutdown(self) {
        let mode = self.mode;
        self.client.shutdown().await;
        info!(mode = %mode, "MongoDB client closed");
    }
}

impl std::fmt::Debug for MongoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoClient")
            .field("database", &self.database.name())
            .field("mode", &self.mode)
            .finish()
    }
}
