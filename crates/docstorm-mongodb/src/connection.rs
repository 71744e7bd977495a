//! MongoDB connection management

use async_trait::async_trait;
use bson::{doc, Document as BsonDocument};
use futures::TryStreamExt;
use mongodb::{
    error::ErrorKind,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection, Database,
};
use tracing::{debug, info, instrument};

use crate::config::ConnectionConfig;
use crate::cursor::Cursor;
use crate::driver::{Backend, CollectionDriver, WriteStatus};
use crate::model::ID_FIELD;
use crate::validation::{validate_database_name, ValidatedCollectionName};
use crate::{Result, StormError};

/// MongoDB client built from a [`ConnectionConfig`].
///
/// The client lives until [`Connection::shutdown`] or drop; every record
/// operation opens a collection handle from it and closes it again.
#[derive(Clone)]
pub struct Connection {
    client: Client,
    default_database: String,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("default_database", &self.default_database)
            .finish()
    }
}

impl Connection {
    /// Create a new MongoDB client from the configuration
    #[instrument(skip(config), fields(host = %config.host, port = config.port))]
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;

        let mut client_options = ClientOptions::parse(config.to_uri())
            .await
            .map_err(|e| StormError::Connection(e.to_string()))?;

        if let Some(connect) = config.connect_timeout {
            client_options.connect_timeout = Some(connect);
        }
        if let Some(server_sel) = config.server_selection_timeout {
            client_options.server_selection_timeout = Some(server_sel);
        }
        if let Some(app) = &config.app_name {
            client_options.app_name = Some(app.clone());
        }

        // Set stable API version for compatibility
        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);

        let client = Client::with_options(client_options)?;
        info!("MongoDB client created");

        Ok(Self {
            client,
            default_database: config.database.clone(),
        })
    }

    /// Get a reference to the client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get a database by name
    pub fn database(&self, name: &str) -> Database {
        self.client.database(name)
    }

    /// Check if the server is reachable
    pub async fn ping(&self) -> Result<bool> {
        let database = if self.default_database.is_empty() {
            "admin"
        } else {
            self.default_database.as_str()
        };
        match self.client.database(database).run_command(doc! { "ping": 1 }).await {
            Ok(_) => Ok(true),
            Err(e) => Err(StormError::Connection(format!("Ping failed: {}", e))),
        }
    }

    /// List all collection names in a database
    pub async fn list_collection_names(&self, database: &str) -> Result<Vec<String>> {
        let names = self.client.database(database).list_collection_names().await?;
        Ok(names)
    }

    /// Close the client and its pooled connections
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        info!("MongoDB client shut down");
    }
}

#[async_trait]
impl Backend for Connection {
    type Collection = MongoCollection;

    fn default_database(&self) -> &str {
        &self.default_database
    }

    async fn open_collection(&self, database: &str, collection: &str) -> Result<MongoCollection> {
        validate_database_name(database)?;
        let name = ValidatedCollectionName::new(collection)?;
        debug!(database, collection = %name, "Opening collection");
        Ok(MongoCollection {
            collection: self.client.database(database).collection(name.as_str()),
        })
    }
}

/// Collection handle backed by the MongoDB driver
#[derive(Debug, Clone)]
pub struct MongoCollection {
    collection: Collection<BsonDocument>,
}

impl MongoCollection {
    /// Get the underlying driver collection
    pub fn inner(&self) -> &Collection<BsonDocument> {
        &self.collection
    }
}

/// Splits driver results into server write rejections (a status) and
/// everything else (an error).
fn write_status<T>(result: mongodb::error::Result<T>) -> Result<WriteStatus> {
    match result {
        Ok(_) => Ok(WriteStatus::Success),
        Err(e) if matches!(e.kind.as_ref(), ErrorKind::Write(_)) => {
            Ok(WriteStatus::Failed(e.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl CollectionDriver for MongoCollection {
    async fn find(&self, filter: BsonDocument, window: &Cursor) -> Result<Vec<BsonDocument>> {
        let mut action = self.collection.find(filter);
        if let Some(skip) = window.skip_option() {
            action = action.skip(skip);
        }
        if let Some(limit) = window.limit_option() {
            action = action.limit(limit);
        }
        if let Some(batch_size) = window.batch_size_option() {
            action = action.batch_size(batch_size);
        }

        let cursor = action.await?;
        let docs: Vec<BsonDocument> = cursor.try_collect().await?;
        Ok(docs)
    }

    async fn save(&self, document: BsonDocument) -> Result<WriteStatus> {
        match document.get(ID_FIELD).cloned() {
            Some(id) => {
                let mut selector = BsonDocument::new();
                selector.insert(ID_FIELD, id);
                write_status(
                    self.collection
                        .replace_one(selector, document)
                        .upsert(true)
                        .await,
                )
            }
            None => write_status(self.collection.insert_one(document).await),
        }
    }

    async fn remove(&self, filter: BsonDocument) -> Result<WriteStatus> {
        write_status(self.collection.delete_many(filter).await)
    }
}
