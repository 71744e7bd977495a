//! Record: a model plus the result set of its last query.
//!
//! `Record<M>` carries the CRUD operations. Each operation opens a collection
//! handle from the backend, performs one delegated call, closes the handle, and
//! maps the driver's documents back into rows and, when exactly one row came
//! back, into the model itself.

use bson::{Bson, Document as BsonDocument};
use tracing::{debug, error, info, instrument};

use crate::cursor::Cursor;
use crate::driver::{Backend, CollectionDriver, WriteStatus};
use crate::filter::Filter;
use crate::model::{Model, ID_FIELD};
use crate::object_id::{self, id_to_bson};
use crate::row::{parse_rows, ResultSet};
use crate::{Result, StormError};

/// A model instance bound to its collection.
#[derive(Debug, Clone, Default)]
pub struct Record<M: Model> {
    /// The typed model
    pub model: M,
    /// Rows and cursor of the last query
    pub results: ResultSet,
    database: Option<String>,
}

impl<M: Model> From<M> for Record<M> {
    fn from(model: M) -> Self {
        Self::new(model)
    }
}

impl<M: Model> Record<M> {
    /// Wrap a model
    pub fn new(model: M) -> Self {
        Self {
            model,
            results: ResultSet::default(),
            database: None,
        }
    }

    /// Use `database` instead of the backend's default database
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Unwrap the model
    pub fn into_model(self) -> M {
        self.model
    }

    /// Collection the model is stored in
    pub fn collection_name(&self) -> &'static str {
        M::collection_name()
    }

    /// Alias of [`Record::collection_name`]
    pub fn table(&self) -> &'static str {
        M::collection_name()
    }

    /// A fresh ObjectId string, for use as an identifier
    pub fn new_object_id(&self) -> String {
        object_id::new_object_id()
    }

    /// A fresh UUID string, for use as an identifier
    pub fn new_uuid(&self) -> String {
        object_id::new_uuid()
    }

    fn database_name<'a, B: Backend>(&'a self, backend: &'a B) -> &'a str {
        self.database
            .as_deref()
            .unwrap_or_else(|| backend.default_database())
    }

    async fn open<B: Backend>(&self, backend: &B) -> Result<B::Collection> {
        backend
            .open_collection(self.database_name(backend), M::collection_name())
            .await
    }

    /// Collection creation hook.
    ///
    /// MongoDB creates collections on first write, so this only checks that
    /// the collection can be opened.
    pub async fn setup<B: Backend>(&self, backend: &B) -> Result<()> {
        let collection = self.open(backend).await?;
        collection.close().await
    }

    /// Retrieve the document with identifier `id`, using the current cursor
    /// window. The model is populated when exactly one document matches.
    #[instrument(skip(self, backend), fields(collection = M::collection_name()))]
    pub async fn get_by_id<B: Backend>(&mut self, backend: &B, id: &str) -> Result<()> {
        let mut filter = BsonDocument::new();
        filter.insert(ID_FIELD, id_to_bson(id, M::id_kind())?);
        let window = self.results.cursor;
        self.run_find(backend, filter, window).await
    }

    /// Retrieve the document with the model's own identifier.
    ///
    /// Does nothing when the identifier is empty.
    pub async fn get<B: Backend>(&mut self, backend: &B) -> Result<()> {
        if self.model.key_is_empty() {
            return Ok(());
        }
        let id = self.model.id().to_string();
        self.get_by_id(backend, &id).await
    }

    /// Find documents equal to every condition of `filter`.
    ///
    /// For example `find(&conn, &Filter::new().equals("username", "joe"), Cursor::default())`
    /// finds all documents whose username is "joe".
    #[instrument(skip(self, backend, filter), fields(collection = M::collection_name(), conditions = filter.len()))]
    pub async fn find<B: Backend>(&mut self, backend: &B, filter: &Filter, cursor: Cursor) -> Result<()> {
        self.run_find(backend, filter.to_document(), cursor).await
    }

    /// List documents without a filter
    #[instrument(skip(self, backend), fields(collection = M::collection_name()))]
    pub async fn find_all<B: Backend>(&mut self, backend: &B, cursor: Cursor) -> Result<()> {
        self.run_find(backend, BsonDocument::new(), cursor).await
    }

    async fn run_find<B: Backend>(
        &mut self,
        backend: &B,
        filter: BsonDocument,
        window: Cursor,
    ) -> Result<()> {
        let collection = self.open(backend).await?;
        let found = collection.find(filter, &window).await;
        collection.close().await?;
        self.process_response(found?)
    }

    /// Only `total_records` is updated; the record's own window is left as is
    /// for later identifier lookups.
    fn process_response(&mut self, docs: Vec<BsonDocument>) -> Result<()> {
        self.results.rows = parse_rows(docs)?;
        self.results.cursor.total_records = self.results.rows.len();
        debug!(total_records = self.results.cursor.total_records, "Query complete");

        if self.results.cursor.total_records == 1 {
            self.make_row()?;
        }
        Ok(())
    }

    /// Populate the model from the first row of the result set
    pub fn make_row(&mut self) -> Result<()> {
        if let Some(row) = self.results.rows.first() {
            self.model = M::from_row(row)?;
        }
        Ok(())
    }

    /// Every row of the last result set as a model
    pub fn rows(&self) -> Result<Vec<M>> {
        self.results.rows.iter().map(M::from_row).collect()
    }

    /// Upsert the model.
    ///
    /// A model without an identifier gets a new one, written back to the
    /// model once the save succeeds, so saving again updates the same document.
    #[instrument(skip(self, backend), fields(collection = M::collection_name()))]
    pub async fn save<B: Backend>(&mut self, backend: &B) -> Result<()> {
        let (id, assigned) = match self.model.id_bson()? {
            Some(id) => (id, None),
            None => {
                let generated = object_id::new_object_id();
                (id_to_bson(&generated, M::id_kind())?, Some(generated))
            }
        };

        let mut document = BsonDocument::new();
        document.insert(ID_FIELD, id);
        for (key, value) in self.model.to_document()? {
            document.insert(key, value);
        }

        let collection = self.open(backend).await?;
        let status = collection.save(document).await;
        collection.close().await?;
        check_status("Save", status?)?;

        if let Some(generated) = assigned {
            self.model.set_id(generated);
        }
        info!(id = self.model.id(), "Saved");
        Ok(())
    }

    /// Remove the model's document.
    ///
    /// Fails with [`StormError::MissingId`] before touching the backend when
    /// the identifier is empty.
    #[instrument(skip(self, backend), fields(collection = M::collection_name()))]
    pub async fn delete<B: Backend>(&mut self, backend: &B) -> Result<()> {
        let id: Bson = match self.model.id_bson()? {
            Some(id) => id,
            None => return Err(StormError::MissingId),
        };

        let mut filter = BsonDocument::new();
        filter.insert(ID_FIELD, id);

        let collection = self.open(backend).await?;
        let status = collection.remove(filter).await;
        collection.close().await?;
        check_status("Delete", status?)?;

        info!(id = self.model.id(), "Deleted");
        Ok(())
    }
}

fn check_status(operation: &'static str, status: WriteStatus) -> Result<()> {
    match status {
        WriteStatus::Success => Ok(()),
        WriteStatus::Failed(status) => {
            error!(operation, %status, "MongoDB write rejected");
            Err(StormError::write_failed(operation, status))
        }
    }
}
