//! MongoDB object/document mapping for docstorm
//!
//! This crate maps typed model structs onto MongoDB documents. Connecting,
//! querying and BSON encoding are left to the `mongodb` driver; this crate
//! translates filters, tracks pagination, turns result documents into rows and
//! rows into models, and decides how identifiers are stored.
//!
//! # Features
//! - Explicit `ConnectionConfig` and a `Connection` with its own lifetime
//! - `Model` trait with an explicit identifier accessor
//! - `Record` CRUD wrapper: get, find, save (upsert), delete
//! - ObjectId / opaque string identifier handling
//! - In-memory backend for tests

pub mod config;
pub mod connection;
pub mod cursor;
pub mod driver;
pub mod filter;
pub mod memory;
pub mod model;
pub mod object_id;
pub mod record;
pub mod row;
pub mod validation;

pub use config::{AuthMode, ConnectionConfig};
pub use connection::{Connection, MongoCollection};
pub use cursor::Cursor;
pub use docstorm_common::{Result, StormError};
pub use driver::{Backend, CollectionDriver, WriteStatus};
pub use filter::{Filter, FilterValue};
pub use memory::MemoryBackend;
pub use model::Model;
pub use object_id::{is_valid_object_id, new_object_id, new_uuid, IdKind};
pub use record::Record;
pub use row::{ResultSet, Row};
pub use validation::ValidatedCollectionName;
