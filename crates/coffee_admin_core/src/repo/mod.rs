//! Persistence contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the `ModelStore` contract the admin saves through.
//! - Isolate SQL details from admin orchestration.
//!
//! # Invariants
//! - Stores persist what they are given; model validation belongs to the
//!   caller. Schema constraints still surface as `RepoError::Db`.
//! - Read paths reject malformed persisted rows instead of masking them.

use crate::db::DbError;
use crate::model::Model;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod coffee_order_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for model persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound {
        model: &'static str,
        id: String,
    },
    InvalidData(String),
    /// Uniqueness lookup against a field the store does not index.
    UnknownField(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { model, id } => write!(f, "{model} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UnknownField(field) => write!(f, "field `{field}` cannot be checked for uniqueness"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Pagination for list queries.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Persistence contract for one model type.
pub trait ModelStore<M: Model> {
    fn insert(&self, obj: &M) -> RepoResult<M::Id>;

    /// Overwrites the stored row with `obj`. `NotFound` when absent.
    fn update(&self, obj: &M) -> RepoResult<()>;

    fn get(&self, id: M::Id) -> RepoResult<Option<M>>;

    /// Most recently updated first.
    fn list(&self, query: &ListQuery) -> RepoResult<Vec<M>>;

    fn delete(&self, id: M::Id) -> RepoResult<()>;

    /// Whether another stored object (not `exclude`) has `value` in `field`.
    fn exists_with(&self, field: &str, value: &str, exclude: Option<M::Id>) -> RepoResult<bool>;

    /// Updates when `obj.id()` is already stored, inserts otherwise.
    ///
    /// Saving the same object repeatedly never creates a second row.
    fn save(&self, obj: &M) -> RepoResult<M::Id> {
        if self.get(obj.id())?.is_some() {
            self.update(obj)?;
            Ok(obj.id())
        } else {
            self.insert(obj)
        }
    }
}
