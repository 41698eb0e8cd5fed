//! Administrative interface for registered models.
//!
//! # Responsibility
//! - Route add/change submissions for registered models through their
//!   `ModelAdmin` save pipeline.
//! - Provide the boot-time registration of the coffee order admin.
//!
//! # Invariants
//! - A model is registered at most once per `AdminSite`.
//! - A rejected submission never mutates the store.

use crate::model::ValidationError;
use crate::repo::coffee_order_repo::SqliteCoffeeOrderRepository;
use crate::repo::RepoError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod coffee_order_admin;
pub mod form;
pub mod options;
pub mod site;

pub use coffee_order_admin::CoffeeOrderAdmin;
pub use form::{AdminRequest, FormData};
pub use options::{default_save_model, full_clean_with, DefaultModelAdmin, ModelAdmin};
pub use site::{AdminSite, SubmitOutcome};

pub type AdminResult<T> = Result<T, AdminError>;

#[derive(Debug)]
pub enum AdminError {
    Validation(ValidationError),
    Repo(RepoError),
    AlreadyRegistered(&'static str),
    NotRegistered(String),
    ObjectNotFound { model: &'static str, id: String },
}

impl Display for AdminError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::AlreadyRegistered(model) => write!(f, "model `{model}` is already registered"),
            Self::NotRegistered(model) => write!(f, "model `{model}` is not registered"),
            Self::ObjectNotFound { model, id } => write!(f, "{model} with id `{id}` does not exist"),
        }
    }
}

impl Error for AdminError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for AdminError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for AdminError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Registers every admin this crate ships on `site`.
///
/// Call once during startup, after the connection has been opened with
/// `db::open_db`.
///
/// # Errors
/// - `Repo` when `conn` is not migrated.
/// - `AlreadyRegistered` when `site` already has a coffee order admin.
pub fn setup<'conn>(site: &mut AdminSite<'conn>, conn: &'conn Connection) -> AdminResult<()> {
    let repo = SqliteCoffeeOrderRepository::try_new(conn)?;
    site.register(CoffeeOrderAdmin::new(repo))
}
