//! Domain models registered with the admin.
//!
//! # Responsibility
//! - Define the `Model` contract the admin and stores operate on.
//! - Own field-level and model-level constraint checks.
//!
//! # Invariants
//! - `full_clean()` runs every check and reports all violations at once.
//! - Cleaning never mutates the object.

use crate::admin::form::FormData;
use std::fmt::{Debug, Display};
use std::str::FromStr;

pub mod coffee_order;
pub mod validation;

pub use validation::ValidationError;

/// Contract for an entity that can be validated, bound from admin forms and
/// persisted through a `ModelStore`.
pub trait Model: Clone + Sized {
    /// Primary key type. Must round-trip through its string form so the
    /// admin site can address objects without knowing the concrete type.
    type Id: Copy + Eq + Debug + Display + FromStr;

    /// Stable registry key, e.g. `coffee_order`.
    const MODEL_NAME: &'static str;

    fn id(&self) -> Self::Id;

    /// Per-field checks. Must collect every violation, not stop at the first.
    fn clean_fields(&self) -> Result<(), ValidationError>;

    /// Cross-field checks.
    fn clean(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// `(field, value)` pairs that must be unique across stored objects.
    fn unique_fields(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Runs `clean_fields` and `clean` and merges their violations.
    ///
    /// Uniqueness needs a store; see `admin::options::full_clean_with`.
    fn full_clean(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if let Err(err) = self.clean_fields() {
            errors.merge(err);
        }
        if let Err(err) = self.clean() {
            errors.merge(err);
        }
        errors.into_result()
    }

    /// Applies submitted form values on top of `base` (change) or a fresh
    /// object (add).
    ///
    /// Every value that parses is applied. Values that do not parse, and
    /// required values submitted blank, are left out of the object and
    /// reported in `BoundForm::errors`.
    fn bind_form(base: Option<Self>, form: &FormData) -> BoundForm<Self>;
}

/// Object built from a form plus the fields that could not be bound.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundForm<M> {
    pub object: M,
    pub errors: ValidationError,
}

impl<M> BoundForm<M> {
    /// `Ok(object)` when every submitted value was bound.
    pub fn into_result(self) -> Result<M, ValidationError> {
        self.errors.into_result()?;
        Ok(self.object)
    }
}
