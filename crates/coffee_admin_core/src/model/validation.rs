//! Field-scoped validation errors.
//!
//! # Responsibility
//! - Collect every constraint violation found while cleaning one object.
//! - Keep violations addressable by field so edit screens can flag them.
//!
//! # Invariants
//! - A `ValidationError` returned as `Err` is never empty.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Message used when a required value is missing.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Structured collection of field/constraint violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    violations: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error holding one violation for `field`.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut error = Self::new();
        error.add(field, message);
        error
    }

    /// Records one violation for `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Moves all violations of `other` into `self`.
    pub fn merge(&mut self, other: ValidationError) {
        for (field, messages) in other.violations {
            self.violations.entry(field).or_default().extend(messages);
        }
    }

    /// Drops every violation recorded for `field`.
    pub fn remove_field(&mut self, field: &str) {
        self.violations.remove(field);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of individual violations across all fields.
    pub fn len(&self) -> usize {
        self.violations.values().map(Vec::len).sum()
    }

    /// `Ok(())` when nothing was collected, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Sorted names of fields carrying at least one violation.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.violations.keys().map(String::as_str)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.contains_key(field)
    }

    /// Messages recorded for `field`, empty when the field is clean.
    pub fn messages_for(&self, field: &str) -> &[String] {
        self.violations
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterates `(field, messages)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.violations
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl Error for ValidationError {}
