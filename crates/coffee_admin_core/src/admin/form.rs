//! Request and form inputs of an admin submission.

use std::collections::BTreeMap;

/// Acting user/session of one admin request.
///
/// Passed through to `ModelAdmin` hooks untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRequest {
    pub user: String,
}

impl AdminRequest {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}

/// Submitted field values of an add/change form.
///
/// Keys absent from the form mean "not submitted"; an empty string means
/// "submitted blank".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: BTreeMap<String, String>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds form data from `(field, value)` pairs. Later pairs win.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut form = Self::new();
        for (key, value) in pairs {
            form.insert(key, value);
        }
        form
    }

    /// Parses one `field=value` assignment as typed on a command line.
    ///
    /// Returns `None` when there is no `=` or the field name is blank.
    pub fn parse_assignment(raw: &str) -> Option<(String, String)> {
        let (key, value) = raw.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), value.to_string()))
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}
