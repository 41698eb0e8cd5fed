//! Admin site registry and submission flow.
//!
//! # Responsibility
//! - Hold one `ModelAdmin` per registered model name.
//! - Turn an add/change form submission into a `save_model` call.
//! - Report validation failures as a redisplay of the form.
//!
//! # Invariants
//! - Registration is explicit; nothing registers itself.
//! - `Redisplay` outcomes leave the store untouched.
//! - A redisplay flags every violated field, including values that failed
//!   to bind and checks on the values that did.

use crate::admin::form::{AdminRequest, FormData};
use crate::admin::options::{full_clean_with, ModelAdmin};
use crate::admin::{AdminError, AdminResult};
use crate::model::{Model, ValidationError};
use crate::repo::ModelStore;
use log::{error, info};
use std::collections::BTreeMap;
use std::time::Instant;

/// Result of submitting an add/change form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The object was persisted.
    Saved { object_id: String, change: bool },
    /// Nothing was persisted; show `form` again with `errors` flagged.
    Redisplay {
        errors: ValidationError,
        form: FormData,
    },
}

impl SubmitOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Type-erased view of a registered `ModelAdmin`.
trait RegisteredAdmin {
    fn submit(
        &self,
        request: &AdminRequest,
        form: &FormData,
        object_id: Option<&str>,
    ) -> AdminResult<SubmitOutcome>;

    fn delete(&self, request: &AdminRequest, object_id: &str) -> AdminResult<()>;
}

impl<A: ModelAdmin> RegisteredAdmin for A {
    fn submit(
        &self,
        request: &AdminRequest,
        form: &FormData,
        object_id: Option<&str>,
    ) -> AdminResult<SubmitOutcome> {
        let existing = match object_id {
            Some(raw) => Some(load_object(self, raw)?),
            None => None,
        };
        let change = existing.is_some();

        let bound = A::Model::bind_form(existing, form);
        if !bound.errors.is_empty() {
            let errors = unbound_form_errors(self, &bound.object, bound.errors)?;
            return Ok(SubmitOutcome::Redisplay {
                errors,
                form: form.clone(),
            });
        }
        let obj = bound.object;

        match self.save_model(request, &obj, form, change) {
            Ok(()) => Ok(SubmitOutcome::Saved {
                object_id: obj.id().to_string(),
                change,
            }),
            Err(AdminError::Validation(errors)) => Ok(SubmitOutcome::Redisplay {
                errors,
                form: form.clone(),
            }),
            Err(other) => Err(other),
        }
    }

    fn delete(&self, request: &AdminRequest, object_id: &str) -> AdminResult<()> {
        let obj = load_object(self, object_id)?;
        self.delete_model(request, &obj)
    }
}

/// Violations for a form that did not fully bind: the binding errors plus
/// full validation of the bound object, minus checks on fields whose
/// submitted value never reached the object.
fn unbound_form_errors<A: ModelAdmin>(
    admin: &A,
    obj: &A::Model,
    binding: ValidationError,
) -> AdminResult<ValidationError> {
    let mut errors = match full_clean_with(obj, admin.store()) {
        Ok(()) => ValidationError::new(),
        Err(AdminError::Validation(found)) => found,
        Err(other) => return Err(other),
    };
    for field in binding.fields() {
        errors.remove_field(field);
    }
    errors.merge(binding);
    Ok(errors)
}

fn load_object<A: ModelAdmin>(admin: &A, raw_id: &str) -> AdminResult<A::Model> {
    let not_found = || AdminError::ObjectNotFound {
        model: A::Model::MODEL_NAME,
        id: raw_id.to_string(),
    };

    let id = raw_id
        .trim()
        .parse::<<A::Model as Model>::Id>()
        .map_err(|_| not_found())?;
    admin.store().get(id)?.ok_or_else(not_found)
}

/// Registry of model admins, keyed by model name.
#[derive(Default)]
pub struct AdminSite<'a> {
    admins: BTreeMap<&'static str, Box<dyn RegisteredAdmin + 'a>>,
}

impl<'a> AdminSite<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `admin` for its model.
    ///
    /// # Errors
    /// - `AlreadyRegistered` when the model already has an admin.
    pub fn register<A>(&mut self, admin: A) -> AdminResult<()>
    where
        A: ModelAdmin + 'a,
    {
        let name = A::Model::MODEL_NAME;
        if self.admins.contains_key(name) {
            return Err(AdminError::AlreadyRegistered(name));
        }

        self.admins.insert(name, Box::new(admin));
        info!("event=admin_register module=admin status=ok model={name}");
        Ok(())
    }

    /// Removes the admin registered for `model_name`.
    pub fn unregister(&mut self, model_name: &str) -> AdminResult<()> {
        match self.admins.remove(model_name) {
            Some(_) => Ok(()),
            None => Err(AdminError::NotRegistered(model_name.to_string())),
        }
    }

    pub fn is_registered(&self, model_name: &str) -> bool {
        self.admins.contains_key(model_name)
    }

    /// Registered model names in sorted order.
    pub fn registered_models(&self) -> Vec<&'static str> {
        self.admins.keys().copied().collect()
    }

    /// Submits an add form (`object_id == None`) or a change form for an
    /// existing object.
    ///
    /// # Errors
    /// - `NotRegistered` for unknown models.
    /// - `ObjectNotFound` when `object_id` does not name a stored object.
    /// - `Repo` on store failures.
    ///
    /// Validation failures are not errors; they come back as
    /// `SubmitOutcome::Redisplay`.
    pub fn submit(
        &self,
        model_name: &str,
        request: &AdminRequest,
        form: &FormData,
        object_id: Option<&str>,
    ) -> AdminResult<SubmitOutcome> {
        let admin = self.lookup(model_name)?;
        let started_at = Instant::now();
        let change = object_id.is_some();

        let result = admin.submit(request, form, object_id);
        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(SubmitOutcome::Saved { .. }) => info!(
                "event=admin_submit module=admin status=ok model={model_name} change={change} user={} duration_ms={duration_ms}",
                request.user
            ),
            Ok(SubmitOutcome::Redisplay { errors, .. }) => info!(
                "event=admin_submit module=admin status=rejected model={model_name} change={change} user={} violations={} duration_ms={duration_ms}",
                request.user,
                errors.len()
            ),
            Err(err) => error!(
                "event=admin_submit module=admin status=error model={model_name} change={change} user={} duration_ms={duration_ms} error={err}",
                request.user
            ),
        }
        result
    }

    /// Deletes one stored object through its model admin.
    pub fn delete(
        &self,
        model_name: &str,
        request: &AdminRequest,
        object_id: &str,
    ) -> AdminResult<()> {
        let result = self.lookup(model_name)?.delete(request, object_id);
        match &result {
            Ok(()) => info!(
                "event=admin_delete module=admin status=ok model={model_name} user={}",
                request.user
            ),
            Err(err) => error!(
                "event=admin_delete module=admin status=error model={model_name} user={} error={err}",
                request.user
            ),
        }
        result
    }

    fn lookup(&self, model_name: &str) -> AdminResult<&(dyn RegisteredAdmin + 'a)> {
        self.admins
            .get(model_name)
            .map(|admin| admin.as_ref())
            .ok_or_else(|| AdminError::NotRegistered(model_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{AdminSite, SubmitOutcome};
    use crate::admin::form::{AdminRequest, FormData};
    use crate::admin::AdminError;
    use crate::db::open_db_in_memory;
    use crate::model::ValidationError;

    #[test]
    fn empty_site_rejects_unknown_models() {
        let site = AdminSite::new();
        let err = site
            .submit("coffee_order", &AdminRequest::new("ana"), &FormData::new(), None)
            .expect_err("unregistered model must be rejected");
        assert!(matches!(err, AdminError::NotRegistered(name) if name == "coffee_order"));
    }

    #[test]
    fn unregister_requires_existing_registration() {
        let conn = open_db_in_memory().expect("in-memory db");
        let mut site = AdminSite::new();
        crate::admin::setup(&mut site, &conn).expect("setup");

        site.unregister("coffee_order").expect("registered model");
        assert!(!site.is_registered("coffee_order"));
        assert!(matches!(
            site.unregister("coffee_order"),
            Err(AdminError::NotRegistered(_))
        ));
    }

    #[test]
    fn is_saved_only_for_saved_outcome() {
        let saved = SubmitOutcome::Saved {
            object_id: "x".to_string(),
            change: false,
        };
        let redisplay = SubmitOutcome::Redisplay {
            errors: ValidationError::field("size", "bad"),
            form: FormData::new(),
        };
        assert!(saved.is_saved());
        assert!(!redisplay.is_saved());
    }
}
