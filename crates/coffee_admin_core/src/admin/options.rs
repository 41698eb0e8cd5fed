//! Per-model admin options and the default save pipeline.

use crate::admin::form::{AdminRequest, FormData};
use crate::admin::AdminResult;
use crate::model::{Model, ValidationError};
use crate::repo::ModelStore;
use std::marker::PhantomData;

/// Admin behavior for one model type.
///
/// Hooks have default implementations; an admin overrides only what it
/// needs and calls the `default_*` free functions for the inherited part.
pub trait ModelAdmin {
    type Model: Model;
    type Store: ModelStore<Self::Model>;

    fn store(&self) -> &Self::Store;

    /// Persists an object coming from an add (`change == false`) or change
    /// (`change == true`) form.
    ///
    /// The default does not validate the object.
    fn save_model(
        &self,
        request: &AdminRequest,
        obj: &Self::Model,
        form: &FormData,
        change: bool,
    ) -> AdminResult<()> {
        default_save_model(self, request, obj, form, change)
    }

    fn delete_model(&self, _request: &AdminRequest, obj: &Self::Model) -> AdminResult<()> {
        self.store().delete(obj.id())?;
        Ok(())
    }
}

/// The inherited `save_model` behavior: hand `obj` to the store.
///
/// `request`, `form` and `change` are accepted for hook signature parity and
/// not inspected; the store decides between insert and update by id.
pub fn default_save_model<A>(
    admin: &A,
    _request: &AdminRequest,
    obj: &A::Model,
    _form: &FormData,
    _change: bool,
) -> AdminResult<()>
where
    A: ModelAdmin + ?Sized,
{
    admin.store().save(obj)?;
    Ok(())
}

/// Full validation of `obj`: field checks, model checks and uniqueness
/// against `store`, all violations merged.
///
/// # Errors
/// - `AdminError::Validation` with every violation found.
/// - `AdminError::Repo` when a uniqueness lookup fails.
pub fn full_clean_with<M, S>(obj: &M, store: &S) -> AdminResult<()>
where
    M: Model,
    S: ModelStore<M> + ?Sized,
{
    let mut errors = match obj.full_clean() {
        Ok(()) => ValidationError::new(),
        Err(err) => err,
    };

    for (field, value) in obj.unique_fields() {
        if errors.has_field(field) {
            continue;
        }
        if store.exists_with(field, &value, Some(obj.id()))? {
            errors.add(
                field,
                format!("{} with this {field} already exists.", M::MODEL_NAME),
            );
        }
    }

    errors.into_result()?;
    Ok(())
}

/// Admin with no overrides; saves whatever the form produced.
pub struct DefaultModelAdmin<M, S> {
    store: S,
    _model: PhantomData<M>,
}

impl<M, S> DefaultModelAdmin<M, S>
where
    M: Model,
    S: ModelStore<M>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            _model: PhantomData,
        }
    }
}

impl<M, S> ModelAdmin for DefaultModelAdmin<M, S>
where
    M: Model,
    S: ModelStore<M>,
{
    type Model = M;
    type Store = S;

    fn store(&self) -> &S {
        &self.store
    }
}
