//! Admin for coffee orders.
//!
//! # Invariants
//! - Every save runs full validation first; a rejected order never reaches
//!   the store.

use crate::admin::form::{AdminRequest, FormData};
use crate::admin::options::{default_save_model, full_clean_with, ModelAdmin};
use crate::admin::AdminResult;
use crate::model::coffee_order::CoffeeOrder;
use crate::repo::ModelStore;

/// Coffee order admin with validate-then-save semantics.
pub struct CoffeeOrderAdmin<S> {
    store: S,
}

impl<S: ModelStore<CoffeeOrder>> CoffeeOrderAdmin<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: ModelStore<CoffeeOrder>> ModelAdmin for CoffeeOrderAdmin<S> {
    type Model = CoffeeOrder;
    type Store = S;

    fn store(&self) -> &S {
        &self.store
    }

    fn save_model(
        &self,
        request: &AdminRequest,
        obj: &CoffeeOrder,
        form: &FormData,
        change: bool,
    ) -> AdminResult<()> {
        full_clean_with(obj, &self.store)?;
        default_save_model(self, request, obj, form, change)
    }
}
