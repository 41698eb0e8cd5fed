//! Core of the coffee order admin.
//! Models, their validation, SQLite persistence and the admin save pipeline.

pub mod admin;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use admin::{
    AdminError, AdminRequest, AdminResult, AdminSite, CoffeeOrderAdmin, DefaultModelAdmin,
    FormData, ModelAdmin, SubmitOutcome,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::coffee_order::{Beverage, CoffeeOrder, CoffeeOrderId, CupSize, Milk};
pub use model::{BoundForm, Model, ValidationError};
pub use repo::coffee_order_repo::SqliteCoffeeOrderRepository;
pub use repo::{ListQuery, ModelStore, RepoError, RepoResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
