//! Coffee order domain model.
//!
//! # Responsibility
//! - Define the coffee order record managed through the admin.
//! - Declare its field-level and model-level constraints.
//! - Bind submitted admin form values onto an order.
//!
//! # Invariants
//! - `id` is stable and never reused for another order.
//! - `reference` is unique across stored orders (checked with a store).
//! - Milk rules depend on the beverage; see `clean()`.

use crate::admin::form::FormData;
use crate::model::validation::{ValidationError, REQUIRED_MESSAGE};
use crate::model::{BoundForm, Model};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one coffee order.
pub type CoffeeOrderId = Uuid;

pub const MAX_CUSTOMER_NAME_CHARS: usize = 100;
pub const MAX_NOTES_CHARS: usize = 255;
pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 20;
pub const MAX_EXTRA_SHOTS: u32 = 4;

static REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}-[0-9]{4}$").expect("valid reference regex"));

/// Beverage on the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Beverage {
    Espresso,
    Americano,
    Latte,
    Cappuccino,
    Mocha,
    ColdBrew,
}

impl Beverage {
    pub const ALL: [Beverage; 6] = [
        Beverage::Espresso,
        Beverage::Americano,
        Beverage::Latte,
        Beverage::Cappuccino,
        Beverage::Mocha,
        Beverage::ColdBrew,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Espresso => "espresso",
            Self::Americano => "americano",
            Self::Latte => "latte",
            Self::Cappuccino => "cappuccino",
            Self::Mocha => "mocha",
            Self::ColdBrew => "cold_brew",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.as_str() == value)
    }

    /// Milk-based drinks cannot be made without a milk choice.
    fn requires_milk(self) -> bool {
        matches!(self, Self::Latte | Self::Cappuccino | Self::Mocha)
    }
}

/// Cup size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CupSize {
    Small,
    Medium,
    Large,
}

impl CupSize {
    pub const ALL: [CupSize; 3] = [CupSize::Small, CupSize::Medium, CupSize::Large];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.as_str() == value)
    }
}

/// Milk choice for milk-based drinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milk {
    Whole,
    Skim,
    Oat,
    Almond,
    Soy,
}

impl Milk {
    pub const ALL: [Milk; 5] = [Milk::Whole, Milk::Skim, Milk::Oat, Milk::Almond, Milk::Soy];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Whole => "whole",
            Self::Skim => "skim",
            Self::Oat => "oat",
            Self::Almond => "almond",
            Self::Soy => "soy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.as_str() == value)
    }
}

/// One customer's coffee order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoffeeOrder {
    pub id: CoffeeOrderId,
    /// Counter reference printed on the ticket, e.g. `CAF-0042`.
    pub reference: String,
    pub customer_name: String,
    pub beverage: Beverage,
    pub size: CupSize,
    pub quantity: u32,
    pub extra_shots: u32,
    pub milk: Option<Milk>,
    /// Free-form barista notes. May be empty.
    pub notes: String,
}

impl CoffeeOrder {
    /// Creates a single-cup order with a generated stable ID.
    ///
    /// # Invariants
    /// - `quantity` starts at 1, `extra_shots` at 0.
    /// - No milk and no notes.
    /// - This constructor does not validate.
    pub fn new(
        reference: impl Into<String>,
        customer_name: impl Into<String>,
        beverage: Beverage,
        size: CupSize,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), reference, customer_name, beverage, size)
    }

    /// Creates an order with a caller-provided ID.
    pub fn with_id(
        id: CoffeeOrderId,
        reference: impl Into<String>,
        customer_name: impl Into<String>,
        beverage: Beverage,
        size: CupSize,
    ) -> Self {
        Self {
            id,
            reference: reference.into(),
            customer_name: customer_name.into(),
            beverage,
            size,
            quantity: MIN_QUANTITY,
            extra_shots: 0,
            milk: None,
            notes: String::new(),
        }
    }

    /// Builder-style milk setter.
    pub fn with_milk(mut self, milk: Milk) -> Self {
        self.milk = Some(milk);
        self
    }

}

impl Model for CoffeeOrder {
    type Id = CoffeeOrderId;

    const MODEL_NAME: &'static str = "coffee_order";

    fn id(&self) -> CoffeeOrderId {
        self.id
    }

    fn clean_fields(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.id.is_nil() {
            errors.add("id", "Order id must not be nil.");
        }

        if self.reference.trim().is_empty() {
            errors.add("reference", REQUIRED_MESSAGE);
        } else if !REFERENCE_RE.is_match(&self.reference) {
            errors.add(
                "reference",
                format!(
                    "Reference `{}` must look like `CAF-0001` (three capital letters, dash, four digits).",
                    self.reference
                ),
            );
        }

        if self.customer_name.trim().is_empty() {
            errors.add("customer_name", REQUIRED_MESSAGE);
        } else {
            check_max_chars(
                &mut errors,
                "customer_name",
                &self.customer_name,
                MAX_CUSTOMER_NAME_CHARS,
            );
        }

        if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&self.quantity) {
            errors.add(
                "quantity",
                format!(
                    "Ensure this value is between {MIN_QUANTITY} and {MAX_QUANTITY} (it is {}).",
                    self.quantity
                ),
            );
        }

        if self.extra_shots > MAX_EXTRA_SHOTS {
            errors.add(
                "extra_shots",
                format!(
                    "Ensure this value is less than or equal to {MAX_EXTRA_SHOTS} (it is {}).",
                    self.extra_shots
                ),
            );
        }

        check_max_chars(&mut errors, "notes", &self.notes, MAX_NOTES_CHARS);

        errors.into_result()
    }

    fn clean(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        match (self.beverage, self.milk) {
            (Beverage::Espresso, Some(_)) => {
                errors.add("milk", "Espresso is served without milk.");
            }
            (beverage, None) if beverage.requires_milk() => {
                errors.add(
                    "milk",
                    format!("A {} needs a milk choice.", beverage.as_str()),
                );
            }
            _ => {}
        }

        if self.beverage == Beverage::Espresso && self.size != CupSize::Small {
            errors.add("size", "Espresso is only served small.");
        }

        errors.into_result()
    }

    fn unique_fields(&self) -> Vec<(&'static str, String)> {
        vec![("reference", self.reference.clone())]
    }

    fn bind_form(base: Option<Self>, form: &FormData) -> BoundForm<Self> {
        let is_add = base.is_none();
        let mut errors = ValidationError::new();
        let mut order = base.unwrap_or_else(|| {
            CoffeeOrder::new("", "", Beverage::Americano, CupSize::Medium)
        });

        if let Some(value) = form.get("reference") {
            order.reference = value.trim().to_string();
        }
        if let Some(value) = form.get("customer_name") {
            order.customer_name = value.trim().to_string();
        }
        if let Some(value) = form.get("notes") {
            order.notes = value.trim().to_string();
        }

        match bind_choice(form, "beverage", is_add, Beverage::parse) {
            Ok(Some(beverage)) => order.beverage = beverage,
            Ok(None) => {}
            Err(message) => errors.add("beverage", message),
        }
        match bind_choice(form, "size", is_add, CupSize::parse) {
            Ok(Some(size)) => order.size = size,
            Ok(None) => {}
            Err(message) => errors.add("size", message),
        }

        if let Some(value) = form.get("milk") {
            let value = value.trim();
            if value.is_empty() {
                order.milk = None;
            } else {
                match Milk::parse(value) {
                    Some(milk) => order.milk = Some(milk),
                    None => errors.add("milk", invalid_choice_message(value)),
                }
            }
        }

        match bind_whole_number(form, "quantity") {
            Ok(Some(quantity)) => order.quantity = quantity,
            Ok(None) => {}
            Err(message) => errors.add("quantity", message),
        }
        match bind_whole_number(form, "extra_shots") {
            Ok(Some(shots)) => order.extra_shots = shots,
            Ok(None) => {}
            Err(message) => errors.add("extra_shots", message),
        }

        BoundForm {
            object: order,
            errors,
        }
    }
}

fn check_max_chars(errors: &mut ValidationError, field: &str, value: &str, max_chars: usize) {
    let count = value.chars().count();
    if count > max_chars {
        errors.add(
            field,
            format!("Ensure this value has at most {max_chars} characters (it has {count})."),
        );
    }
}

/// A choice submitted blank is always required. An absent choice is
/// required on add and keeps the stored value on change.
fn bind_choice<T>(
    form: &FormData,
    field: &str,
    is_add: bool,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, String> {
    match form.get(field).map(str::trim) {
        None if is_add => Err(REQUIRED_MESSAGE.to_string()),
        None => Ok(None),
        Some("") => Err(REQUIRED_MESSAGE.to_string()),
        Some(value) => parse(value)
            .map(Some)
            .ok_or_else(|| invalid_choice_message(value)),
    }
}

/// Absent numbers keep the current value; blank ones are required.
fn bind_whole_number(form: &FormData, field: &str) -> Result<Option<u32>, String> {
    match form.get(field).map(str::trim) {
        None => Ok(None),
        Some("") => Err(REQUIRED_MESSAGE.to_string()),
        Some(value) => value
            .parse::<u32>()
            .map(Some)
            .map_err(|_| "Enter a whole number.".to_string()),
    }
}

fn invalid_choice_message(value: &str) -> String {
    format!("Select a valid choice. `{value}` is not one of the available choices.")
}
