//! Shipping address entered at checkout

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

pub const DEFAULT_COUNTRY: &str = "India";

/// The checkout form. Serialized as-is into the order's address snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ShippingForm {
    #[validate(length(min = 2, message = "Name is required"))]
    pub name: String,

    #[validate(
        custom(function = "validate_numeric", message = "Phone must be numeric"),
        length(min = 10, message = "Invalid phone number")
    )]
    pub phone: String,

    #[serde(rename = "addressLine1")]
    #[validate(length(min = 5, message = "Address is required"))]
    pub address_line1: String,

    #[validate(length(min = 2, message = "City is required"))]
    pub city: String,

    #[validate(length(min = 2, message = "State is required"))]
    pub state: String,

    #[serde(rename = "postalCode")]
    #[validate(length(min = 5, message = "Zip code is required"))]
    pub postal_code: String,
}

fn validate_numeric(value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("numeric"))
    }
}

impl ShippingForm {
    /// Runs the form rules and flattens failures into `field -> messages`.
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(|e| FieldErrors::from(&e))
    }

    /// Single-line address used in the handoff message.
    pub fn address_summary(&self) -> String {
        format!("{}, {}, {} - {}", self.address_line1, self.city, self.state, self.postal_code)
    }
}

/// Field-level validation messages keyed by form field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn get(&self, field: &str) -> Option<&[String]> { self.0.get(field).map(Vec::as_slice) }
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut out = FieldErrors::default();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {field}"));
                out.insert(field, message);
            }
        }
        out
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect();
        write!(f, "{}", joined.join("; "))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShippingAddress {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub phone: String,
    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

impl ShippingAddress {
    /// Prefill for the next checkout.
    pub fn to_form(&self) -> ShippingForm {
        ShippingForm {
            name: self.name.clone(),
            phone: self.phone.clone(),
            address_line1: self.address_line1.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
        }
    }
}

/// Row written by the address upsert, keyed by `(user_id, address_line1)`.
#[derive(Clone, Debug)]
pub struct AddressUpsert {
    pub user_id: String,
    pub form: ShippingForm,
    pub country: String,
}

impl AddressUpsert {
    pub fn new(user_id: impl Into<String>, form: ShippingForm) -> Self {
        Self { user_id: user_id.into(), form, country: DEFAULT_COUNTRY.to_string() }
    }
}
