//! Data models and DTOs (Data Transfer Objects)
//!
//! Contains the car record and all request/response structures used by the API.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Message returned whenever a required car field is missing or empty
pub const CAR_FIELDS_REQUIRED: &str = "Make, model, and year required.";

/// Live car projection as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Car {
    pub id: i32,
    pub make: String,
    pub model: String,
    pub year: i32,
}

/// Validated car fields, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarFields {
    pub make: String,
    pub model: String,
    pub year: i32,
}

/// Body of `POST /car` and `PUT /cars/{id}`
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CarRequest {
    #[validate(required, length(min = 1))]
    pub make: Option<String>,

    #[validate(required, length(min = 1))]
    pub model: Option<String>,

    #[validate(required, custom(function = "validate_year"))]
    pub year: Option<i32>,
}

impl CarRequest {
    /// Check every field and hand back owned values.
    ///
    /// Any failure collapses into the single required-fields message.
    pub fn into_fields(self) -> Result<CarFields, &'static str> {
        self.validate().map_err(|_| CAR_FIELDS_REQUIRED)?;

        match (self.make, self.model, self.year) {
            (Some(make), Some(model), Some(year)) => Ok(CarFields { make, model, year }),
            _ => Err(CAR_FIELDS_REQUIRED),
        }
    }
}

/// A zero year counts as missing
fn validate_year(year: i32) -> Result<(), ValidationError> {
    if year == 0 {
        let mut err = ValidationError::new("year_required");
        err.message = Some("Year must be non-zero".into());
        return Err(err);
    }
    Ok(())
}

/// Acknowledgment envelope returned by create
#[derive(Debug, Serialize)]
pub struct Acknowledgment {
    pub success: bool,
    pub message: String,
    pub data: Option<()>,
}

impl Acknowledgment {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Message-only response (no data)
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
