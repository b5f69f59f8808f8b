//! The fixed user-info extraction schema.
//!
//! Field order here is the order validation walks and reports errors in.

use parley_core::FunctionDefinition;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Name of the function the model is forced to call.
pub const EXTRACT_FUNCTION_NAME: &str = "extract_user_info";

const EXTRACT_FUNCTION_DESCRIPTION: &str = "Extract name, email, phone, location, and age.";

/// Primitive kind a field is normalized to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
}

impl FieldKind {
    /// Get the string representation for error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
        }
    }
}

/// A schema field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Phone,
    Location,
    Age,
}

impl Field {
    /// Every field, in schema order.
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::Location,
        Self::Age,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Location => "location",
            Self::Age => "age",
        }
    }

    /// Kind the field is normalized to.
    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Age => FieldKind::Integer,
            Self::Name | Self::Email | Self::Phone | Self::Location => FieldKind::String,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// The function definition handed to the model.
///
/// Every parameter is declared as a string on the wire; `age` is coerced to
/// an integer during validation, not by the schema.
#[must_use]
pub fn extract_function() -> FunctionDefinition {
    let properties: Map<String, Value> = Field::ALL
        .iter()
        .map(|field| (field.key().to_string(), json!({"type": "string"})))
        .collect();

    FunctionDefinition {
        name: EXTRACT_FUNCTION_NAME.to_string(),
        description: EXTRACT_FUNCTION_DESCRIPTION.to_string(),
        parameters: json!({
            "type": "object",
            "properties": properties,
        }),
    }
}
