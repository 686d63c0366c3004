// handlers/mod.rs - route handlers, one module per resource
//
// Access rules live in the router (see app.rs); handlers validate input, call
// a repository and shape the response.

pub mod auth;
pub mod companies;
pub mod health;
pub mod jobs;
pub mod users;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Deserialize a body that already passed its schema.
pub(crate) fn from_data<T: DeserializeOwned>(data: Map<String, Value>) -> Result<T, ApiError> {
    serde_json::from_value(Value::Object(data))
        .map_err(|e| ApiError::validation_error("Invalid request body", vec![e.to_string()]))
}
