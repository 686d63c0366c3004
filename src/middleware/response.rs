use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// A successful response whose body is `{ "<key>": data }`, e.g. `{"job": {...}}`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub key: &'static str,
    pub data: T,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn ok(key: &'static str, data: T) -> Self {
        Self { key, data, status_code: StatusCode::OK }
    }

    /// 201 Created
    pub fn created(key: &'static str, data: T) -> Self {
        Self { key, data, status_code: StatusCode::CREATED }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return ApiError::internal_server_error("Failed to serialize response data").into_response();
            }
        };

        let mut body = Map::new();
        body.insert(self.key.to_string(), data);
        (self.status_code, Json(Value::Object(body))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
