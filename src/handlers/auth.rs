// handlers/auth.rs - token issue and self-registration

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::from_data;
use crate::app::AppState;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::schema;

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

/// POST /auth/token - `{username, password}` => `{token}`
pub async fn token(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<String> {
    let Json(body) = body?;
    let credentials: Credentials = from_data(schema::USER_AUTH.validate(body)?)?;

    let user = state
        .users()
        .authenticate(&credentials.username, &credentials.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username/password"))?;

    let token = state.jwt.create_token(&user.username, user.is_admin)?;
    tracing::info!(username = %user.username, "token issued");
    Ok(ApiResponse::ok("token", token))
}

/// POST /auth/register - create a non-admin account and log it in
pub async fn register(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<String> {
    let Json(body) = body?;
    let mut new: NewUser = from_data(schema::USER_REGISTER.validate(body)?)?;
    new.is_admin = false;

    let user = state.users().register(&new).await?;
    let token = state.jwt.create_token(&user.username, user.is_admin)?;
    Ok(ApiResponse::created("token", token))
}
