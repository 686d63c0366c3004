// handlers/users.rs - /users and /users/:username

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use super::from_data;
use crate::app::AppState;
use crate::database::models::{NewUser, User};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::schema;

/// POST /users - admin only; unlike registration this may create admins
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(body) = body?;
    let new: NewUser = from_data(schema::USER_NEW.validate(body)?)?;
    let user = state.users().register(&new).await?;
    let token = state.jwt.create_token(&user.username, user.is_admin)?;
    Ok((StatusCode::CREATED, Json(json!({ "user": user, "token": token }))))
}

/// GET /users - admin only
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = state.users().find_all().await?;
    Ok(ApiResponse::ok("users", users))
}

/// GET /users/:username
pub async fn get(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<User> {
    let user = state.users().get(&username).await?;
    Ok(ApiResponse::ok("user", user))
}

/// PATCH /users/:username
pub async fn update(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<User> {
    let Json(body) = body?;
    let data = schema::USER_UPDATE.validate(body)?;
    let user = state.users().update_user(&username, data).await?;
    Ok(ApiResponse::ok("user", user))
}

/// DELETE /users/:username
pub async fn remove(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<String> {
    state.users().remove(&username).await?;
    Ok(ApiResponse::ok("deleted", username))
}
