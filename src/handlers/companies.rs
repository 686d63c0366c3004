// handlers/companies.rs - /companies and /companies/:handle

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde_json::Value;

use super::from_data;
use crate::app::AppState;
use crate::database::models::{Company, CompanyDetail, NewCompany};
use crate::filter::CompanyFilter;
use crate::middleware::{ApiResponse, ApiResult};
use crate::schema;

/// POST /companies - admin only
pub async fn create(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<Company> {
    let Json(body) = body?;
    let new: NewCompany = from_data(schema::COMPANY_NEW.validate(body)?)?;
    let company = state.companies().create(&new).await?;
    Ok(ApiResponse::created("company", company))
}

/// GET /companies - all companies, or filtered by `name`, `minEmployees`, `maxEmployees`
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Vec<Company>> {
    let repo = state.companies();
    let companies = if params.is_empty() {
        repo.find_all().await?
    } else {
        let filter = CompanyFilter::parse(&params)?;
        tracing::debug!(?filter, "filtering companies");
        repo.filtered(&filter).await?
    };
    Ok(ApiResponse::ok("companies", companies))
}

/// GET /companies/:handle - the company with its jobs
pub async fn get(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<CompanyDetail> {
    let company = state.companies().get_detail(&handle).await?;
    Ok(ApiResponse::ok("company", company))
}

/// PATCH /companies/:handle - admin only
pub async fn update(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Company> {
    let Json(body) = body?;
    let data = schema::COMPANY_UPDATE.validate(body)?;
    let company = state.companies().update(&handle, &data).await?;
    Ok(ApiResponse::ok("company", company))
}

/// DELETE /companies/:handle - admin only; the company's jobs go with it
pub async fn remove(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<String> {
    state.companies().remove(&handle).await?;
    Ok(ApiResponse::ok("deleted", handle))
}
