// handlers/jobs.rs - /jobs and /jobs/:id

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde_json::Value;

use super::from_data;
use crate::app::AppState;
use crate::database::models::{Job, JobDetail, JobListing, NewJob};
use crate::error::ApiError;
use crate::filter::JobFilter;
use crate::middleware::{ApiResponse, ApiResult};
use crate::schema;

/// Path ids that are not integers cannot name a job.
fn parse_id(id: &str) -> Result<i32, ApiError> {
    id.parse().map_err(|_| ApiError::not_found(format!("No job: {}", id)))
}

/// POST /jobs - admin only
pub async fn create(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<Job> {
    let Json(body) = body?;
    let new: NewJob = from_data(schema::JOB_NEW.validate(body)?)?;
    let job = state.jobs().create(&new).await?;
    Ok(ApiResponse::created("job", job))
}

/// GET /jobs - all jobs, or those matching one of `title`, `minSalary`, `hasEquity`
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Vec<JobListing>> {
    let repo = state.jobs();
    let jobs = if params.is_empty() {
        repo.find_listing().await?
    } else {
        let filter = JobFilter::parse(&params)?;
        tracing::debug!(?filter, "filtering jobs");
        repo.filtered(&filter).await?
    };
    Ok(ApiResponse::ok("jobs", jobs))
}

/// GET /jobs/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<JobDetail> {
    let job = state.jobs().get_detail(parse_id(&id)?).await?;
    Ok(ApiResponse::ok("job", job))
}

/// PATCH /jobs/:id - admin only; `title`, `salary` and `equity` may change
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Job> {
    let Json(body) = body?;
    let id = parse_id(&id)?;
    let data = schema::JOB_UPDATE.validate(body)?;
    let job = state.jobs().update(&id, &data).await?;
    Ok(ApiResponse::ok("job", job))
}

/// DELETE /jobs/:id - admin only
pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<String> {
    let id = parse_id(&id)?;
    state.jobs().remove(&id).await?;
    Ok(ApiResponse::ok("deleted", id.to_string()))
}
