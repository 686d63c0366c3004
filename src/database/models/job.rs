use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::manager::DatabaseError;
use crate::database::query_builder::QueryBuilder;
use crate::database::repository::{constraint_violation, Entity, Repository};
use crate::filter::{FilterError, JobFilter, SqlResult};

/// Equity is NUMERIC in storage and always serialized as a string, e.g. "0.5".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl Entity for Job {
    type Key = i32;

    const LABEL: &'static str = "job";
    const TABLE: &'static str = "jobs";
    const KEY_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["id", "title", "salary", "equity", "company_handle"];
    const DEFAULT_ORDER: &'static str = "title";
    const COLUMN_ALIASES: &'static [(&'static str, &'static str)] = &[("companyHandle", "company_handle")];
}

/// Body of `POST /jobs`; the owning company is given as `company_handle`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i64>,
    #[serde(default)]
    pub equity: Option<f64>,
    pub company_handle: String,
}

/// A job as embedded in its company's detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct JobSummary {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

/// One row of the public job listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_name: Option<String>,
    pub num_employees: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub num_employees: Option<i32>,
}

const LISTING_FROM: &str = r#"FROM "jobs" AS "j" LEFT JOIN "companies" AS "c" ON "c"."handle" = "j"."company_handle""#;

fn listing_select() -> String {
    format!(
        r#"SELECT "j"."id", "j"."title", "j"."salary", "j"."equity", "c"."name" AS "company_name", "c"."num_employees" {}"#,
        LISTING_FROM
    )
}

impl Repository<Job> {
    pub async fn create(&self, new: &NewJob) -> Result<Job, DatabaseError> {
        let query = format!(
            r#"INSERT INTO "jobs" ("title", "salary", "equity", "company_handle")
               VALUES ($1, $2, $3, $4)
               RETURNING {}"#,
            Self::columns(None)
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(&new.title)
            .bind(new.salary)
            .bind(new.equity)
            .bind(&new.company_handle)
            .fetch_one(self.pool())
            .await
            .map_err(constraint_violation)?;

        tracing::info!(id = job.id, company = %job.company_handle, "job created");
        Ok(job)
    }

    /// Every job joined with its company, ordered by title.
    pub async fn find_listing(&self) -> Result<Vec<JobListing>, DatabaseError> {
        let query = format!(r#"{} ORDER BY "j"."title" ASC"#, listing_select());
        QueryBuilder::<JobListing>::new(SqlResult { query, params: vec![] })
            .select_all(self.pool())
            .await
    }

    /// Jobs matching `filter`. A filter that matches nothing is an error.
    pub async fn filtered(&self, filter: &JobFilter) -> Result<Vec<JobListing>, DatabaseError> {
        let clause = filter.to_sql();
        let query = format!("{} {}", listing_select(), clause.query);
        let jobs = QueryBuilder::<JobListing>::new(SqlResult { query, params: clause.params })
            .select_all(self.pool())
            .await?;

        if jobs.is_empty() {
            return Err(FilterError::NoResults.into());
        }
        Ok(jobs)
    }

    /// The job with its company's name, description and size. The company
    /// fields are null when the company row is missing.
    pub async fn get_detail(&self, id: i32) -> Result<JobDetail, DatabaseError> {
        let query = format!(
            r#"SELECT "j"."id", "j"."title", "j"."salary", "j"."equity",
                      "c"."name" AS "company_name", "c"."description" AS "company_description", "c"."num_employees"
               {}
               WHERE "j"."id" = $1"#,
            LISTING_FROM
        );
        QueryBuilder::<JobDetail>::new(SqlResult { query, params: vec![id.into()] })
            .select_optional(self.pool())
            .await?
            .ok_or_else(|| Self::not_found(&id))
    }
}
