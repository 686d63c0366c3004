use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::job::JobSummary;
use crate::database::manager::DatabaseError;
use crate::database::query_builder::QueryBuilder;
use crate::database::repository::{constraint_violation, Entity, Repository};
use crate::filter::{CompanyFilter, SqlResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl Entity for Company {
    type Key = String;

    const LABEL: &'static str = "company";
    const TABLE: &'static str = "companies";
    const KEY_COLUMN: &'static str = "handle";
    const COLUMNS: &'static [&'static str] = &["handle", "name", "description", "num_employees", "logo_url"];
    const DEFAULT_ORDER: &'static str = "name";
    const COLUMN_ALIASES: &'static [(&'static str, &'static str)] =
        &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")];
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// A company together with the jobs it posts.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<JobSummary>,
}

impl Repository<Company> {
    pub async fn create(&self, new: &NewCompany) -> Result<Company, DatabaseError> {
        let existing = sqlx::query(r#"SELECT "handle" FROM "companies" WHERE "handle" = $1"#)
            .bind(&new.handle)
            .fetch_optional(self.pool())
            .await?;
        if existing.is_some() {
            return Err(DatabaseError::Duplicate(format!("Duplicate company: {}", new.handle)));
        }

        let query = format!(
            r#"INSERT INTO "companies" ("handle", "name", "description", "num_employees", "logo_url")
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {}"#,
            Self::columns(None)
        );
        let company = sqlx::query_as::<_, Company>(&query)
            .bind(&new.handle)
            .bind(&new.name)
            .bind(&new.description)
            .bind(new.num_employees)
            .bind(&new.logo_url)
            .fetch_one(self.pool())
            .await
            .map_err(constraint_violation)?;

        tracing::info!(handle = %company.handle, "company created");
        Ok(company)
    }

    /// Companies matching `filter`, ordered by name. No match is an empty list.
    pub async fn filtered(&self, filter: &CompanyFilter) -> Result<Vec<Company>, DatabaseError> {
        let clause = filter.to_sql();
        let query = format!("SELECT {} FROM \"companies\" {}", Self::columns(None), clause.query);
        QueryBuilder::<Company>::new(SqlResult { query, params: clause.params })
            .select_all(self.pool())
            .await
    }

    /// The company row and its jobs, read with two independent queries.
    pub async fn get_detail(&self, handle: &str) -> Result<CompanyDetail, DatabaseError> {
        let key = handle.to_string();
        let jobs = async {
            sqlx::query_as::<_, JobSummary>(
                r#"SELECT "id", "title", "salary", "equity" FROM "jobs" WHERE "company_handle" = $1 ORDER BY "id""#,
            )
            .bind(handle)
            .fetch_all(self.pool())
            .await
            .map_err(DatabaseError::from)
        };

        let (company, jobs) = futures::try_join!(self.get(&key), jobs)?;
        Ok(CompanyDetail { company, jobs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn c1() -> Company {
        Company {
            handle: "c1".into(),
            name: "C1".into(),
            description: "Desc1".into(),
            num_employees: Some(1),
            logo_url: None,
        }
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(c1()).unwrap();
        assert_eq!(
            value,
            json!({ "handle": "c1", "name": "C1", "description": "Desc1", "numEmployees": 1, "logoUrl": null })
        );
    }

    #[test]
    fn detail_flattens_company_fields() {
        let detail = CompanyDetail { company: c1(), jobs: vec![] };
        let value = serde_json::to_value(detail).unwrap();
        assert_eq!(value["handle"], "c1");
        assert_eq!(value["jobs"], json!([]));
    }

    #[test]
    fn new_company_optional_fields_default_to_none() {
        let new: NewCompany =
            serde_json::from_value(json!({ "handle": "new", "name": "New", "description": "New Description" })).unwrap();
        assert_eq!(new.num_employees, None);
        assert_eq!(new.logo_url, None);
    }
}
