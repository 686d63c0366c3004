use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{self, postgres::PgRow, FromRow, PgPool, Postgres};

use crate::database::manager::DatabaseError;
use crate::database::query_builder::{bind_param_query_as, QueryBuilder};
use crate::filter::filter_order::FilterOrder;
use crate::filter::{quote_column, sql_for_partial_update, SqlResult};

/// A table-backed row type the generic [`Repository`] can manage.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin + Serialize {
    type Key: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + std::fmt::Display + Clone + Send + Sync + 'static;

    /// Used in error messages, e.g. "No company: c1".
    const LABEL: &'static str;
    const TABLE: &'static str;
    const KEY_COLUMN: &'static str;
    /// Columns selected and returned, named as the struct fields.
    const COLUMNS: &'static [&'static str];
    const DEFAULT_ORDER: &'static str;
    /// External field name -> storage column, where they differ.
    const COLUMN_ALIASES: &'static [(&'static str, &'static str)] = &[];
}

pub struct Repository<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<T> Repository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl<T: Entity> Repository<T> {
    pub(crate) fn columns(alias: Option<&str>) -> String {
        T::COLUMNS
            .iter()
            .map(|c| match alias {
                Some(a) => quote_column(&format!("{}.{}", a, c)),
                None => quote_column(c),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn not_found(key: &T::Key) -> DatabaseError {
        DatabaseError::NotFound(format!("No {}: {}", T::LABEL, key))
    }

    pub async fn find_all(&self) -> Result<Vec<T>, DatabaseError> {
        let order = FilterOrder::generate(&FilterOrder::parse(T::DEFAULT_ORDER));
        let query = format!("SELECT {} FROM {} {}", Self::columns(None), quote_column(T::TABLE), order);
        QueryBuilder::<T>::new(SqlResult { query, params: vec![] })
            .select_all(&self.pool)
            .await
    }

    pub async fn get(&self, key: &T::Key) -> Result<T, DatabaseError> {
        let query = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            Self::columns(None),
            quote_column(T::TABLE),
            quote_column(T::KEY_COLUMN)
        );
        sqlx::query_as::<_, T>(&query)
            .bind(key.clone())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(key))
    }

    /// Replace only the supplied fields of the row at `key`.
    pub async fn update(&self, key: &T::Key, data: &Map<String, Value>) -> Result<T, DatabaseError> {
        let set = sql_for_partial_update(data, T::COLUMN_ALIASES)?;
        let query = format!(
            "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
            quote_column(T::TABLE),
            set.query,
            quote_column(T::KEY_COLUMN),
            set.params.len() + 1,
            Self::columns(None)
        );

        let mut q = sqlx::query_as::<_, T>(&query);
        for p in set.params.iter() {
            q = bind_param_query_as(q, p);
        }
        q.bind(key.clone())
            .fetch_optional(&self.pool)
            .await
            .map_err(constraint_violation)?
            .ok_or_else(|| Self::not_found(key))
    }

    pub async fn remove(&self, key: &T::Key) -> Result<(), DatabaseError> {
        let query = format!(
            "DELETE FROM {} WHERE {} = $1 RETURNING {}",
            quote_column(T::TABLE),
            quote_column(T::KEY_COLUMN),
            quote_column(T::KEY_COLUMN)
        );
        sqlx::query(&query)
            .bind(key.clone())
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| Self::not_found(key))
    }
}

/// Turn constraint violations the client caused into client-facing errors.
pub(crate) fn constraint_violation(err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DatabaseError::Duplicate(format!("Duplicate value: {}", db_err.message()));
        }
        if db_err.is_foreign_key_violation() {
            return DatabaseError::InvalidReference(format!("Invalid reference: {}", db_err.message()));
        }
        // 22003: numeric_value_out_of_range
        if db_err.is_check_violation() || db_err.code().as_deref() == Some("22003") {
            return DatabaseError::InvalidValue(format!("Invalid value: {}", db_err.message()));
        }
    }
    DatabaseError::Sqlx(err)
}
