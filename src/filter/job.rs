use super::company::prefix;
use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOp, FilterOrderInfo, QueryParams, SqlResult};

const KEYS: &str = "title, minSalary, or hasEquity";

/// A validated job search. Exactly one key is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobFilter {
    ByTitle(String),
    /// Overrides the listing order to salary descending.
    ByMinSalary(i64),
    /// `true` selects equity > 0 ordered by equity descending; `false`
    /// selects equity = 0 in the default order.
    ByEquity(bool),
}

impl JobFilter {
    pub fn parse(params: &QueryParams) -> Result<Self, FilterError> {
        match params {
            [(key, value)] => match key.as_str() {
                "title" => Ok(JobFilter::ByTitle(value.clone())),
                "minSalary" => value
                    .trim()
                    .parse::<i64>()
                    .map(JobFilter::ByMinSalary)
                    .map_err(|_| invalid_value(key, value)),
                "hasEquity" => match value.as_str() {
                    "true" => Ok(JobFilter::ByEquity(true)),
                    "false" | "" => Ok(JobFilter::ByEquity(false)),
                    _ => Err(invalid_value(key, value)),
                },
                _ => Err(FilterError::InvalidKey(KEYS)),
            },
            [] => Err(FilterError::InvalidKey(KEYS)),
            _ => Err(FilterError::TooManyParameters),
        }
    }

    /// `WHERE ... ORDER BY ...` against the `jobs AS j` listing join.
    pub fn to_sql(&self) -> SqlResult {
        let (filter_where, order) = match self {
            JobFilter::ByTitle(title) => (
                FilterWhere::new(0).condition("j.title", FilterOp::Like, prefix(title)),
                FilterOrderInfo::asc("j.title"),
            ),
            JobFilter::ByMinSalary(min) => (
                FilterWhere::new(0).condition("j.salary", FilterOp::Gte, *min),
                FilterOrderInfo::desc("j.salary"),
            ),
            JobFilter::ByEquity(true) => (
                FilterWhere::new(0).condition("j.equity", FilterOp::Gt, 0),
                FilterOrderInfo::desc("j.equity"),
            ),
            JobFilter::ByEquity(false) => (
                FilterWhere::new(0).condition("j.equity", FilterOp::Eq, 0),
                FilterOrderInfo::asc("j.title"),
            ),
        };

        let (where_clause, params) = filter_where.generate();
        SqlResult {
            query: format!("{} {}", where_clause, FilterOrder::generate(&[order])),
            params,
        }
    }
}

fn invalid_value(key: &str, value: &str) -> FilterError {
    FilterError::InvalidValue { key: key.to_string(), value: value.to_string() }
}
