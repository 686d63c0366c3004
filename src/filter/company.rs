use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOp, FilterOrderInfo, QueryParams, SqlResult};

const KEYS: &str = "name, minEmployees, or maxEmployees";
const MIN_EMPLOYEES: &str = "minEmployees";
const MAX_EMPLOYEES: &str = "maxEmployees";

/// A validated company search.
///
/// The accepted key sets are:
/// - one of `name`, `minEmployees`, `maxEmployees`
/// - `minEmployees` + `maxEmployees` in either order
/// - `name` first, then `minEmployees` + `maxEmployees` in either order
///
/// Ranges require `min < max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyFilter {
    ByName(String),
    ByMinEmployees(i64),
    ByMaxEmployees(i64),
    ByRange { min: i64, max: i64 },
    ByNameAndRange { name: String, min: i64, max: i64 },
}

impl CompanyFilter {
    pub fn parse(params: &QueryParams) -> Result<Self, FilterError> {
        match params {
            [] => Err(FilterError::InvalidKey(KEYS)),
            [(key, value)] => match key.as_str() {
                "name" => Ok(CompanyFilter::ByName(value.clone())),
                MIN_EMPLOYEES => Ok(CompanyFilter::ByMinEmployees(parse_count(key, value)?)),
                MAX_EMPLOYEES => Ok(CompanyFilter::ByMaxEmployees(parse_count(key, value)?)),
                _ => Err(FilterError::InvalidKey(KEYS)),
            },
            [first, second] => {
                let (min, max) = parse_range(first, second)?;
                Ok(CompanyFilter::ByRange { min, max })
            }
            [(key, name), second, third] => {
                if key != "name" {
                    return Err(FilterError::MustStartWithName);
                }
                let (min, max) = parse_range(second, third)?;
                Ok(CompanyFilter::ByNameAndRange { name: name.clone(), min, max })
            }
            _ => Err(FilterError::TooManyParameters),
        }
    }

    /// `WHERE ... ORDER BY name` with its bind values.
    pub fn to_sql(&self) -> SqlResult {
        let filter_where = FilterWhere::new(0);
        let filter_where = match self {
            CompanyFilter::ByName(name) => filter_where.condition("name", FilterOp::Like, prefix(name)),
            CompanyFilter::ByMinEmployees(min) => filter_where.condition("num_employees", FilterOp::Gte, *min),
            CompanyFilter::ByMaxEmployees(max) => filter_where.condition("num_employees", FilterOp::Lte, *max),
            CompanyFilter::ByRange { min, max } => filter_where
                .condition("num_employees", FilterOp::Gte, *min)
                .condition("num_employees", FilterOp::Lte, *max),
            CompanyFilter::ByNameAndRange { name, min, max } => filter_where
                .condition("name", FilterOp::Like, prefix(name))
                .condition("num_employees", FilterOp::Gte, *min)
                .condition("num_employees", FilterOp::Lte, *max),
        };

        let (where_clause, params) = filter_where.generate();
        let order_clause = FilterOrder::generate(&[FilterOrderInfo::asc("name")]);
        SqlResult { query: format!("{} {}", where_clause, order_clause), params }
    }
}

pub(crate) fn prefix(value: &str) -> String {
    format!("{}%", value)
}

fn parse_count(key: &str, value: &str) -> Result<i64, FilterError> {
    value.trim().parse::<i64>().map_err(|_| FilterError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Resolve a min/max pair given in either order; the bounds are compared by
/// meaning, not by position.
fn parse_range(first: &(String, String), second: &(String, String)) -> Result<(i64, i64), FilterError> {
    let (min, max) = match (first.0.as_str(), second.0.as_str()) {
        (MIN_EMPLOYEES, MAX_EMPLOYEES) => (first, second),
        (MAX_EMPLOYEES, MIN_EMPLOYEES) => (second, first),
        _ => return Err(FilterError::InvalidRange(MIN_EMPLOYEES, MAX_EMPLOYEES)),
    };
    let min = parse_count(&min.0, &min.1)?;
    let max = parse_count(&max.0, &max.1)?;
    if min >= max {
        return Err(FilterError::InvalidRange(MIN_EMPLOYEES, MAX_EMPLOYEES));
    }
    Ok((min, max))
}
