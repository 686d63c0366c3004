use serde_json::{Map, Value};

use super::error::FilterError;
use super::types::{quote_column, SqlResult};

/// Build the SET clause of a partial update.
///
/// `data` maps external field names to new values; `aliases` maps the external
/// names that differ from their storage column (`numEmployees` ->
/// `num_employees`). Columns come out in the map's iteration order with
/// placeholders `$1..$n`, so the caller binds the row key as `$n+1`.
///
/// An empty `data` is rejected rather than producing a no-op update.
pub fn sql_for_partial_update(
    data: &Map<String, Value>,
    aliases: &[(&str, &str)],
) -> Result<SqlResult, FilterError> {
    if data.is_empty() {
        return Err(FilterError::NoData);
    }

    let mut cols = Vec::with_capacity(data.len());
    let mut params = Vec::with_capacity(data.len());
    for (idx, (field, value)) in data.iter().enumerate() {
        let column = aliases
            .iter()
            .find(|(external, _)| external == field)
            .map(|(_, column)| *column)
            .unwrap_or(field.as_str());
        cols.push(format!("{} = ${}", quote_column(column), idx + 1));
        params.push(value.clone());
    }

    Ok(SqlResult { query: cols.join(", "), params })
}
