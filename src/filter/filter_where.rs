use serde_json::Value;

use super::types::{quote_column, FilterOp, FilterWhereInfo};

/// Accumulates field conditions and hands out `$n` placeholders in order.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
    conditions: Vec<FilterWhereInfo>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    pub fn condition(mut self, column: impl Into<String>, operator: FilterOp, data: impl Into<Value>) -> Self {
        self.conditions.push(FilterWhereInfo { column: column.into(), operator, data: data.into() });
        self
    }

    /// Render `WHERE a AND b ...`, or an empty string when nothing was added.
    pub fn generate(mut self) -> (String, Vec<Value>) {
        let conditions = std::mem::take(&mut self.conditions);
        let sql_conditions: Vec<String> = conditions
            .into_iter()
            .map(|condition| self.build_sql_condition(condition))
            .collect();

        let where_clause = if sql_conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", sql_conditions.join(" AND "))
        };
        (where_clause, self.param_values)
    }

    fn build_sql_condition(&mut self, condition: FilterWhereInfo) -> String {
        let quoted_column = quote_column(&condition.column);
        match (condition.operator, condition.data) {
            (FilterOp::Eq, Value::Null) => format!("{} IS NULL", quoted_column),
            (operator, data) => format!("{} {} {}", quoted_column, operator.to_sql(), self.param(data)),
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
