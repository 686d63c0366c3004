//! Request body schemas.
//!
//! Each route validates its JSON body against one of the static schemas below
//! before anything reaches the repositories. Validation collects every
//! violation instead of stopping at the first one.

use serde_json::{Map, Value};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyType {
    String { min_length: usize, max_length: Option<usize>, lowercase: bool },
    Email,
    /// Stored as a 32-bit INTEGER column.
    Integer { minimum: Option<i64>, maximum: Option<i64> },
    Number { minimum: Option<f64>, maximum: Option<f64> },
    Boolean,
}

impl PropertyType {
    fn name(&self) -> &'static str {
        match self {
            PropertyType::String { .. } | PropertyType::Email => "string",
            PropertyType::Integer { .. } => "integer",
            PropertyType::Number { .. } => "number",
            PropertyType::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SchemaProperty {
    pub name: &'static str,
    pub property_type: PropertyType,
    pub nullable: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct JsonSchema {
    pub title: &'static str,
    pub properties: &'static [SchemaProperty],
    pub required: &'static [&'static str],
    /// Require at least one property (update payloads).
    pub min_properties: usize,
}

impl JsonSchema {
    /// Validate `body`, returning its object on success.
    pub fn validate(&self, body: Value) -> Result<Map<String, Value>, ApiError> {
        let Value::Object(map) = body else {
            return Err(ApiError::validation_error(
                format!("{} must be a JSON object", self.title),
                vec!["instance is not of a type(s) object".to_string()],
            ));
        };

        let errors = self.errors(&map);
        if errors.is_empty() {
            Ok(map)
        } else {
            tracing::debug!(schema = self.title, ?errors, "request body rejected");
            Err(ApiError::validation_error(format!("Invalid {}", self.title), errors))
        }
    }

    fn errors(&self, map: &Map<String, Value>) -> Vec<String> {
        let mut errors = Vec::new();

        if map.len() < self.min_properties {
            errors.push(format!("instance does not meet minimum property length of {}", self.min_properties));
        }

        for required in self.required {
            if !map.contains_key(*required) {
                errors.push(format!("instance requires property \"{}\"", required));
            }
        }

        for (key, value) in map {
            match self.properties.iter().find(|p| p.name == key.as_str()) {
                Some(property) => property.check(value, &mut errors),
                None => errors.push(format!("instance is not allowed to have the additional property \"{}\"", key)),
            }
        }

        errors
    }
}

impl SchemaProperty {
    fn check(&self, value: &Value, errors: &mut Vec<String>) {
        let path = format!("instance.{}", self.name);
        if value.is_null() {
            if !self.nullable {
                errors.push(format!("{} is not of a type(s) {}", path, self.property_type.name()));
            }
            return;
        }

        match (self.property_type, value) {
            (PropertyType::String { min_length, max_length, lowercase }, Value::String(s)) => {
                let len = s.chars().count();
                if len < min_length {
                    errors.push(format!("{} does not meet minimum length of {}", path, min_length));
                }
                if let Some(max) = max_length {
                    if len > max {
                        errors.push(format!("{} does not meet maximum length of {}", path, max));
                    }
                }
                if lowercase && s.chars().any(|c| c.is_uppercase()) {
                    errors.push(format!("{} must be lowercase", path));
                }
            }
            (PropertyType::Email, Value::String(s)) => {
                if !is_email(s) {
                    errors.push(format!("{} does not conform to the \"email\" format", path));
                }
            }
            (PropertyType::Integer { minimum, maximum }, Value::Number(n)) if n.is_i64() || n.is_u64() => {
                // u64 values past i64::MAX are over any maximum
                let v = n.as_i64().unwrap_or(i64::MAX);
                if let Some(min) = minimum {
                    if v < min {
                        errors.push(format!("{} must be greater than or equal to {}", path, min));
                    }
                }
                if let Some(max) = maximum {
                    if v > max {
                        errors.push(format!("{} must be less than or equal to {}", path, max));
                    }
                }
            }
            (PropertyType::Number { minimum, maximum }, Value::Number(n)) => {
                let v = n.as_f64().unwrap_or(f64::NAN);
                if let Some(min) = minimum {
                    if v < min {
                        errors.push(format!("{} must be greater than or equal to {}", path, min));
                    }
                }
                if let Some(max) = maximum {
                    if v > max {
                        errors.push(format!("{} must be less than or equal to {}", path, max));
                    }
                }
            }
            (PropertyType::Boolean, Value::Bool(_)) => {}
            (property_type, _) => {
                errors.push(format!("{} is not of a type(s) {}", path, property_type.name()));
            }
        }
    }
}

/// `local@domain` with no whitespace, and a domain of two or more dot-separated
/// labels made of letters, digits and inner hyphens.
fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > 64 || local.contains(|c: char| c.is_whitespace() || c == '@') {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

const fn string(name: &'static str, min_length: usize, max_length: Option<usize>) -> SchemaProperty {
    SchemaProperty {
        name,
        property_type: PropertyType::String { min_length, max_length, lowercase: false },
        nullable: false,
    }
}

const fn integer(name: &'static str) -> SchemaProperty {
    SchemaProperty {
        name,
        property_type: PropertyType::Integer { minimum: Some(0), maximum: Some(i32::MAX as i64) },
        nullable: true,
    }
}

const fn nullable(property: SchemaProperty) -> SchemaProperty {
    SchemaProperty { nullable: true, ..property }
}

const TITLE: SchemaProperty = string("title", 1, None);
const SALARY: SchemaProperty = integer("salary");
const EQUITY: SchemaProperty = nullable(SchemaProperty {
    name: "equity",
    property_type: PropertyType::Number { minimum: Some(0.0), maximum: Some(1.0) },
    nullable: false,
});

pub const JOB_NEW: JsonSchema = JsonSchema {
    title: "job",
    properties: &[TITLE, SALARY, EQUITY, string("company_handle", 1, Some(25))],
    required: &["title", "company_handle"],
    min_properties: 0,
};

/// `id` and the owning company cannot be changed, so they are simply absent.
pub const JOB_UPDATE: JsonSchema = JsonSchema {
    title: "job update",
    properties: &[TITLE, SALARY, EQUITY],
    required: &[],
    min_properties: 1,
};

const NUM_EMPLOYEES: SchemaProperty = integer("numEmployees");
const HANDLE: SchemaProperty = SchemaProperty {
    name: "handle",
    property_type: PropertyType::String { min_length: 1, max_length: Some(25), lowercase: true },
    nullable: false,
};
const LOGO_URL: SchemaProperty = nullable(string("logoUrl", 0, None));

pub const COMPANY_NEW: JsonSchema = JsonSchema {
    title: "company",
    properties: &[
        HANDLE,
        string("name", 1, None),
        string("description", 0, None),
        NUM_EMPLOYEES,
        LOGO_URL,
    ],
    required: &["handle", "name", "description"],
    min_properties: 0,
};

pub const COMPANY_UPDATE: JsonSchema = JsonSchema {
    title: "company update",
    properties: &[string("name", 1, None), string("description", 0, None), NUM_EMPLOYEES, LOGO_URL],
    required: &[],
    min_properties: 1,
};

const USERNAME: SchemaProperty = string("username", 1, Some(25));
const PASSWORD: SchemaProperty = string("password", 5, Some(20));
const FIRST_NAME: SchemaProperty = string("firstName", 1, Some(30));
const LAST_NAME: SchemaProperty = string("lastName", 1, Some(30));
const EMAIL: SchemaProperty = SchemaProperty { name: "email", property_type: PropertyType::Email, nullable: false };

pub const USER_AUTH: JsonSchema = JsonSchema {
    title: "credentials",
    properties: &[USERNAME, string("password", 1, None)],
    required: &["username", "password"],
    min_properties: 0,
};

pub const USER_REGISTER: JsonSchema = JsonSchema {
    title: "registration",
    properties: &[USERNAME, PASSWORD, FIRST_NAME, LAST_NAME, EMAIL],
    required: &["username", "password", "firstName", "lastName", "email"],
    min_properties: 0,
};

pub const USER_NEW: JsonSchema = JsonSchema {
    title: "user",
    properties: &[
        USERNAME,
        PASSWORD,
        FIRST_NAME,
        LAST_NAME,
        EMAIL,
        SchemaProperty { name: "isAdmin", property_type: PropertyType::Boolean, nullable: false },
    ],
    required: &["username", "password", "firstName", "lastName", "email"],
    min_properties: 0,
};

pub const USER_UPDATE: JsonSchema = JsonSchema {
    title: "user update",
    properties: &[PASSWORD, FIRST_NAME, LAST_NAME, EMAIL],
    required: &[],
    min_properties: 1,
};
