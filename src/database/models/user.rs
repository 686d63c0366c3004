use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

use crate::auth::password::{hash_password, verify_password};
use crate::database::manager::DatabaseError;
use crate::database::repository::{constraint_violation, Entity, Repository};

/// A user as returned by the API. The password hash is never selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl Entity for User {
    type Key = String;

    const LABEL: &'static str = "user";
    const TABLE: &'static str = "users";
    const KEY_COLUMN: &'static str = "username";
    const COLUMNS: &'static [&'static str] = &["username", "first_name", "last_name", "email", "is_admin"];
    const DEFAULT_ORDER: &'static str = "username";
    const COLUMN_ALIASES: &'static [(&'static str, &'static str)] =
        &[("firstName", "first_name"), ("lastName", "last_name"), ("isAdmin", "is_admin")];
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl Repository<User> {
    /// Store a new user with a hashed password.
    pub async fn register(&self, new: &NewUser) -> Result<User, DatabaseError> {
        let existing = sqlx::query(r#"SELECT "username" FROM "users" WHERE "username" = $1"#)
            .bind(&new.username)
            .fetch_optional(self.pool())
            .await?;
        if existing.is_some() {
            return Err(DatabaseError::Duplicate(format!("Duplicate username: {}", new.username)));
        }

        let hashed = hash_password(&new.password)?;
        let query = format!(
            r#"INSERT INTO "users" ("username", "password", "first_name", "last_name", "email", "is_admin")
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {}"#,
            Self::columns(None)
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&new.username)
            .bind(hashed)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(&new.email)
            .bind(new.is_admin)
            .fetch_one(self.pool())
            .await
            .map_err(constraint_violation)?;

        tracing::info!(username = %user.username, is_admin = user.is_admin, "user registered");
        Ok(user)
    }

    /// `None` when the user does not exist or the password does not match.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>, DatabaseError> {
        let hash: Option<String> = sqlx::query_scalar(r#"SELECT "password" FROM "users" WHERE "username" = $1"#)
            .bind(username)
            .fetch_optional(self.pool())
            .await?;

        let Some(hash) = hash else {
            return Ok(None);
        };
        if !verify_password(password, &hash)? {
            tracing::debug!(username, "password mismatch");
            return Ok(None);
        }

        self.get(&username.to_string()).await.map(Some)
    }

    /// Partial update; a `password` field is hashed before it is stored.
    pub async fn update_user(&self, username: &str, mut data: Map<String, Value>) -> Result<User, DatabaseError> {
        let hashed = match data.get("password") {
            Some(Value::String(plain)) => Some(hash_password(plain)?),
            _ => None,
        };
        if let Some(hashed) = hashed {
            data.insert("password".to_string(), Value::String(hashed));
        }
        self.update(&username.to_string(), &data).await
    }
}
