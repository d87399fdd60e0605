use serde::Serialize;
use sqlx::FromRow;

/// User record as stored.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,                        // assigned on creation, never changes
    pub username: String,               // unique
    pub email: String,                  // unique, lower-cased
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,  // Argon2 PHC string; None for Google accounts
    #[serde(skip_serializing)]
    pub google_id: Option<String>,      // unique when present
    pub name: Option<String>,
}

/// Candidate user handed to the identity store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub name: Option<String>,
}
