//! Client model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Client entity as stored
#[derive(Debug, Clone, FromRow)]
pub struct Client {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub father_name: Option<String>,
    pub photo_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Public view of this record, without the password hash
    pub fn profile(&self) -> ClientProfile {
        ClientProfile {
            id: self.id,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            father_name: self.father_name.clone(),
            photo: self.photo_ref.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// New client creation payload, already validated and hashed
#[derive(Debug, Clone)]
pub struct NewClient {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub father_name: Option<String>,
    pub photo_ref: Option<String>,
}

/// Client fields that are safe to return to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw registration payload as submitted by the dashboard.
///
/// Every field is optional on the wire; presence is checked during
/// validation so that all missing fields can be reported together.
#[derive(Clone, Default, Deserialize)]
pub struct RegisterClientRequest {
    #[serde(default, rename = "fullname", alias = "fullName", alias = "full_name")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "agentusername", alias = "userName")]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, rename = "fathername", alias = "fatherName", alias = "father_name")]
    pub father_name: Option<String>,
    /// Reference to an already stored photo
    #[serde(default)]
    pub photo: Option<String>,
}

impl fmt::Debug for RegisterClientRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterClientRequest")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("father_name", &self.father_name)
            .field("photo", &self.photo)
            .finish()
    }
}
