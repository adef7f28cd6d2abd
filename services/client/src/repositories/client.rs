//! PostgreSQL client repository

use async_trait::async_trait;
use common::error::DatabaseError;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use super::{ClientStore, StoreError, StoreResult, UniqueField};
use crate::models::{Client, NewClient};

/// Schema for the `clients` table
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Client repository
#[derive(Clone)]
pub struct PgClientRepository {
    pool: PgPool,
}

impl PgClientRepository {
    /// Create a new client repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStore for PgClientRepository {
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> StoreResult<Option<Client>> {
        info!("Looking up client by email or username: {}", username);

        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, full_name, email, username, password_hash, father_name, photo_ref,
                   created_at, updated_at
            FROM clients
            WHERE email = $1 OR username = $2
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        Ok(client)
    }

    async fn create(&self, new_client: &NewClient) -> StoreResult<Client> {
        info!("Creating new client: {}", new_client.username);

        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (id, full_name, email, username, password_hash, father_name, photo_ref)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, full_name, email, username, password_hash, father_name, photo_ref,
                      created_at, updated_at
            "#,
        )
        .bind(new_client.id)
        .bind(&new_client.full_name)
        .bind(&new_client.email)
        .bind(&new_client.username)
        .bind(&new_client.password_hash)
        .bind(&new_client.father_name)
        .bind(&new_client.photo_ref)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(client)
    }
}

fn map_read_error(error: sqlx::Error) -> StoreError {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(error.to_string())
        }
        other => StoreError::Database(DatabaseError::Query(other)),
    }
}

/// Translate an insert failure, singling out unique violations
fn map_write_error(error: sqlx::Error) -> StoreError {
    let duplicate = match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Some(field_for_constraint(db.constraint()))
        }
        _ => None,
    };

    match duplicate {
        Some(field) => StoreError::Duplicate(field),
        None => map_read_error(error),
    }
}

fn field_for_constraint(constraint: Option<&str>) -> Option<UniqueField> {
    match constraint {
        Some(name) if name.contains("email") => Some(UniqueField::Email),
        Some(name) if name.contains("username") => Some(UniqueField::Username),
        _ => None,
    }
}
