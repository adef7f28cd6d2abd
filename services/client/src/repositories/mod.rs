//! Client persistence
//!
//! The registration handler only sees the [`ClientStore`] trait, so the
//! PostgreSQL repository can be swapped for the in-memory one in tests.

use async_trait::async_trait;
use common::error::DatabaseError;
use thiserror::Error;

use crate::models::{Client, NewClient};

pub mod client;
#[cfg(test)]
pub mod memory;

pub use client::PgClientRepository;

/// Fields guarded by a unique constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
}

/// Errors raised at the store boundary
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique constraint rejected the write; the field is `None` when the
    /// store did not say which constraint fired
    #[error("Unique constraint violated")]
    Duplicate(Option<UniqueField>),

    /// The store is not reachable
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable storage for client records
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Find a client whose email or username matches either argument
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> StoreResult<Option<Client>>;

    /// Insert a client atomically, failing with [`StoreError::Duplicate`]
    /// when the email or username is taken
    async fn create(&self, new_client: &NewClient) -> StoreResult<Client>;
}
