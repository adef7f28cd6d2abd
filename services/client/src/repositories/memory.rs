//! In-memory client store for tests

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::{ClientStore, StoreError, StoreResult, UniqueField};
use crate::models::{Client, NewClient};

/// Vector-backed store that enforces the same unique constraints as the
/// `clients` table
#[derive(Default)]
pub struct MemoryClientStore {
    clients: RwLock<Vec<Client>>,
    writes: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails as if the server were down
    pub fn unavailable() -> Self {
        let store = Self::default();
        store.unavailable.store(true, Ordering::SeqCst);
        store
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn all(&self) -> Vec<Client> {
        self.clients.read().await.clone()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> StoreResult<Option<Client>> {
        self.check_available()?;
        let clients = self.clients.read().await;
        Ok(clients
            .iter()
            .find(|c| c.email == email || c.username == username)
            .cloned())
    }

    async fn create(&self, new_client: &NewClient) -> StoreResult<Client> {
        self.check_available()?;
        let mut clients = self.clients.write().await;

        if clients.iter().any(|c| c.email == new_client.email) {
            return Err(StoreError::Duplicate(Some(UniqueField::Email)));
        }
        if clients.iter().any(|c| c.username == new_client.username) {
            return Err(StoreError::Duplicate(Some(UniqueField::Username)));
        }

        let now = Utc::now();
        let client = Client {
            id: new_client.id,
            full_name: new_client.full_name.clone(),
            email: new_client.email.clone(),
            username: new_client.username.clone(),
            password_hash: new_client.password_hash.clone(),
            father_name: new_client.father_name.clone(),
            photo_ref: new_client.photo_ref.clone(),
            created_at: now,
            updated_at: now,
        };
        clients.push(client.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(client)
    }
}
