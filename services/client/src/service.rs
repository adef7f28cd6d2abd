//! Client registration handler

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::RegistrationError,
    models::{ClientProfile, NewClient, RegisterClientRequest},
    password,
    repositories::{ClientStore, UniqueField},
    validation,
};

/// Validates registrations and writes them to the client store
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn ClientStore>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn ClientStore>) -> Self {
        Self { store }
    }

    /// Register a new client.
    ///
    /// Validation happens before any I/O. On success exactly one record is
    /// written and its public profile returned; on any failure nothing is
    /// written. A duplicate that slips past the lookup is still rejected by
    /// the store and reported as a conflict.
    pub async fn register_client(
        &self,
        request: RegisterClientRequest,
    ) -> Result<ClientProfile, RegistrationError> {
        let registration = validation::validate_registration(&request).map_err(|errors| {
            info!("Rejected client registration: {}", errors);
            RegistrationError::Validation(errors)
        })?;

        if let Some(existing) = self
            .store
            .find_by_email_or_username(&registration.email, &registration.username)
            .await?
        {
            let field = if existing.email == registration.email {
                UniqueField::Email
            } else {
                UniqueField::Username
            };
            info!(
                "Client registration conflicts with existing client {}",
                existing.id
            );
            return Err(RegistrationError::Conflict(Some(field)));
        }

        let password_hash = password::hash_password(&registration.password)?;

        let new_client = NewClient {
            id: Uuid::new_v4(),
            full_name: registration.full_name,
            email: registration.email,
            username: registration.username,
            password_hash,
            father_name: registration.father_name,
            photo_ref: registration.photo,
        };

        let client = self.store.create(&new_client).await.map_err(|e| {
            warn!("Failed to store client {}: {}", new_client.username, e);
            RegistrationError::from(e)
        })?;

        info!("Registered client {} ({})", client.username, client.id);
        Ok(client.profile())
    }
}
