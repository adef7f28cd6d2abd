//! Password hashing

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};

use crate::error::RegistrationError;

/// Hash a password into an argon2 PHC string with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, RegistrationError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| RegistrationError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    Ok(hash)
}
