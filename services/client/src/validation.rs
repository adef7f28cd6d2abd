//! Input validation for client registration

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

use crate::models::RegisterClientRequest;

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every field that failed validation, in payload order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// True when `field` is among the rejected fields
    #[cfg(test)]
    pub fn mentions(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect();
        write!(f, "{}", rendered.join("; "))
    }
}

/// A registration that passed validation, with every field normalised
pub struct ClientRegistration {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub father_name: Option<String>,
    pub photo: Option<String>,
}

/// Validate and normalise a registration payload.
///
/// Text fields are trimmed; email and username are lowercased so uniqueness
/// is case-insensitive. Optional fields that are blank become `None`.
pub fn validate_registration(
    request: &RegisterClientRequest,
) -> Result<ClientRegistration, ValidationErrors> {
    let full_name = trimmed(&request.full_name);
    let email = trimmed(&request.email).to_lowercase();
    let username = trimmed(&request.username).to_lowercase();
    // Passwords are taken verbatim; only the emptiness check trims.
    let password = request.password.clone().unwrap_or_default();
    let father_name = non_blank(&request.father_name);
    let photo = non_blank(&request.photo);

    let mut errors = Vec::new();
    let mut check = |field: &'static str, result: Result<(), String>| {
        if let Err(message) = result {
            errors.push(FieldError::new(field, message));
        }
    };

    check("fullName", validate_full_name(&full_name));
    check("email", validate_email(&email));
    check("username", validate_username(&username));
    check("password", validate_password(&password));
    if let Some(father_name) = &father_name {
        check("fatherName", validate_father_name(father_name));
    }
    if let Some(photo) = &photo {
        check("photo", validate_photo_reference(photo));
    }

    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    Ok(ClientRegistration {
        full_name,
        email,
        username,
        password,
        father_name,
        photo,
    })
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Validate full name
pub fn validate_full_name(full_name: &str) -> Result<(), String> {
    if full_name.is_empty() {
        return Err("Full name is required".to_string());
    }

    if full_name.chars().count() > 100 {
        return Err("Full name must be at most 100 characters long".to_string());
    }

    Ok(())
}

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.len() > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.trim().is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.chars().count() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    if !password.chars().any(char::is_alphabetic) {
        return Err("Password must contain at least one letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }

    Ok(())
}

/// Validate father name
pub fn validate_father_name(father_name: &str) -> Result<(), String> {
    if father_name.chars().count() > 100 {
        return Err("Father name must be at most 100 characters long".to_string());
    }

    Ok(())
}

/// Validate a reference to an already stored photo
pub fn validate_photo_reference(photo: &str) -> Result<(), String> {
    if photo.len() > 2048 {
        return Err("Photo reference must be at most 2048 characters long".to_string());
    }

    if photo.chars().any(char::is_whitespace) {
        return Err("Photo reference must not contain whitespace".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> RegisterClientRequest {
        RegisterClientRequest {
            full_name: Some("Jane Doe".to_string()),
            email: Some("jane@x.com".to_string()),
            username: Some("janed".to_string()),
            password: Some("Secret123".to_string()),
            father_name: None,
            photo: None,
        }
    }

    #[test]
    fn test_valid_registration_is_normalised() {
        let request = RegisterClientRequest {
            full_name: Some("  Jane Doe ".to_string()),
            email: Some(" Jane@X.com".to_string()),
            username: Some("JaneD ".to_string()),
            father_name: Some("   ".to_string()),
            ..jane()
        };

        let registration = validate_registration(&request).unwrap();
        assert_eq!(registration.full_name, "Jane Doe");
        assert_eq!(registration.email, "jane@x.com");
        assert_eq!(registration.username, "janed");
        assert_eq!(registration.password, "Secret123");
        assert!(registration.father_name.is_none());
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let errors = validate_registration(&RegisterClientRequest::default())
            .err()
            .unwrap();

        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["fullName", "email", "username", "password"]);
    }

    #[test]
    fn test_whitespace_only_required_field_is_rejected() {
        let request = RegisterClientRequest {
            full_name: Some("   ".to_string()),
            ..jane()
        };

        let errors = validate_registration(&request).err().unwrap();
        assert!(errors.mentions("fullName"));
        assert_eq!(errors.errors().len(), 1);
    }

    #[test]
    fn test_malformed_email_is_named() {
        let request = RegisterClientRequest {
            email: Some("not-an-email".to_string()),
            ..jane()
        };

        let errors = validate_registration(&request).err().unwrap();
        assert!(errors.mentions("email"));
        assert!(errors.to_string().contains("email"));
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("janed").is_ok());
        assert!(validate_username("jane_doe_42").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("jd").is_err());
        assert!(validate_username("jane doe").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane@x.com").is_ok());
        assert!(validate_email("jane.doe+bank@example.co.uk").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("jane@x").is_err());
        assert!(validate_email("@x.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Secret123").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("        ").is_err());
        assert!(validate_password("Ab1").is_err());
        assert!(validate_password("abcdefgh").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password(&format!("a1{}", "x".repeat(127))).is_err());
    }

    #[test]
    fn test_photo_reference_rules() {
        assert!(validate_photo_reference("/uploads/abc.png").is_ok());
        assert!(validate_photo_reference("https://cdn.example.com/a b.png").is_err());
        assert!(validate_photo_reference(&"a".repeat(2049)).is_err());
    }

    #[test]
    fn test_repeated_validation_fails_identically() {
        let request = RegisterClientRequest {
            email: Some("not-an-email".to_string()),
            password: None,
            ..jane()
        };

        let first = validate_registration(&request).err().unwrap();
        let second = validate_registration(&request).err().unwrap();
        assert_eq!(first, second);
    }
}
