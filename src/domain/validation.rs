use crate::domain::account::{LoginRequest, SignupRequest};
use crate::domain::error::DomainError;
use tracing::{debug, warn};
use validator::{Validate, ValidationErrors};

/// A request body that can be normalized and checked before it reaches the
/// auth service.
pub trait RequestSchema: Validate {
    /// Cosmetic cleanup applied before validation. Must never touch passwords.
    fn normalize(self) -> Self;
}

impl RequestSchema for SignupRequest {
    fn normalize(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password,
        }
    }
}

impl RequestSchema for LoginRequest {
    fn normalize(self) -> Self {
        Self {
            email: normalize_email(&self.email),
            password: self.password,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalizes and validates `body`, returning it on success or a
/// [`DomainError::Validation`] describing every failed field.
pub fn validate_schema<T: RequestSchema>(body: T) -> Result<T, DomainError> {
    let body = body.normalize();
    match body.validate() {
        Ok(()) => Ok(body),
        Err(errors) => {
            let description = describe(&errors);
            warn!(errors = %description, "Request body rejected");
            Err(DomainError::Validation(description))
        }
    }
}

pub fn signup_validation(body: SignupRequest) -> Result<SignupRequest, DomainError> {
    debug!("Validating signup request");
    validate_schema(body)
}

pub fn login_validation(body: LoginRequest) -> Result<LoginRequest, DomainError> {
    debug!("Validating login request");
    validate_schema(body)
}

fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    // field_errors() is a HashMap
    messages.sort();
    messages.dedup();
    messages.join("; ")
}
