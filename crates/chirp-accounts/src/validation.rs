//! Input rules for the account forms.
//!
//! Validation is a pure function of the form: it never touches the store.
//! Email uniqueness is checked by the lifecycle manager on top of these rules.

use chirp_core::FieldErrors;
use validator::{Validate, ValidationErrors};

pub(crate) const REQUIRED: &str = "is required";
pub(crate) const EMAIL_TAKEN: &str = "has already been taken";
const MISMATCH: &str = "confirmation does not match";

#[derive(Debug, Clone, Default, Validate)]
pub struct RegisterForm {
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub name: String,
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub email: String,
    #[validate(
        length(min = 6, message = "must be at least 6 characters"),
        must_match(other = "password_confirmation", message = "confirmation does not match")
    )]
    pub password: String,
    pub password_confirmation: String,
}

impl RegisterForm {
    /// Trim the name, trim and lowercase the email. Passwords are kept verbatim.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct ProfileForm {
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub name: String,
    /// `None` keeps the current password.
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

impl ProfileForm {
    /// Trim the name; an empty password means "unchanged" and drops the
    /// confirmation along with it.
    pub fn normalized(self) -> Self {
        let password = self.password.filter(|p| !p.is_empty());
        let password_confirmation = if password.is_some() {
            self.password_confirmation
        } else {
            None
        };
        Self {
            name: self.name.trim().to_string(),
            password,
            password_confirmation,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_registration(form: &RegisterForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let blank = [
        ("name", form.name.trim().is_empty()),
        ("email", form.email.trim().is_empty()),
        ("password", form.password.is_empty()),
    ];
    for (field, is_blank) in blank {
        if is_blank {
            errors.add(field, REQUIRED);
        }
    }
    if let Err(e) = form.validate() {
        merge(&mut errors, &e);
    }
    errors
}

pub fn validate_profile(form: &ProfileForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if form.name.trim().is_empty() {
        errors.add("name", REQUIRED);
    }
    if let Err(e) = form.validate() {
        merge(&mut errors, &e);
    }
    if form.password.is_some() && form.password != form.password_confirmation {
        errors.add("password", MISMATCH);
    }
    errors
}

/// Fold validator output into `errors`, skipping fields already reported
/// as missing.
fn merge(errors: &mut FieldErrors, validation: &ValidationErrors) {
    let mut found = Vec::new();
    for (field, field_errors) in validation.field_errors() {
        let field = field.to_string();
        if errors.get(&field).is_some_and(|m| m.iter().any(|m| m == REQUIRED)) {
            continue;
        }
        for error in field_errors.iter() {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("is invalid ({})", error.code));
            found.push((field.clone(), message));
        }
    }
    // validator hands back a HashMap; sort so messages come out stable.
    found.sort();
    for (field, message) in found {
        errors.add(field, message);
    }
}
