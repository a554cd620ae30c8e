//! Login, signup, and checkout forms.
//!
//! Each form holds the raw text the user typed. `validate` either returns a
//! typed, submit-ready value or a [`ValidationErrors`] map with one message
//! per failing field. Every field is checked so the user sees all problems at
//! once.

use std::collections::BTreeMap;
use std::fmt;

use pocketcart_core::{Email, PhoneNumber};
use secrecy::{ExposeSecret, SecretString};

use crate::api::{Credentials, NewUser};

/// Minimum password length accepted by login and signup.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A form field that can carry an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Username,
    Email,
    Password,
    FirstName,
    LastName,
    Name,
    Phone,
    Address,
}

impl Field {
    /// The field's display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Password => "password",
            Self::FirstName => "first name",
            Self::LastName => "last name",
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Address => "address",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-field validation messages. Never empty when returned as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrors {
    /// Record a message for `field`, replacing any earlier one.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    /// The message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Failing fields and their messages, in field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// `Ok(value)` if nothing failed, else `Err(self)`.
    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// Login
// =============================================================================

/// The login screen's fields.
#[derive(Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: SecretString,
}

impl LoginForm {
    /// Build a form from plain strings.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Check the form.
    ///
    /// # Errors
    ///
    /// Returns the failing fields: an empty username or a password shorter
    /// than six characters.
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.username.is_empty() {
            errors.insert(Field::Username, "Username is required");
        }
        check_password(self.password.expose_secret(), &mut errors);

        errors.into_result(|| Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Signup
// =============================================================================

/// The signup screen's fields.
#[derive(Clone)]
pub struct SignupForm {
    pub email: String,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl SignupForm {
    /// Check the form.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<NewUser, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let email = Email::parse(&self.email)
            .inspect_err(|_| errors.insert(Field::Email, "Invalid email format"))
            .ok();
        check_password(self.password.expose_secret(), &mut errors);
        if self.first_name.is_empty() {
            errors.insert(Field::FirstName, "First name is required");
        }
        if self.last_name.is_empty() {
            errors.insert(Field::LastName, "Last name is required");
        }
        let phone = PhoneNumber::parse(&self.phone)
            .inspect_err(|_| errors.insert(Field::Phone, "Phone number must be 10 digits"))
            .ok();

        match (email, phone) {
            (Some(email), Some(phone)) if errors.is_empty() => Ok(NewUser {
                email,
                password: self.password.clone(),
                first_name: self.first_name.clone(),
                last_name: self.last_name.clone(),
                phone,
            }),
            _ => Err(errors),
        }
    }
}

impl fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("phone", &self.phone)
            .finish()
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// The checkout screen's fields.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Delivery details that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingDetails {
    pub name: String,
    pub email: Email,
    pub phone: PhoneNumber,
    pub address: String,
}

impl CheckoutForm {
    /// Check the form. Name and address are trimmed.
    ///
    /// The email goes through the strict [`Email`] parser, the same one
    /// signup uses. A loose `\S+@\S+\.\S+` match would accept `a@b@c.de`;
    /// this rejects it.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<ShippingDetails, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.insert(Field::Name, "Name is required");
        }
        let email = Email::parse(self.email.trim())
            .inspect_err(|_| errors.insert(Field::Email, "Valid email is required"))
            .ok();
        let phone = PhoneNumber::parse(self.phone.trim())
            .inspect_err(|_| errors.insert(Field::Phone, "Valid phone number is required"))
            .ok();
        let address = self.address.trim();
        if address.is_empty() {
            errors.insert(Field::Address, "Address is required");
        }

        match (email, phone) {
            (Some(email), Some(phone)) if errors.is_empty() => Ok(ShippingDetails {
                name: name.to_string(),
                email,
                phone,
                address: address.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

fn check_password(password: &str, errors: &mut ValidationErrors) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.insert(
            Field::Password,
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters long"),
        );
    }
}
