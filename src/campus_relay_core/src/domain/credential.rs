use std::fmt;

use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Identity must not be empty")]
    EmptyIdentity,
    #[error("Secret must not be empty")]
    EmptySecret,
}

/// Campus identity used as the `username` form field, e.g. a student number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityId(String);

impl IdentityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IdentityId {
    type Error = CredentialError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CredentialError::EmptyIdentity);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl TryFrom<&str> for IdentityId {
    type Error = CredentialError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_owned())
    }
}

impl AsRef<str> for IdentityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque password or token. Only ever exposed while building a login form body.
#[derive(Debug, Clone)]
pub struct CredentialSecret(Secret<String>);

impl TryFrom<Secret<String>> for CredentialSecret {
    type Error = CredentialError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        if value.expose_secret().is_empty() {
            return Err(CredentialError::EmptySecret);
        }
        Ok(Self(value))
    }
}

impl AsRef<Secret<String>> for CredentialSecret {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl PartialEq for CredentialSecret {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    identity_id: IdentityId,
    secret: CredentialSecret,
}

impl Credential {
    pub fn new(identity_id: IdentityId, secret: CredentialSecret) -> Self {
        Self {
            identity_id,
            secret,
        }
    }

    /// Builds a credential from raw user input.
    pub fn parse(identity_id: &str, secret: Secret<String>) -> Result<Self, CredentialError> {
        Ok(Self::new(
            IdentityId::try_from(identity_id)?,
            CredentialSecret::try_from(secret)?,
        ))
    }

    pub fn identity_id(&self) -> &IdentityId {
        &self.identity_id
    }

    pub fn secret(&self) -> &CredentialSecret {
        &self.secret
    }
}
