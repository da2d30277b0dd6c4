use std::fmt;

use crate::error::{ProviderError, SessionError};
use crate::providers::ProviderId;

/// Opaque provider secret. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Credential::new(value)
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Credential::new(value)
    }
}

/// External check of a credential. Implemented by the provider gateway.
pub trait CredentialVerifier {
    fn verify(&self, provider: ProviderId, credential: &Credential) -> Result<bool, ProviderError>;
}

/// At most one active (provider, credential) pair. Holding both in one
/// `Option` keeps the session from ever being partially authenticated.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    active: Option<(ProviderId, Credential)>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// One verification attempt; the store is only written on success.
    pub fn login<V: CredentialVerifier + ?Sized>(
        &mut self,
        provider: ProviderId,
        credential: Credential,
        verifier: &V,
    ) -> Result<(), SessionError> {
        if credential.is_empty() {
            return Err(SessionError::validation("credential required"));
        }
        if !verifier.verify(provider, &credential)? {
            return Err(SessionError::InvalidCredential { provider });
        }
        self.active = Some((provider, credential));
        Ok(())
    }

    pub fn logout(&mut self) {
        self.active = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.active.is_some()
    }

    pub fn provider(&self) -> Option<ProviderId> {
        self.active.as_ref().map(|(provider, _)| *provider)
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.active.as_ref().map(|(_, credential)| credential)
    }
}
