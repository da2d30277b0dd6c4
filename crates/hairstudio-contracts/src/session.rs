use std::sync::Arc;

use crate::credentials::{Credential, CredentialStore, CredentialVerifier};
use crate::error::SessionError;
use crate::navigation::next_screen;
use crate::providers::{CapabilityTable, ProviderId};
use crate::requests::GenerationResult;
use crate::screens::{Action, ScreenId};

/// Returned by every session mutation; the presentation layer renders from
/// this instead of re-reading global state.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub previous: ScreenId,
    pub screen: ScreenId,
    pub provider: Option<ProviderId>,
    pub result: Option<Arc<GenerationResult>>,
}

impl Transition {
    pub fn changed_screen(&self) -> bool {
        self.previous != self.screen
    }
}

/// The single per-user session. Fields are private: the credential store and
/// navigation methods below are the only writers.
#[derive(Debug, Clone)]
pub struct Session {
    credentials: CredentialStore,
    screen: ScreenId,
    history: Vec<Arc<GenerationResult>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            credentials: CredentialStore::new(),
            screen: ScreenId::Login,
            history: Vec::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated()
    }

    pub fn provider(&self) -> Option<ProviderId> {
        self.credentials.provider()
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credentials.credential()
    }

    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    pub fn history(&self) -> &[Arc<GenerationResult>] {
        &self.history
    }

    pub fn last_result(&self) -> Option<&Arc<GenerationResult>> {
        self.history.last()
    }

    /// Verifies once and, on success, lands on ProviderHome. Only valid from
    /// the Login screen.
    pub fn login<V: CredentialVerifier + ?Sized>(
        &mut self,
        provider: ProviderId,
        credential: Credential,
        verifier: &V,
    ) -> Result<Transition, SessionError> {
        if self.screen != ScreenId::Login || self.is_authenticated() {
            return Err(SessionError::unsupported(
                self.provider(),
                self.screen,
                "login",
            ));
        }
        self.credentials.login(provider, credential, verifier)?;
        Ok(self.move_to(ScreenId::ProviderHome, None))
    }

    /// Unconditional reset to the initial unauthenticated state.
    pub fn logout(&mut self) -> Transition {
        let previous = self.screen;
        let provider = self.provider();
        *self = Session::new();
        Transition {
            previous,
            screen: ScreenId::Login,
            provider,
            result: None,
        }
    }

    pub fn apply(
        &mut self,
        table: &CapabilityTable,
        action: Action,
    ) -> Result<Transition, SessionError> {
        if action == Action::Logout {
            return Ok(self.logout());
        }
        let next = next_screen(table, self.screen, self.provider(), action)?;
        Ok(self.move_to(next, None))
    }

    /// Appends a finished call to history. The screen stays put; the result
    /// rides along on the transition for display.
    pub fn record(&mut self, result: GenerationResult) -> Transition {
        let result = Arc::new(result);
        self.history.push(Arc::clone(&result));
        let screen = self.screen;
        self.move_to(screen, Some(result))
    }

    fn move_to(&mut self, screen: ScreenId, result: Option<Arc<GenerationResult>>) -> Transition {
        let previous = self.screen;
        self.screen = screen;
        Transition {
            previous,
            screen,
            provider: self.provider(),
            result,
        }
    }
}
