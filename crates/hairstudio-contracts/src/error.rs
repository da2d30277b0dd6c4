use crate::providers::ProviderId;
use crate::screens::ScreenId;

/// Failure reported by a provider adapter. Always surfaced to the user as a
/// message; never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("provider call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("provider quota exceeded: {0}")]
    Quota(String),

    #[error("provider request failed ({status}): {body}")]
    Http { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("provider returned no image: {0}")]
    EmptyResponse(String),

    /// The provider accepted the request and then reported it as failed.
    #[error("provider reported failure: {0}")]
    Failed(String),
}

impl ProviderError {
    /// Classifies a non-success HTTP status. 402 and 429 are account limits
    /// on both supported providers.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            402 | 429 => ProviderError::Quota(format!("HTTP {status}: {body}")),
            _ => ProviderError::Http { status, body },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("invalid credential for {provider}")]
    InvalidCredential { provider: ProviderId },

    #[error("{0}")]
    Validation(String),

    #[error("{action} is not available on {screen}{}", provider_suffix(.provider))]
    UnsupportedAction {
        provider: Option<ProviderId>,
        screen: ScreenId,
        action: String,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("another provider call is still in flight")]
    Busy,
}

impl SessionError {
    pub fn validation(message: impl Into<String>) -> Self {
        SessionError::Validation(message.into())
    }

    pub fn unsupported(
        provider: Option<ProviderId>,
        screen: ScreenId,
        action: impl Into<String>,
    ) -> Self {
        SessionError::UnsupportedAction {
            provider,
            screen,
            action: action.into(),
        }
    }

    /// Short machine-readable kind used in the event log.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::InvalidCredential { .. } => "invalid_credential",
            SessionError::Validation(_) => "validation",
            SessionError::UnsupportedAction { .. } => "unsupported_action",
            SessionError::Provider(_) => "provider",
            SessionError::Busy => "busy",
        }
    }
}

fn provider_suffix(provider: &Option<ProviderId>) -> String {
    provider
        .map(|provider| format!(" for {}", provider.label()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_statuses_are_classified() {
        assert!(matches!(
            ProviderError::from_status(429, "slow down"),
            ProviderError::Quota(_)
        ));
        assert!(matches!(
            ProviderError::from_status(402, "no credit"),
            ProviderError::Quota(_)
        ));
        assert_eq!(
            ProviderError::from_status(500, "boom"),
            ProviderError::Http {
                status: 500,
                body: "boom".to_string()
            }
        );
    }

    #[test]
    fn unsupported_action_message_names_provider_and_screen() {
        let err = SessionError::unsupported(
            Some(ProviderId::Google),
            ScreenId::ProviderHome,
            "select upscale",
        );
        assert_eq!(
            err.to_string(),
            "select upscale is not available on provider home for Google Gemini"
        );
        assert_eq!(err.kind(), "unsupported_action");
    }

    #[test]
    fn provider_errors_convert_transparently() {
        let err: SessionError = ProviderError::Timeout { seconds: 30 }.into();
        assert_eq!(err.to_string(), "provider call timed out after 30s");
        assert_eq!(err.kind(), "provider");
    }
}
