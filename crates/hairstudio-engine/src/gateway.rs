use std::collections::BTreeMap;

use hairstudio_contracts::credentials::{Credential, CredentialVerifier};
use hairstudio_contracts::error::ProviderError;
use hairstudio_contracts::providers::ProviderId;
use hairstudio_contracts::requests::{GeneratedImage, GenerationRequest};
use serde_json::{Map, Value};

use crate::config::GatewayConfig;
use crate::dryrun::DryrunAdapter;
use crate::gemini::GeminiAdapter;
use crate::replicate::ReplicateAdapter;

#[derive(Debug, Clone, Default)]
pub struct ProviderOutput {
    pub images: Vec<GeneratedImage>,
    pub warnings: Vec<String>,
    /// Sanitized request summary for diagnostics.
    pub provider_request: Map<String, Value>,
}

/// One external image service. Implementations perform blocking network I/O
/// and report every failure as a [`ProviderError`].
pub trait ProviderAdapter: Send + Sync {
    fn id(&self) -> ProviderId;

    fn verify(&self, credential: &Credential) -> Result<bool, ProviderError>;

    fn generate(
        &self,
        credential: &Credential,
        request: &GenerationRequest,
    ) -> Result<ProviderOutput, ProviderError>;
}

#[derive(Default)]
pub struct ProviderGateway {
    adapters: BTreeMap<ProviderId, Box<dyn ProviderAdapter>>,
}

impl ProviderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Real adapters for every provider, or offline ones when
    /// `config.dry_run` is set.
    pub fn from_config(config: &GatewayConfig) -> anyhow::Result<Self> {
        let mut gateway = Self::new();
        if config.dry_run {
            for provider in ProviderId::ALL {
                gateway.register(DryrunAdapter::new(provider));
            }
            return Ok(gateway);
        }
        gateway.register(GeminiAdapter::new(config)?);
        gateway.register(ReplicateAdapter::new(config)?);
        Ok(gateway)
    }

    pub fn register<A: ProviderAdapter + 'static>(&mut self, adapter: A) {
        self.adapters.insert(adapter.id(), Box::new(adapter));
    }

    pub fn get(&self, provider: ProviderId) -> Option<&dyn ProviderAdapter> {
        self.adapters.get(&provider).map(|adapter| adapter.as_ref())
    }

    pub fn providers(&self) -> Vec<ProviderId> {
        self.adapters.keys().copied().collect()
    }

    pub fn generate(
        &self,
        provider: ProviderId,
        credential: &Credential,
        request: &GenerationRequest,
    ) -> Result<ProviderOutput, ProviderError> {
        self.adapter(provider)?.generate(credential, request)
    }

    fn adapter(&self, provider: ProviderId) -> Result<&dyn ProviderAdapter, ProviderError> {
        self.get(provider).ok_or_else(|| {
            ProviderError::Network(format!("no adapter registered for {}", provider.label()))
        })
    }
}

impl CredentialVerifier for ProviderGateway {
    fn verify(&self, provider: ProviderId, credential: &Credential) -> Result<bool, ProviderError> {
        self.adapter(provider)?.verify(credential)
    }
}
