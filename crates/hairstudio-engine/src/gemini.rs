use std::time::Duration;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hairstudio_contracts::credentials::Credential;
use hairstudio_contracts::error::ProviderError;
use hairstudio_contracts::providers::ProviderId;
use hairstudio_contracts::requests::{sanitize_payload, GeneratedImage, GenerationRequest};
use reqwest::blocking::Client as HttpClient;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::GatewayConfig;
use crate::gateway::{ProviderAdapter, ProviderOutput};
use crate::http::{
    build_http_client, inline_image_part, into_provider_error, map_object, response_json_or_error,
    status_error,
};

const VERIFY_PROMPT: &str = "test";

pub struct GeminiAdapter {
    api_base: String,
    image_model: String,
    verify_model: String,
    timeout: Duration,
    http: HttpClient,
}

impl GeminiAdapter {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        Ok(Self {
            api_base: config.gemini_api_base.clone(),
            image_model: config.gemini_image_model.clone(),
            verify_model: config.gemini_verify_model.clone(),
            timeout: config.request_timeout,
            http: build_http_client(config.request_timeout)?,
        })
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    /// Prompt text first, then every reference image in order.
    fn build_parts(request: &GenerationRequest) -> Vec<Value> {
        let mut parts = vec![json!({ "text": request.prompt })];
        parts.extend(request.reference_images.iter().map(inline_image_part));
        parts
    }

    fn build_payload(request: &GenerationRequest) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": Self::build_parts(request),
            }],
            "generationConfig": {
                "responseModalities": ["TEXT", "IMAGE"],
            },
        })
    }

    fn extract_image_items(response_payload: &Value) -> anyhow::Result<Vec<GeneratedImage>> {
        let parts = response_payload
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let mut out = Vec::new();

        for part in parts {
            let inline = part
                .get("inlineData")
                .or_else(|| part.get("inline_data"))
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            let data = inline
                .get("data")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if data.is_empty() {
                continue;
            }
            let bytes = BASE64
                .decode(data.as_bytes())
                .context("Gemini image base64 decode failed")?;
            let mime_type = inline
                .get("mimeType")
                .or_else(|| inline.get("mime_type"))
                .and_then(Value::as_str)
                .unwrap_or("image/png")
                .to_string();
            out.push(GeneratedImage::Bytes {
                data: bytes,
                mime_type,
            });
        }

        Ok(out)
    }

    fn post(&self, model: &str, api_key: &str, payload: &Value) -> anyhow::Result<reqwest::blocking::Response> {
        let endpoint = self.endpoint_for_model(model);
        self.http
            .post(&endpoint)
            .query(&[("key", api_key)])
            .json(payload)
            .send()
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Gemini request failed ({endpoint})"))
    }

    fn generate_inner(
        &self,
        credential: &Credential,
        request: &GenerationRequest,
    ) -> anyhow::Result<ProviderOutput> {
        let payload = Self::build_payload(request);
        debug!(
            model = %self.image_model,
            references = request.reference_images.len(),
            "gemini generateContent"
        );
        let response = self.post(&self.image_model, credential.expose(), &payload)?;
        let response_payload = response_json_or_error("Gemini", response)?;
        let images = Self::extract_image_items(&response_payload)?;
        if images.is_empty() {
            let reason = response_payload
                .pointer("/promptFeedback/blockReason")
                .and_then(Value::as_str)
                .map(|reason| format!("blocked: {reason}"))
                .unwrap_or_else(|| "Gemini response contained no inline image".to_string());
            return Err(ProviderError::EmptyResponse(reason).into());
        }

        Ok(ProviderOutput {
            images,
            warnings: Vec::new(),
            provider_request: map_object(json!({
                "endpoint": self.endpoint_for_model(&self.image_model),
                "payload": sanitize_payload(&payload),
            })),
        })
    }
}

impl ProviderAdapter for GeminiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    fn verify(&self, credential: &Credential) -> Result<bool, ProviderError> {
        if credential.is_empty() {
            return Ok(false);
        }
        let payload = json!({
            "contents": [{ "parts": [{ "text": VERIFY_PROMPT }] }],
        });
        let response = self
            .post(&self.verify_model, credential.expose(), &payload)
            .map_err(|err| into_provider_error(err, self.timeout))?;
        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        let code = status.as_u16();
        if matches!(code, 400 | 401 | 403) {
            return Ok(false);
        }
        Err(status_error("Gemini", code, response.text()))
    }

    fn generate(
        &self,
        credential: &Credential,
        request: &GenerationRequest,
    ) -> Result<ProviderOutput, ProviderError> {
        self.generate_inner(credential, request)
            .map_err(|err| into_provider_error(err, self.timeout))
    }
}
