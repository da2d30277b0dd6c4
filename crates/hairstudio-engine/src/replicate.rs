use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use hairstudio_contracts::credentials::Credential;
use hairstudio_contracts::error::ProviderError;
use hairstudio_contracts::providers::{Operation, ProviderId};
use hairstudio_contracts::requests::{
    sanitize_payload, GeneratedImage, GenerationRequest, ProviderOptions,
};
use reqwest::blocking::Client as HttpClient;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::config::{GatewayConfig, ReplicateVerification};
use crate::gateway::{ProviderAdapter, ProviderOutput};
use crate::http::{
    build_http_client, data_uri, into_provider_error, map_object, push_unique_warning,
    response_json_or_error, status_error, truncate_text,
};

pub struct ReplicateAdapter {
    api_base: String,
    model: String,
    timeout: Duration,
    poll_interval: Duration,
    verification: ReplicateVerification,
    http: HttpClient,
}

impl ReplicateAdapter {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        Ok(Self {
            api_base: config.replicate_api_base.clone(),
            model: config.replicate_model.clone(),
            timeout: config.request_timeout,
            poll_interval: config.poll_interval,
            verification: config.replicate_verification,
            http: build_http_client(config.request_timeout)?,
        })
    }

    fn predictions_endpoint(&self) -> String {
        format!("{}/models/{}/predictions", self.api_base, self.model.trim())
    }

    /// `input` object for one prediction. Only the first reference image is
    /// sent; the model takes a single `image`.
    fn build_input(request: &GenerationRequest, warnings: &mut Vec<String>) -> Map<String, Value> {
        let mut input = map_object(json!({
            "prompt": request.prompt,
            "output_format": "png",
        }));
        if let Some(image) = request.reference_images.first() {
            input.insert(
                "image".to_string(),
                Value::String(data_uri(&image.mime_type, &image.bytes)),
            );
        }
        if request.reference_images.len() > 1 {
            push_unique_warning(
                warnings,
                format!(
                    "Replicate accepts one reference image; ignored {} more.",
                    request.reference_images.len() - 1
                ),
            );
        }
        if let ProviderOptions::Replicate(options) = &request.options {
            if request.operation == Operation::Generate {
                input.insert("num_outputs".to_string(), json!(options.num_outputs));
            }
            if let Some(size) = options.size {
                input.insert("size".to_string(), json!(size.as_str()));
            }
            if let Some(aspect_ratio) = options.aspect_ratio {
                input.insert("aspect_ratio".to_string(), json!(aspect_ratio));
            }
            if let Some(strength) = options.prompt_strength {
                input.insert("prompt_strength".to_string(), json!(strength));
            }
        }
        input
    }

    fn prediction_status(prediction: &Value) -> String {
        prediction
            .get("status")
            .and_then(Value::as_str)
            .map(|value| value.to_ascii_lowercase())
            .unwrap_or_default()
    }

    fn prediction_error(prediction: &Value) -> ProviderError {
        let status = Self::prediction_status(prediction);
        let detail = prediction
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("status {status}"));
        ProviderError::Failed(format!(
            "Replicate prediction {status}: {}",
            truncate_text(&detail, 512)
        ))
    }

    fn poll_url(prediction: &Value) -> Option<&str> {
        prediction
            .get("urls")
            .and_then(Value::as_object)
            .and_then(|obj| obj.get("get"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn poll_prediction(
        &self,
        poll_url: &str,
        api_key: &str,
        started: Instant,
    ) -> anyhow::Result<Value> {
        loop {
            if started.elapsed() >= self.timeout {
                return Err(ProviderError::Timeout {
                    seconds: self.timeout.as_secs(),
                }
                .into());
            }
            thread::sleep(self.poll_interval);
            let response = self
                .http
                .get(poll_url)
                .bearer_auth(api_key)
                .send()
                .with_context(|| format!("Replicate poll request failed ({poll_url})"))?;
            let payload = response_json_or_error("Replicate poll", response)?;
            let status = Self::prediction_status(&payload);
            if status == "succeeded" {
                return Ok(payload);
            }
            if matches!(status.as_str(), "failed" | "canceled") {
                return Err(Self::prediction_error(&payload).into());
            }
            debug!(status = %status, "replicate prediction pending");
        }
    }

    fn extract_output_urls(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::String(url) => {
                let trimmed = url.trim();
                if !trimmed.is_empty()
                    && trimmed.starts_with("http")
                    && !out.iter().any(|existing| existing == trimmed)
                {
                    out.push(trimmed.to_string());
                }
            }
            Value::Array(rows) => {
                for row in rows {
                    Self::extract_output_urls(row, out);
                }
            }
            Value::Object(obj) => {
                if let Some(url) = obj.get("url") {
                    Self::extract_output_urls(url, out);
                }
                if let Some(urls) = obj.get("urls") {
                    Self::extract_output_urls(urls, out);
                }
                if let Some(output) = obj.get("output") {
                    Self::extract_output_urls(output, out);
                }
            }
            _ => {}
        }
    }

    fn generate_inner(
        &self,
        credential: &Credential,
        request: &GenerationRequest,
    ) -> anyhow::Result<ProviderOutput> {
        let api_key = credential.expose();
        let endpoint = self.predictions_endpoint();
        let mut warnings = Vec::new();
        let payload = json!({ "input": Self::build_input(request, &mut warnings) });
        let started = Instant::now();

        debug!(model = %self.model, endpoint = %endpoint, "replicate prediction");
        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(api_key)
            .header("Prefer", "wait")
            .json(&payload)
            .send()
            .with_context(|| format!("Replicate request failed ({endpoint})"))?;
        let mut prediction = response_json_or_error("Replicate", response)?;
        let status = Self::prediction_status(&prediction);
        if status != "succeeded" {
            if !matches!(status.as_str(), "starting" | "processing") {
                return Err(Self::prediction_error(&prediction).into());
            }
            let poll_url = Self::poll_url(&prediction)
                .map(str::to_string)
                .ok_or_else(|| {
                    ProviderError::MalformedResponse(
                        "Replicate prediction missing poll URL".to_string(),
                    )
                })?;
            prediction = self.poll_prediction(&poll_url, api_key, started)?;
        }

        let mut urls = Vec::new();
        if let Some(output) = prediction.get("output") {
            Self::extract_output_urls(output, &mut urls);
        }
        if urls.is_empty() {
            return Err(ProviderError::EmptyResponse(
                "Replicate response returned no image URLs".to_string(),
            )
            .into());
        }

        Ok(ProviderOutput {
            images: urls.into_iter().map(GeneratedImage::Url).collect(),
            warnings,
            provider_request: map_object(json!({
                "endpoint": endpoint,
                "payload": sanitize_payload(&payload),
            })),
        })
    }

    fn verify_account(&self, api_key: &str) -> Result<bool, ProviderError> {
        let endpoint = format!("{}/account", self.api_base);
        let response = self
            .http
            .get(&endpoint)
            .bearer_auth(api_key)
            .send()
            .with_context(|| format!("Replicate account check failed ({endpoint})"))
            .map_err(|err| into_provider_error(err, self.timeout))?;
        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        let code = status.as_u16();
        if matches!(code, 401 | 403) {
            return Ok(false);
        }
        Err(status_error("Replicate", code, response.text()))
    }
}

/// Token shape accepted without a network call.
fn plausible_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(char::is_whitespace)
}

impl ProviderAdapter for ReplicateAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Replicate
    }

    fn verify(&self, credential: &Credential) -> Result<bool, ProviderError> {
        let token = credential.expose();
        if !plausible_token(token) {
            return Ok(false);
        }
        match self.verification {
            ReplicateVerification::ClientOnly => {
                warn!("replicate token accepted on shape only; generation access is unconfirmed");
                Ok(true)
            }
            ReplicateVerification::Account => self.verify_account(token),
        }
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
