use std::time::Duration;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hairstudio_contracts::error::ProviderError;
use hairstudio_contracts::requests::ReferenceImage;
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde_json::{json, Map, Value};

pub(crate) fn build_http_client(timeout: Duration) -> anyhow::Result<HttpClient> {
    HttpClient::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}

/// Reads the body and fails with a typed status error for non-2xx.
pub(crate) fn response_json_or_error(
    provider: &str,
    response: HttpResponse,
) -> anyhow::Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        return Err(ProviderError::from_status(code, truncate_text(&body, 512)).into());
    }
    let parsed: Value = serde_json::from_str(&body).map_err(|err| {
        ProviderError::MalformedResponse(format!("{provider} returned invalid JSON payload: {err}"))
    })?;
    Ok(parsed)
}

/// Typed error for a rejected status. The status still classifies the error
/// when the body cannot be read.
pub(crate) fn status_error<E>(provider: &str, code: u16, body: Result<String, E>) -> ProviderError
where
    E: Into<anyhow::Error>,
{
    match body {
        Ok(body) => ProviderError::from_status(code, truncate_text(&body, 512)),
        Err(err) => {
            let err = err.into();
            ProviderError::from_status(
                code,
                format!("{provider} error body unreadable: {}", error_chain_text(&err, 200)),
            )
        }
    }
}

/// Collapses an adapter failure into the provider error taxonomy. Typed
/// errors raised inside the adapter pass through untouched.
pub(crate) fn into_provider_error(err: anyhow::Error, timeout: Duration) -> ProviderError {
    if let Some(typed) = err.downcast_ref::<ProviderError>() {
        return typed.clone();
    }
    let transport = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<reqwest::Error>());
    match transport {
        Some(reqwest_err) if reqwest_err.is_timeout() => ProviderError::Timeout {
            seconds: timeout.as_secs(),
        },
        Some(_) => ProviderError::Network(error_chain_text(&err, 400)),
        None => ProviderError::MalformedResponse(error_chain_text(&err, 400)),
    }
}

pub(crate) fn error_chain_text(err: &anyhow::Error, max_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        if parts.last().map(|existing| existing == trimmed).unwrap_or(false) {
            continue;
        }
        parts.push(trimmed.to_string());
    }
    if parts.is_empty() {
        return truncate_text(&err.to_string(), max_chars);
    }
    truncate_text(&parts.join(" | caused by: "), max_chars)
}

pub(crate) fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

pub(crate) fn push_unique_warning(warnings: &mut Vec<String>, message: String) {
    if message.trim().is_empty() {
        return;
    }
    if warnings.iter().any(|existing| existing == &message) {
        return;
    }
    warnings.push(message);
}

pub(crate) fn map_object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

pub(crate) fn inline_image_part(image: &ReferenceImage) -> Value {
    json!({
        "inlineData": {
            "mimeType": image.mime_type,
            "data": BASE64.encode(&image.bytes),
        }
    })
}

pub(crate) fn data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_errors_survive_anyhow_round_trip() {
        let err: anyhow::Error = ProviderError::from_status(429, "slow down").into();
        let err = err.context("Gemini generate failed");
        assert_eq!(
            into_provider_error(err, Duration::from_secs(30)),
            ProviderError::Quota("HTTP 429: slow down".to_string())
        );
    }

    #[test]
    fn untyped_errors_become_malformed_response() {
        let err = anyhow::anyhow!("missing field").context("Replicate response unreadable");
        let mapped = into_provider_error(err, Duration::from_secs(30));
        let ProviderError::MalformedResponse(message) = mapped else {
            panic!("unexpected mapping: {mapped:?}");
        };
        assert!(message.contains("Replicate response unreadable"));
        assert!(message.contains("missing field"));
    }

    #[test]
    fn status_error_keeps_classification_when_body_is_lost() {
        let unreadable: Result<String, anyhow::Error> = Err(anyhow::anyhow!("connection reset"));
        let err = status_error("Gemini", 429, unreadable);
        assert_eq!(
            err,
            ProviderError::Quota(
                "HTTP 429: Gemini error body unreadable: connection reset".to_string()
            )
        );

        let readable: Result<String, anyhow::Error> = Ok("upstream down".to_string());
        assert_eq!(
            status_error("Replicate", 503, readable),
            ProviderError::Http {
                status: 503,
                body: "upstream down".to_string()
            }
        );
    }

    #[test]
    fn error_chain_text_skips_duplicates() {
        let err = anyhow::anyhow!("socket closed")
            .context("socket closed")
            .context("Gemini request failed (https://example.test)");
        let rendered = error_chain_text(&err, 400);
        assert_eq!(
            rendered,
            "Gemini request failed (https://example.test) | caused by: socket closed"
        );
    }

    #[test]
    fn truncate_and_warning_helpers() {
        assert_eq!(truncate_text("abcdef", 3), "abc…");
        assert_eq!(truncate_text("abc", 3), "abc");

        let mut warnings = Vec::new();
        push_unique_warning(&mut warnings, "dropped 2 samples".to_string());
        push_unique_warning(&mut warnings, "dropped 2 samples".to_string());
        push_unique_warning(&mut warnings, "  ".to_string());
        assert_eq!(warnings, vec!["dropped 2 samples".to_string()]);
    }

    #[test]
    fn image_encodings() {
        let image = ReferenceImage::new("main", "image/jpeg", b"abc".to_vec());
        let part = inline_image_part(&image);
        assert_eq!(part["inlineData"]["mimeType"], json!("image/jpeg"));
        assert_eq!(part["inlineData"]["data"], json!("YWJj"));
        assert_eq!(data_uri("image/png", b"abc"), "data:image/png;base64,YWJj");
    }
}
