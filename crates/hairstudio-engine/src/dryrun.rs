use std::io::Cursor;

use anyhow::Context;
use hairstudio_contracts::credentials::Credential;
use hairstudio_contracts::error::ProviderError;
use hairstudio_contracts::providers::ProviderId;
use hairstudio_contracts::requests::{GeneratedImage, GenerationRequest, ProviderOptions};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::gateway::{ProviderAdapter, ProviderOutput};
use crate::http::{data_uri, into_provider_error, map_object};

const DRYRUN_EDGE: u32 = 64;

/// Offline stand-in for a provider. Keeps the provider's output shape: bytes
/// for Google, `data:` URLs for Replicate.
pub struct DryrunAdapter {
    provider: ProviderId,
}

impl DryrunAdapter {
    pub fn new(provider: ProviderId) -> Self {
        Self { provider }
    }

    fn output_count(request: &GenerationRequest) -> u8 {
        match &request.options {
            ProviderOptions::Replicate(options) => options.num_outputs.max(1),
            ProviderOptions::Google => 1,
        }
    }

    fn render(&self, request: &GenerationRequest) -> anyhow::Result<ProviderOutput> {
        let mut images = Vec::new();
        for index in 0..Self::output_count(request) {
            let png = render_png(&request.prompt, u64::from(index))?;
            images.push(match self.provider {
                ProviderId::Google => GeneratedImage::Bytes {
                    data: png,
                    mime_type: "image/png".to_string(),
                },
                ProviderId::Replicate => GeneratedImage::Url(data_uri("image/png", &png)),
            });
        }
        Ok(ProviderOutput {
            images,
            warnings: Vec::new(),
            provider_request: map_object(json!({
                "endpoint": "dryrun",
                "payload": {
                    "operation": request.operation.slug(),
                    "references": request.reference_images.len(),
                },
            })),
        })
    }
}

impl ProviderAdapter for DryrunAdapter {
    fn id(&self) -> ProviderId {
        self.provider
    }

    fn verify(&self, credential: &Credential) -> Result<bool, ProviderError> {
        Ok(!credential.is_empty())
    }

    fn generate(
        &self,
        _credential: &Credential,
        request: &GenerationRequest,
    ) -> Result<ProviderOutput, ProviderError> {
        self.render(request)
            .map_err(|err| into_provider_error(err, std::time::Duration::ZERO))
    }
}

fn render_png(prompt: &str, seed: u64) -> anyhow::Result<Vec<u8>> {
    let (r, g, b) = color_from_prompt(prompt, seed);
    let image = RgbImage::from_pixel(DRYRUN_EDGE, DRYRUN_EDGE, Rgb([r, g, b]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("failed to encode dry-run PNG")?;
    Ok(bytes)
}

fn color_from_prompt(prompt: &str, seed: u64) -> (u8, u8, u8) {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    hasher.update(seed.to_be_bytes());
    let digest = hasher.finalize();
    (digest[0], digest[1], digest[2])
}
