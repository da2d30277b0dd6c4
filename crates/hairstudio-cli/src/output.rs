use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hairstudio_contracts::requests::{GeneratedImage, GenerationResult};
use image::ImageFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedOutput {
    File(PathBuf),
    Link(String),
}

/// Writes byte outputs as PNG under `dir`; remote URLs are returned as links
/// for the user to open.
pub fn save_result(result: &GenerationResult, dir: &Path) -> Result<Vec<SavedOutput>> {
    let mut saved = Vec::new();
    for (index, image) in result.images.iter().enumerate() {
        let bytes = match image {
            GeneratedImage::Bytes { data, .. } => data.clone(),
            GeneratedImage::Url(url) => match decode_data_uri(url) {
                Some(bytes) => bytes?,
                None => {
                    saved.push(SavedOutput::Link(url.clone()));
                    continue;
                }
            },
        };
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join(result.download_name(index));
        image::load_from_memory(&bytes)
            .context("provider returned bytes that do not decode as an image")?
            .save_with_format(&path, ImageFormat::Png)
            .with_context(|| format!("failed to save {}", path.display()))?;
        saved.push(SavedOutput::File(path));
    }
    Ok(saved)
}

fn decode_data_uri(url: &str) -> Option<Result<Vec<u8>>> {
    let rest = url.strip_prefix("data:")?;
    let (_, data) = rest.split_once(";base64,")?;
    Some(
        BASE64
            .decode(data.as_bytes())
            .context("inline image is not valid base64"),
    )
}

/// Short human label for one output.
pub fn describe_image(image: &GeneratedImage) -> String {
    match image {
        GeneratedImage::Bytes { data, mime_type } => format!("{mime_type}, {} bytes", data.len()),
        GeneratedImage::Url(url) if url.starts_with("data:") => "inline image".to_string(),
        GeneratedImage::Url(url) => url.clone(),
    }
}
