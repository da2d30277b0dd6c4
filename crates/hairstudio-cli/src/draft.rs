use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use hairstudio_contracts::chat::ImageSlot;
use hairstudio_contracts::prompts::AttributeSelection;
use hairstudio_contracts::requests::{
    EditImages, GenerationSettings, ReferenceImage, Resolution, ScaleFactor, Submission,
};
use hairstudio_contracts::screens::ScreenId;

/// Unsubmitted form contents held by the terminal UI.
#[derive(Debug, Clone, Default)]
pub struct FormDraft {
    pub attributes: AttributeSelection,
    pub settings: GenerationSettings,
    pub edit: EditImages,
    pub upscale_input: Option<ReferenceImage>,
    pub scale: ScaleFactor,
}

impl FormDraft {
    pub fn attach(&mut self, slot: ImageSlot, image: ReferenceImage) {
        match slot {
            ImageSlot::Main => self.edit.main = Some(image),
            ImageSlot::Sample(index) => {
                if let Some(entry) = self.edit.samples.get_mut(index) {
                    *entry = Some(image);
                }
            }
            ImageSlot::Input => self.upscale_input = Some(image),
        }
    }

    pub fn clear_images(&mut self) {
        self.edit = EditImages::default();
        self.upscale_input = None;
    }

    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.settings.resolution = resolution;
    }

    /// The submission matching the form shown on `screen`, if it is a form.
    pub fn submission_for(&self, screen: ScreenId) -> Option<Submission> {
        match screen {
            ScreenId::GenerationForm => Some(Submission::Generation {
                attributes: self.attributes.clone(),
                settings: self.settings,
            }),
            ScreenId::EditForm(_) => Some(Submission::Edit {
                images: self.edit.clone(),
            }),
            ScreenId::UpscaleForm => Some(Submission::Upscale {
                image: self.upscale_input.clone(),
                scale: self.scale,
            }),
            ScreenId::Login | ScreenId::ProviderHome | ScreenId::EditMenu => None,
        }
    }

    pub fn attached_labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        if let Some(main) = &self.edit.main {
            labels.push(main.label.clone());
        }
        labels.extend(self.edit.samples.iter().flatten().map(|image| image.label.clone()));
        if let Some(input) = &self.upscale_input {
            labels.push(input.label.clone());
        }
        labels
    }
}

/// Reads an image from disk and checks that it decodes as a known format.
pub fn load_reference_image(path: &Path, slot: ImageSlot) -> Result<ReferenceImage> {
    let bytes = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
    let format = image::guess_format(&bytes)
        .with_context(|| format!("{} is not a recognized image", path.display()))?;
    let mime_type = format.to_mime_type();
    if !matches!(mime_type, "image/png" | "image/jpeg" | "image/webp") {
        bail!("{} must be PNG, JPEG or WebP (found {mime_type})", path.display());
    }
    Ok(ReferenceImage::new(slot.label(), mime_type, bytes))
}
