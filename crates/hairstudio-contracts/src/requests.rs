use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::SessionError;
use crate::prompts::AttributeSelection;
use crate::providers::{Operation, ProviderId};

pub const MAX_SAMPLE_IMAGES: usize = 3;
pub const MAX_IMAGE_COUNT: u8 = 4;

/// A user-supplied image guiding generation or an edit.
#[derive(Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub label: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ReferenceImage {
    pub fn new(label: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

impl std::fmt::Debug for ReferenceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceImage")
            .field("label", &self.label)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    TwoK,
    FourK,
}

impl Resolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::TwoK => "2K",
            Resolution::FourK => "4K",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "2k" | "2048" | "2048x2048" => Some(Resolution::TwoK),
            "4k" | "4096" | "4096x4096" => Some(Resolution::FourK),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleFactor {
    Two,
    #[default]
    Four,
}

impl ScaleFactor {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "2x" | "2" => Some(ScaleFactor::Two),
            "4x" | "4" => Some(ScaleFactor::Four),
            _ => None,
        }
    }

    /// Target output size requested from the provider.
    pub fn resolution(self) -> Resolution {
        match self {
            ScaleFactor::Two => Resolution::TwoK,
            ScaleFactor::Four => Resolution::FourK,
        }
    }
}

/// Knobs on the generation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSettings {
    image_count: u8,
    pub resolution: Resolution,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            image_count: 1,
            resolution: Resolution::default(),
        }
    }
}

impl GenerationSettings {
    pub fn image_count(&self) -> u8 {
        self.image_count
    }

    pub fn set_image_count(&mut self, count: u8) -> Result<(), SessionError> {
        if !(1..=MAX_IMAGE_COUNT).contains(&count) {
            return Err(SessionError::validation(format!(
                "image count must be between 1 and {MAX_IMAGE_COUNT}"
            )));
        }
        self.image_count = count;
        Ok(())
    }
}

/// Main image plus up to three samples for an edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditImages {
    pub main: Option<ReferenceImage>,
    pub samples: [Option<ReferenceImage>; MAX_SAMPLE_IMAGES],
}

impl EditImages {
    /// Ordered reference list: main image first, then samples in slot order.
    pub fn into_references(self) -> Result<Vec<ReferenceImage>, SessionError> {
        let EditImages { main, samples } = self;
        let [first, second, third] = samples;
        let (Some(main), Some(first)) = (main, first) else {
            return Err(SessionError::validation("main image and sample 1 required"));
        };
        let mut references = vec![main, first];
        references.extend(second);
        references.extend(third);
        Ok(references)
    }
}

/// Form contents submitted on the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Generation {
        attributes: AttributeSelection,
        settings: GenerationSettings,
    },
    Edit {
        images: EditImages,
    },
    Upscale {
        image: Option<ReferenceImage>,
        scale: ScaleFactor,
    },
}

impl Submission {
    pub fn kind(&self) -> &'static str {
        match self {
            Submission::Generation { .. } => "generation",
            Submission::Edit { .. } => "edit",
            Submission::Upscale { .. } => "upscale",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplicateOptions {
    pub num_outputs: u8,
    pub size: Option<Resolution>,
    pub aspect_ratio: Option<&'static str>,
    pub prompt_strength: Option<f64>,
}

/// Per-provider request knobs, chosen by the orchestrator from the session's
/// provider at call time.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOptions {
    Google,
    Replicate(ReplicateOptions),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub operation: Operation,
    pub prompt: String,
    pub reference_images: Vec<ReferenceImage>,
    pub options: ProviderOptions,
}

#[derive(Clone, PartialEq, Eq)]
pub enum GeneratedImage {
    Bytes { data: Vec<u8>, mime_type: String },
    Url(String),
}

impl std::fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratedImage::Bytes { data, mime_type } => f
                .debug_struct("Bytes")
                .field("mime_type", mime_type)
                .field("len", &data.len())
                .finish(),
            GeneratedImage::Url(url) => f.debug_tuple("Url").field(url).finish(),
        }
    }
}

/// Completed provider call. Stored in session history and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub id: String,
    pub provider: ProviderId,
    pub operation: Operation,
    pub prompt: String,
    pub images: Vec<GeneratedImage>,
    pub warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl GenerationResult {
    /// Download file name for image `index`, e.g. `hairstyle_20250101_093000.png`.
    pub fn download_name(&self, index: usize) -> String {
        let stamp = self.created_at.format("%Y%m%d_%H%M%S");
        let stem = match self.operation {
            Operation::Generate => "hairstyle".to_string(),
            Operation::Edit(subtype) => format!("{}_changed", subtype.slug()),
            Operation::Upscale => "upscaled".to_string(),
        };
        if self.images.len() > 1 {
            format!("{stem}_{stamp}_{}.png", index + 1)
        } else {
            format!("{stem}_{stamp}.png")
        }
    }
}

/// Replaces inline image payloads and secrets before a provider payload is
/// logged.
pub fn sanitize_payload(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(text) if text.starts_with("data:") => Value::String("<omitted>".to_string()),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => value.clone(),
        Value::Array(rows) => Value::Array(rows.iter().map(sanitize_payload).collect()),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, row) in map {
                let lowered = key.to_ascii_lowercase();
                if matches!(
                    lowered.as_str(),
                    "data" | "image" | "image_bytes" | "key" | "api_key" | "authorization"
                ) {
                    out.insert(key.clone(), Value::String("<omitted>".to_string()));
                    continue;
                }
                out.insert(key.clone(), sanitize_payload(row));
            }
            Value::Object(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::screens::EditSubtype;

    fn image(label: &str) -> ReferenceImage {
        ReferenceImage::new(label, "image/png", label.as_bytes().to_vec())
    }

    #[test]
    fn edit_images_require_main_and_first_sample() {
        let missing_main = EditImages {
            main: None,
            samples: [Some(image("sample1")), None, None],
        };
        assert_eq!(
            missing_main.into_references(),
            Err(SessionError::validation("main image and sample 1 required"))
        );

        let missing_sample = EditImages {
            main: Some(image("main")),
            samples: [None, Some(image("sample2")), None],
        };
        assert!(missing_sample.into_references().is_err());
    }

    #[test]
    fn edit_images_keep_slot_order() -> anyhow::Result<()> {
        let images = EditImages {
            main: Some(image("main")),
            samples: [Some(image("sample1")), None, Some(image("sample3"))],
        };
        let labels = images
            .into_references()?
            .into_iter()
            .map(|image| image.label)
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["main", "sample1", "sample3"]);
        Ok(())
    }

    #[test]
    fn image_count_is_bounded() {
        let mut settings = GenerationSettings::default();
        assert!(settings.set_image_count(4).is_ok());
        assert_eq!(settings.image_count(), 4);
        assert!(settings.set_image_count(0).is_err());
        assert!(settings.set_image_count(5).is_err());
        assert_eq!(settings.image_count(), 4);
    }

    #[test]
    fn download_names_follow_operation() {
        let created_at = Utc
            .with_ymd_and_hms(2025, 3, 9, 14, 5, 7)
            .single()
            .unwrap_or_default();
        let mut result = GenerationResult {
            id: "r1".to_string(),
            provider: ProviderId::Google,
            operation: Operation::Generate,
            prompt: "p".to_string(),
            images: vec![GeneratedImage::Bytes {
                data: vec![1],
                mime_type: "image/png".to_string(),
            }],
            warnings: Vec::new(),
            created_at,
        };
        assert_eq!(result.download_name(0), "hairstyle_20250309_140507.png");

        result.operation = Operation::Edit(EditSubtype::Color);
        assert_eq!(result.download_name(0), "color_changed_20250309_140507.png");

        result.images.push(GeneratedImage::Url("https://x/y.png".to_string()));
        assert_eq!(
            result.download_name(1),
            "color_changed_20250309_140507_2.png"
        );
    }

    #[test]
    fn sanitize_strips_inline_images_and_keys() {
        let payload = json!({
            "contents": [{"parts": [{"text": "hi"}, {"inlineData": {"mimeType": "image/png", "data": "AAAA"}}]}],
            "key": "AIza-secret",
            "input": {"image": "data:image/png;base64,AAAA", "prompt_strength": 0.8, "ref": "data:image/png;base64,BB"}
        });
        let clean = sanitize_payload(&payload);
        assert_eq!(clean["contents"][0]["parts"][0]["text"], json!("hi"));
        assert_eq!(
            clean["contents"][0]["parts"][1]["inlineData"]["data"],
            json!("<omitted>")
        );
        assert_eq!(clean["key"], json!("<omitted>"));
        assert_eq!(clean["input"]["image"], json!("<omitted>"));
        assert_eq!(clean["input"]["ref"], json!("<omitted>"));
        assert_eq!(clean["input"]["prompt_strength"], json!(0.8));
    }

    #[test]
    fn debug_output_hides_image_bytes() {
        let rendered = format!("{:?}", image("main"));
        assert!(rendered.contains("bytes: 4"));
    }
}
