//! Deterministic prompt text for every form. Provider-independent.

mod attributes;

pub use attributes::{
    AgeGroup, Angle, AttributeSelection, Backdrop, Bangs, Choice, Expression, Gender, HairColor,
    HairLength, HairTexture, HairVolume, Lighting, ShotType, SkinTone, ATTRIBUTE_NAMES,
};

use crate::screens::EditSubtype;

pub const UPSCALE_PROMPT: &str = "high quality, ultra detailed, 4K resolution";

/// Visual aspects an edit either changes or must keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualAttribute {
    HairStyle,
    HairColor,
    Face,
    Outfit,
    Background,
    Pose,
}

impl VisualAttribute {
    pub const ALL: [VisualAttribute; 6] = [
        VisualAttribute::HairStyle,
        VisualAttribute::HairColor,
        VisualAttribute::Face,
        VisualAttribute::Outfit,
        VisualAttribute::Background,
        VisualAttribute::Pose,
    ];

    /// Lowercase words that name this attribute inside an edit template.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            VisualAttribute::HairStyle => {
                &["hair length", "hair texture", "hair volume", "hair cut"]
            }
            VisualAttribute::HairColor => &["hair color"],
            VisualAttribute::Face => &["face"],
            VisualAttribute::Outfit => &["outfit"],
            VisualAttribute::Background => &["background"],
            VisualAttribute::Pose => &["pose"],
        }
    }
}

impl EditSubtype {
    pub fn changed_attribute(self) -> VisualAttribute {
        match self {
            EditSubtype::Outfit => VisualAttribute::Outfit,
            EditSubtype::Face => VisualAttribute::Face,
            EditSubtype::Background => VisualAttribute::Background,
            EditSubtype::Color => VisualAttribute::HairColor,
        }
    }

    pub fn preserved_attributes(self) -> Vec<VisualAttribute> {
        let changed = self.changed_attribute();
        VisualAttribute::ALL
            .into_iter()
            .filter(|attribute| *attribute != changed)
            .collect()
    }
}

pub fn compile_generation_prompt(selection: &AttributeSelection) -> String {
    format!(
        "A professional studio portrait photograph of a Korean {age} {gender}.

COMPOSITION:
- Shot type: {shot}
- Angle: {angle}
- Expression: {expression}

HAIR (PRIMARY FOCUS):
- Style: {length} {texture} hair
- Color: {color}
- Volume: {volume} volume
- Bangs: {bangs}

SUBJECT DETAILS:
- Skin tone: {skin}
- Clean, professional appearance

TECHNICAL SETTINGS:
- Lighting: {lighting} creating even, flattering illumination
- Background: {background}
- Image quality: High-resolution, sharp focus on hair details
- Aspect ratio: Portrait orientation

The final image should showcase the hairstyle clearly with professional salon-quality photography standards.
",
        age = selection.age().phrase(),
        gender = selection.gender().phrase(),
        shot = selection.shot().phrase(),
        angle = selection.angle().phrase(),
        expression = selection.expression().phrase(),
        length = selection.hair_length().phrase(),
        texture = selection.texture().phrase(),
        color = selection.color().phrase(),
        volume = selection.volume().phrase(),
        bangs = selection.bangs().phrase(),
        skin = selection.skin_tone().phrase(),
        lighting = selection.lighting().phrase(),
        background = selection.background().phrase(),
    )
}

const OUTFIT_PROMPT: &str = "Create a new image using:
- The person and hairstyle from the FIRST image (main image)
- The outfit style from the remaining sample images

CRITICAL RULES:
1. ONLY change the outfit, applying the clothing style from the sample images.
2. Keep EXACTLY as shown in the first image:
   - Hair length, hair texture, hair color, hair volume
   - Hair cut, bangs style, hair direction
   - Face and facial features
   - Background
   - Pose
3. Keep natural lighting and professional portrait quality.

The result should look like the same person from the first image wearing the outfit from the sample images.
";

const FACE_PROMPT: &str = "Create a new image by combining:
- The hairstyle and outfit from the FIRST image (main image)
- The facial features from the remaining sample images

CRITICAL RULES:
1. ONLY change the face, replacing the facial features (eyes, nose, mouth, face shape) with those from the sample images.
2. Keep EXACTLY as shown in the first image:
   - Hair length, hair texture, hair color, hair volume
   - Hair cut, bangs style, hair direction
   - Outfit
   - Background
   - Pose
3. Maintain professional portrait quality and natural lighting.

The result should have the face from the sample images with the exact hairstyle from the first image.
";

const BACKGROUND_PROMPT: &str = "Create a new image by:
- Keeping the person EXACTLY as shown in the FIRST image (main image)
- Replacing the environment with the style from the remaining sample images

CRITICAL RULES:
1. ONLY change the background, replacing the environment with the style from the sample images.
2. Keep EXACTLY as shown in the first image:
   - Hair length, hair texture, hair color, hair volume
   - Hair cut, bangs style, hair direction
   - Face and facial features
   - Outfit
   - Pose
3. Ensure lighting on the person matches the new environment naturally.

The result should be the exact same person in a different environment.
";

const COLOR_PROMPT: &str = "Create a new image by:
- Using the person from the FIRST image (main image)
- Applying the hair color from the remaining sample images

CRITICAL RULES:
1. ONLY change the hair color, applying the shade from the sample images with natural highlights and shadows.
2. Keep EXACTLY as shown in the first image:
   - Hair length, hair texture, hair volume
   - Hair cut, bangs style, hair direction, hair flow
   - Face and facial features
   - Outfit
   - Background
   - Pose
3. Maintain professional portrait quality.

The result should be the exact same hairstyle in a different shade.
";

pub fn compile_edit_prompt(subtype: EditSubtype) -> &'static str {
    match subtype {
        EditSubtype::Outfit => OUTFIT_PROMPT,
        EditSubtype::Face => FACE_PROMPT,
        EditSubtype::Background => BACKGROUND_PROMPT,
        EditSubtype::Color => COLOR_PROMPT,
    }
}
