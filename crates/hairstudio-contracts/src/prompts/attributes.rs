use crate::error::SessionError;

/// A closed value set with a CLI slug and exactly one prompt phrase per value.
pub trait Choice: Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    fn slug(self) -> &'static str;
    fn phrase(self) -> &'static str;

    fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|value| value.slug() == normalized)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeGroup {
    Teens,
    Twenties,
    Thirties,
    Forties,
    Fifties,
}

impl Choice for AgeGroup {
    const ALL: &'static [Self] = &[
        AgeGroup::Teens,
        AgeGroup::Twenties,
        AgeGroup::Thirties,
        AgeGroup::Forties,
        AgeGroup::Fifties,
    ];

    fn slug(self) -> &'static str {
        match self {
            AgeGroup::Teens => "teens",
            AgeGroup::Twenties => "20s",
            AgeGroup::Thirties => "30s",
            AgeGroup::Forties => "40s",
            AgeGroup::Fifties => "50s",
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            AgeGroup::Teens => "teenage",
            AgeGroup::Twenties => "20s",
            AgeGroup::Thirties => "30s",
            AgeGroup::Forties => "40s",
            AgeGroup::Fifties => "50s",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

impl Choice for Gender {
    const ALL: &'static [Self] = &[Gender::Female, Gender::Male];

    fn slug(self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
        }
    }

    fn phrase(self) -> &'static str {
        self.slug()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkinTone {
    Fair,
    Medium,
    Tan,
}

impl Choice for SkinTone {
    const ALL: &'static [Self] = &[SkinTone::Fair, SkinTone::Medium, SkinTone::Tan];

    fn slug(self) -> &'static str {
        match self {
            SkinTone::Fair => "fair",
            SkinTone::Medium => "medium",
            SkinTone::Tan => "tan",
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            SkinTone::Fair => "fair skin",
            SkinTone::Medium => "medium skin tone",
            SkinTone::Tan => "tan skin",
        }
    }
}

/// Cut or length. The first five are offered for women, the last three for
/// men; see [`HairLength::options_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HairLength {
    PixieCut,
    ShortBob,
    ShoulderLength,
    LongBob,
    Long,
    DownStyled,
    UpStyled,
    Undercut,
}

const FEMALE_LENGTHS: &[HairLength] = &[
    HairLength::PixieCut,
    HairLength::ShortBob,
    HairLength::ShoulderLength,
    HairLength::LongBob,
    HairLength::Long,
];

const MALE_LENGTHS: &[HairLength] = &[
    HairLength::DownStyled,
    HairLength::UpStyled,
    HairLength::Undercut,
];

impl HairLength {
    pub fn options_for(gender: Gender) -> &'static [HairLength] {
        match gender {
            Gender::Female => FEMALE_LENGTHS,
            Gender::Male => MALE_LENGTHS,
        }
    }

    pub fn is_legal_for(self, gender: Gender) -> bool {
        Self::options_for(gender).contains(&self)
    }
}

impl Choice for HairLength {
    const ALL: &'static [Self] = &[
        HairLength::PixieCut,
        HairLength::ShortBob,
        HairLength::ShoulderLength,
        HairLength::LongBob,
        HairLength::Long,
        HairLength::DownStyled,
        HairLength::UpStyled,
        HairLength::Undercut,
    ];

    fn slug(self) -> &'static str {
        match self {
            HairLength::PixieCut => "pixie-cut",
            HairLength::ShortBob => "short-bob",
            HairLength::ShoulderLength => "shoulder-length",
            HairLength::LongBob => "long-bob",
            HairLength::Long => "long",
            HairLength::DownStyled => "down-styled",
            HairLength::UpStyled => "up-styled",
            HairLength::Undercut => "undercut",
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            HairLength::PixieCut => "pixie cut",
            HairLength::ShortBob => "short bob",
            HairLength::ShoulderLength => "shoulder length",
            HairLength::LongBob => "long bob",
            HairLength::Long => "long",
            HairLength::DownStyled => "down-styled",
            HairLength::UpStyled => "up-styled",
            HairLength::Undercut => "undercut",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HairTexture {
    Straight,
    CCurl,
    Wavy,
}

impl Choice for HairTexture {
    const ALL: &'static [Self] = &[HairTexture::Straight, HairTexture::CCurl, HairTexture::Wavy];

    fn slug(self) -> &'static str {
        match self {
            HairTexture::Straight => "straight",
            HairTexture::CCurl => "c-curl",
            HairTexture::Wavy => "wavy",
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            HairTexture::Straight => "straight",
            HairTexture::CCurl => "soft C-curl",
            HairTexture::Wavy => "wavy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HairColor {
    NaturalBlack,
    DarkBrown,
    Brown,
    AshBrown,
    LightBrown,
}

impl Choice for HairColor {
    const ALL: &'static [Self] = &[
        HairColor::NaturalBlack,
        HairColor::DarkBrown,
        HairColor::Brown,
        HairColor::AshBrown,
        HairColor::LightBrown,
    ];

    fn slug(self) -> &'static str {
        match self {
            HairColor::NaturalBlack => "natural-black",
            HairColor::DarkBrown => "dark-brown",
            HairColor::Brown => "brown",
            HairColor::AshBrown => "ash-brown",
            HairColor::LightBrown => "light-brown",
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            HairColor::NaturalBlack => "natural black",
            HairColor::DarkBrown => "dark brown",
            HairColor::Brown => "brown",
            HairColor::AshBrown => "ash brown",
            HairColor::LightBrown => "light brown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HairVolume {
    Voluminous,
    Natural,
    Flat,
}

impl Choice for HairVolume {
    const ALL: &'static [Self] = &[HairVolume::Voluminous, HairVolume::Natural, HairVolume::Flat];

    fn slug(self) -> &'static str {
        match self {
            HairVolume::Voluminous => "voluminous",
            HairVolume::Natural => "natural",
            HairVolume::Flat => "flat",
        }
    }

    fn phrase(self) -> &'static str {
        self.slug()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bangs {
    With,
    None,
    SeeThrough,
}

impl Choice for Bangs {
    const ALL: &'static [Self] = &[Bangs::With, Bangs::None, Bangs::SeeThrough];

    fn slug(self) -> &'static str {
        match self {
            Bangs::With => "with",
            Bangs::None => "none",
            Bangs::SeeThrough => "see-through",
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Bangs::With => "with bangs",
            Bangs::None => "no bangs",
            Bangs::SeeThrough => "with see-through bangs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotType {
    Headshot,
    UpperBody,
}

impl Choice for ShotType {
    const ALL: &'static [Self] = &[ShotType::Headshot, ShotType::UpperBody];

    fn slug(self) -> &'static str {
        match self {
            ShotType::Headshot => "headshot",
            ShotType::UpperBody => "upper-body",
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            ShotType::Headshot => "headshot",
            ShotType::UpperBody => "upper body",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Angle {
    Front,
    ThreeQuarter,
    Side,
}

impl Choice for Angle {
    const ALL: &'static [Self] = &[Angle::Front, Angle::ThreeQuarter, Angle::Side];

    fn slug(self) -> &'static str {
        match self {
            Angle::Front => "front",
            Angle::ThreeQuarter => "three-quarter",
            Angle::Side => "side",
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Angle::Front => "front view",
            Angle::ThreeQuarter => "3/4 view",
            Angle::Side => "side profile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expression {
    Neutral,
    SubtleSmile,
    NaturalSmile,
}

impl Choice for Expression {
    const ALL: &'static [Self] = &[
        Expression::Neutral,
        Expression::SubtleSmile,
        Expression::NaturalSmile,
    ];

    fn slug(self) -> &'static str {
        match self {
            Expression::Neutral => "neutral",
            Expression::SubtleSmile => "subtle-smile",
            Expression::NaturalSmile => "natural-smile",
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Expression::Neutral => "neutral expression",
            Expression::SubtleSmile => "subtle smile",
            Expression::NaturalSmile => "natural smile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lighting {
    Studio,
    Natural,
    Soft,
}

impl Choice for Lighting {
    const ALL: &'static [Self] = &[Lighting::Studio, Lighting::Natural, Lighting::Soft];

    fn slug(self) -> &'static str {
        match self {
            Lighting::Studio => "studio",
            Lighting::Natural => "natural",
            Lighting::Soft => "soft",
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Lighting::Studio => "studio lighting",
            Lighting::Natural => "natural light",
            Lighting::Soft => "soft lighting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backdrop {
    White,
    Gray,
    Studio,
    BlurredIndoor,
}

impl Choice for Backdrop {
    const ALL: &'static [Self] = &[
        Backdrop::White,
        Backdrop::Gray,
        Backdrop::Studio,
        Backdrop::BlurredIndoor,
    ];

    fn slug(self) -> &'static str {
        match self {
            Backdrop::White => "white",
            Backdrop::Gray => "gray",
            Backdrop::Studio => "studio",
            Backdrop::BlurredIndoor => "blurred-indoor",
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Backdrop::White => "plain white background",
            Backdrop::Gray => "plain gray background",
            Backdrop::Studio => "studio backdrop",
            Backdrop::BlurredIndoor => "blurred indoor setting",
        }
    }
}

/// Attribute names accepted by [`AttributeSelection::set`], in form order.
pub const ATTRIBUTE_NAMES: &[&str] = &[
    "age",
    "gender",
    "skin",
    "length",
    "texture",
    "color",
    "volume",
    "bangs",
    "shot",
    "angle",
    "expression",
    "lighting",
    "background",
];

/// The generation form. Fields are private so the gender/length pairing can
/// only be changed through checked setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelection {
    age: AgeGroup,
    gender: Gender,
    skin_tone: SkinTone,
    hair_length: HairLength,
    texture: HairTexture,
    color: HairColor,
    volume: HairVolume,
    bangs: Bangs,
    shot: ShotType,
    angle: Angle,
    expression: Expression,
    lighting: Lighting,
    background: Backdrop,
}

impl Default for AttributeSelection {
    fn default() -> Self {
        Self {
            age: AgeGroup::Twenties,
            gender: Gender::Female,
            skin_tone: SkinTone::Medium,
            hair_length: HairLength::ShoulderLength,
            texture: HairTexture::Straight,
            color: HairColor::NaturalBlack,
            volume: HairVolume::Natural,
            bangs: Bangs::None,
            shot: ShotType::Headshot,
            angle: Angle::Front,
            expression: Expression::SubtleSmile,
            lighting: Lighting::Studio,
            background: Backdrop::White,
        }
    }
}

impl AttributeSelection {
    pub fn age(&self) -> AgeGroup {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn skin_tone(&self) -> SkinTone {
        self.skin_tone
    }

    pub fn hair_length(&self) -> HairLength {
        self.hair_length
    }

    pub fn texture(&self) -> HairTexture {
        self.texture
    }

    pub fn color(&self) -> HairColor {
        self.color
    }

    pub fn volume(&self) -> HairVolume {
        self.volume
    }

    pub fn bangs(&self) -> Bangs {
        self.bangs
    }

    pub fn shot(&self) -> ShotType {
        self.shot
    }

    pub fn angle(&self) -> Angle {
        self.angle
    }

    pub fn expression(&self) -> Expression {
        self.expression
    }

    pub fn lighting(&self) -> Lighting {
        self.lighting
    }

    pub fn background(&self) -> Backdrop {
        self.background
    }

    /// Switching gender keeps the length when it is still legal, otherwise
    /// falls back to the first option of the new set.
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        if !self.hair_length.is_legal_for(gender) {
            self.hair_length = HairLength::options_for(gender)[0];
        }
        self
    }

    pub fn with_hair_length(mut self, length: HairLength) -> Result<Self, SessionError> {
        if !length.is_legal_for(self.gender) {
            return Err(SessionError::validation(format!(
                "hair length '{}' is not offered for {}",
                length.slug(),
                self.gender.slug()
            )));
        }
        self.hair_length = length;
        Ok(self)
    }

    /// Updates one attribute from CLI slugs, e.g. `set("bangs", "see-through")`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), SessionError> {
        let key = AttributeKey::parse(name).ok_or_else(|| {
            SessionError::validation(format!(
                "unknown attribute '{}'",
                name.trim().to_ascii_lowercase()
            ))
        })?;
        let name = key.name();
        match key {
            AttributeKey::Age => self.age = parse_value(name, value)?,
            AttributeKey::Gender => *self = self.clone().with_gender(parse_value(name, value)?),
            AttributeKey::SkinTone => self.skin_tone = parse_value(name, value)?,
            AttributeKey::HairLength => {
                *self = self.clone().with_hair_length(parse_value(name, value)?)?
            }
            AttributeKey::Texture => self.texture = parse_value(name, value)?,
            AttributeKey::Color => self.color = parse_value(name, value)?,
            AttributeKey::Volume => self.volume = parse_value(name, value)?,
            AttributeKey::Bangs => self.bangs = parse_value(name, value)?,
            AttributeKey::Shot => self.shot = parse_value(name, value)?,
            AttributeKey::Angle => self.angle = parse_value(name, value)?,
            AttributeKey::Expression => self.expression = parse_value(name, value)?,
            AttributeKey::Lighting => self.lighting = parse_value(name, value)?,
            AttributeKey::Background => self.background = parse_value(name, value)?,
        }
        Ok(())
    }

    /// Legal slugs for `name` given the current selection.
    pub fn options(&self, name: &str) -> Vec<&'static str> {
        let Some(key) = AttributeKey::parse(name) else {
            return Vec::new();
        };
        match key {
            AttributeKey::Age => slugs(AgeGroup::ALL),
            AttributeKey::Gender => slugs(Gender::ALL),
            AttributeKey::SkinTone => slugs(SkinTone::ALL),
            AttributeKey::HairLength => slugs(HairLength::options_for(self.gender)),
            AttributeKey::Texture => slugs(HairTexture::ALL),
            AttributeKey::Color => slugs(HairColor::ALL),
            AttributeKey::Volume => slugs(HairVolume::ALL),
            AttributeKey::Bangs => slugs(Bangs::ALL),
            AttributeKey::Shot => slugs(ShotType::ALL),
            AttributeKey::Angle => slugs(Angle::ALL),
            AttributeKey::Expression => slugs(Expression::ALL),
            AttributeKey::Lighting => slugs(Lighting::ALL),
            AttributeKey::Background => slugs(Backdrop::ALL),
        }
    }
}

/// Form field addressed by a CLI attribute name or one of its aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeKey {
    Age,
    Gender,
    SkinTone,
    HairLength,
    Texture,
    Color,
    Volume,
    Bangs,
    Shot,
    Angle,
    Expression,
    Lighting,
    Background,
}

impl AttributeKey {
    fn parse(raw: &str) -> Option<Self> {
        let key = match raw.trim().to_ascii_lowercase().as_str() {
            "age" => AttributeKey::Age,
            "gender" => AttributeKey::Gender,
            "skin" | "skin-tone" => AttributeKey::SkinTone,
            "length" | "style" | "hair-length" => AttributeKey::HairLength,
            "texture" => AttributeKey::Texture,
            "color" => AttributeKey::Color,
            "volume" => AttributeKey::Volume,
            "bangs" => AttributeKey::Bangs,
            "shot" => AttributeKey::Shot,
            "angle" => AttributeKey::Angle,
            "expression" => AttributeKey::Expression,
            "lighting" => AttributeKey::Lighting,
            "background" => AttributeKey::Background,
            _ => return None,
        };
        Some(key)
    }

    /// Canonical name, as listed in [`ATTRIBUTE_NAMES`].
    fn name(self) -> &'static str {
        match self {
            AttributeKey::Age => "age",
            AttributeKey::Gender => "gender",
            AttributeKey::SkinTone => "skin",
            AttributeKey::HairLength => "length",
            AttributeKey::Texture => "texture",
            AttributeKey::Color => "color",
            AttributeKey::Volume => "volume",
            AttributeKey::Bangs => "bangs",
            AttributeKey::Shot => "shot",
            AttributeKey::Angle => "angle",
            AttributeKey::Expression => "expression",
            AttributeKey::Lighting => "lighting",
            AttributeKey::Background => "background",
        }
    }
}

fn parse_value<T: Choice>(name: &str, raw: &str) -> Result<T, SessionError> {
    T::parse(raw).ok_or_else(|| {
        SessionError::validation(format!(
            "'{}' is not a valid {name}; expected one of: {}",
            raw.trim(),
            slugs(T::ALL).join(", ")
        ))
    })
}

fn slugs<T: Choice>(values: &[T]) -> Vec<&'static str> {
    values.iter().map(|value| value.slug()).collect()
}
