use std::fmt;

use serde::Serialize;

/// One of the four constrained edits. Each changes exactly one visual
/// attribute of the main image and preserves all others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditSubtype {
    Outfit,
    Face,
    Background,
    Color,
}

impl EditSubtype {
    pub const ALL: [EditSubtype; 4] = [
        EditSubtype::Outfit,
        EditSubtype::Face,
        EditSubtype::Background,
        EditSubtype::Color,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            EditSubtype::Outfit => "outfit",
            EditSubtype::Face => "face",
            EditSubtype::Background => "background",
            EditSubtype::Color => "color",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            EditSubtype::Outfit => "Outfit change",
            EditSubtype::Face => "Face change",
            EditSubtype::Background => "Background change",
            EditSubtype::Color => "Hair color change",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|subtype| subtype.slug() == normalized)
    }
}

/// The active view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "screen", content = "subtype")]
pub enum ScreenId {
    Login,
    ProviderHome,
    GenerationForm,
    EditForm(EditSubtype),
    EditMenu,
    UpscaleForm,
}

impl ScreenId {
    /// The mode that opens this screen, if any. Login and ProviderHome are not
    /// reached through `selectMode`.
    pub fn mode(self) -> Option<Mode> {
        match self {
            ScreenId::Login | ScreenId::ProviderHome => None,
            ScreenId::GenerationForm => Some(Mode::Generation),
            ScreenId::EditForm(subtype) => Some(Mode::Edit(subtype)),
            ScreenId::EditMenu => Some(Mode::EditMenu),
            ScreenId::UpscaleForm => Some(Mode::Upscale),
        }
    }

    pub fn is_form(self) -> bool {
        matches!(
            self,
            ScreenId::GenerationForm | ScreenId::EditForm(_) | ScreenId::UpscaleForm
        )
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenId::Login => f.write_str("login"),
            ScreenId::ProviderHome => f.write_str("provider home"),
            ScreenId::GenerationForm => f.write_str("generation form"),
            ScreenId::EditForm(subtype) => write!(f, "{} edit form", subtype.slug()),
            ScreenId::EditMenu => f.write_str("edit menu"),
            ScreenId::UpscaleForm => f.write_str("upscale form"),
        }
    }
}

/// Argument of `selectMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "subtype")]
pub enum Mode {
    Generation,
    Edit(EditSubtype),
    EditMenu,
    Upscale,
}

impl Mode {
    pub fn screen(self) -> ScreenId {
        match self {
            Mode::Generation => ScreenId::GenerationForm,
            Mode::Edit(subtype) => ScreenId::EditForm(subtype),
            Mode::EditMenu => ScreenId::EditMenu,
            Mode::Upscale => ScreenId::UpscaleForm,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Mode::Generation => "generation",
            Mode::Edit(subtype) => subtype.slug(),
            Mode::EditMenu => "edit",
            Mode::Upscale => "upscale",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "generation" | "generate" => Some(Mode::Generation),
            "edit" | "edit_menu" | "edit-menu" => Some(Mode::EditMenu),
            "upscale" => Some(Mode::Upscale),
            other => EditSubtype::parse(other).map(Mode::Edit),
        }
    }
}

/// Navigation vocabulary. Authentication is handled by the credential store,
/// not by an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SelectMode(Mode),
    Back,
    Logout,
    OpenEditMenu,
}

impl Action {
    /// All actions, used to enumerate the navigation graph.
    pub fn all() -> Vec<Action> {
        let mut actions = vec![
            Action::Back,
            Action::Logout,
            Action::OpenEditMenu,
            Action::SelectMode(Mode::Generation),
            Action::SelectMode(Mode::EditMenu),
            Action::SelectMode(Mode::Upscale),
        ];
        actions.extend(
            EditSubtype::ALL
                .into_iter()
                .map(|subtype| Action::SelectMode(Mode::Edit(subtype))),
        );
        actions
    }

    pub fn describe(self) -> String {
        match self {
            Action::SelectMode(mode) => format!("select {}", mode.slug()),
            Action::Back => "back".to_string(),
            Action::Logout => "logout".to_string(),
            Action::OpenEditMenu => "open edit menu".to_string(),
        }
    }
}
