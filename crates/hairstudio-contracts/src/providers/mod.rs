use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::screens::{EditSubtype, Mode, ScreenId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    Google,
    Replicate,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::Google, ProviderId::Replicate];

    pub fn name(self) -> &'static str {
        match self {
            ProviderId::Google => "google",
            ProviderId::Replicate => "replicate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProviderId::Google => "Google Gemini",
            ProviderId::Replicate => "Replicate Seedream",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "google" | "gemini" => Some(ProviderId::Google),
            "replicate" | "seedream" => Some(ProviderId::Replicate),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Provider-side operation a form submission turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "operation", content = "subtype")]
pub enum Operation {
    Generate,
    Edit(EditSubtype),
    Upscale,
}

impl Operation {
    pub fn for_screen(screen: ScreenId) -> Option<Self> {
        match screen {
            ScreenId::GenerationForm => Some(Operation::Generate),
            ScreenId::EditForm(subtype) => Some(Operation::Edit(subtype)),
            ScreenId::UpscaleForm => Some(Operation::Upscale),
            ScreenId::Login | ScreenId::ProviderHome | ScreenId::EditMenu => None,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Operation::Generate => "generate",
            Operation::Edit(subtype) => subtype.slug(),
            Operation::Upscale => "upscale",
        }
    }
}

/// What a provider hands back for a successful call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Bytes,
    Url,
}

/// Request/response shape a provider accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadShape {
    pub max_reference_images: usize,
    pub max_outputs: u8,
    pub output: OutputKind,
    pub edit_strength: Option<f64>,
    pub upscale_strength: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSpec {
    pub id: ProviderId,
    pub home_modes: Vec<Mode>,
    pub edit_menu_modes: Vec<Mode>,
    pub payload: PayloadShape,
}

impl ProviderSpec {
    pub fn offers_on_home(&self, mode: Mode) -> bool {
        self.home_modes.contains(&mode)
    }

    pub fn offers_on_edit_menu(&self, mode: Mode) -> bool {
        self.edit_menu_modes.contains(&mode)
    }

    pub fn has_edit_menu(&self) -> bool {
        self.offers_on_home(Mode::EditMenu)
    }

    /// A screen is reachable when the mode that opens it is offered somewhere.
    pub fn reaches(&self, screen: ScreenId) -> bool {
        match screen.mode() {
            None => true,
            Some(mode) => self.offers_on_home(mode) || self.offers_on_edit_menu(mode),
        }
    }

    pub fn supports(&self, operation: Operation) -> bool {
        let mode = match operation {
            Operation::Generate => Mode::Generation,
            Operation::Edit(subtype) => Mode::Edit(subtype),
            Operation::Upscale => Mode::Upscale,
        };
        self.offers_on_home(mode) || self.offers_on_edit_menu(mode)
    }

    /// Modes selectable from `screen`; empty for screens without a menu.
    pub fn modes_on(&self, screen: ScreenId) -> &[Mode] {
        match screen {
            ScreenId::ProviderHome => &self.home_modes,
            ScreenId::EditMenu if self.has_edit_menu() => &self.edit_menu_modes,
            _ => &[],
        }
    }
}

/// Static mapping from provider identity to what it can do. Consulted by the
/// navigation state machine and the orchestrator; no screen handler branches
/// on provider identity directly.
#[derive(Debug, Clone)]
pub struct CapabilityTable {
    providers: IndexMap<ProviderId, ProviderSpec>,
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CapabilityTable {
    pub fn new(providers: Option<IndexMap<ProviderId, ProviderSpec>>) -> Self {
        Self {
            providers: providers.unwrap_or_else(default_providers),
        }
    }

    pub fn get(&self, provider: ProviderId) -> Option<&ProviderSpec> {
        self.providers.get(&provider)
    }

    pub fn list(&self) -> impl Iterator<Item = &ProviderSpec> {
        self.providers.values()
    }
}

fn edit_modes() -> Vec<Mode> {
    EditSubtype::ALL.into_iter().map(Mode::Edit).collect()
}

fn default_providers() -> IndexMap<ProviderId, ProviderSpec> {
    let mut map = IndexMap::new();

    let mut google_home = vec![Mode::Generation];
    google_home.extend(edit_modes());
    map.insert(
        ProviderId::Google,
        ProviderSpec {
            id: ProviderId::Google,
            home_modes: google_home,
            edit_menu_modes: Vec::new(),
            payload: PayloadShape {
                max_reference_images: 4,
                max_outputs: 1,
                output: OutputKind::Bytes,
                edit_strength: None,
                upscale_strength: None,
            },
        },
    );

    map.insert(
        ProviderId::Replicate,
        ProviderSpec {
            id: ProviderId::Replicate,
            home_modes: vec![Mode::Generation, Mode::EditMenu, Mode::Upscale],
            edit_menu_modes: edit_modes(),
            payload: PayloadShape {
                max_reference_images: 1,
                max_outputs: 4,
                output: OutputKind::Url,
                edit_strength: Some(0.8),
                upscale_strength: Some(0.3),
            },
        },
    );

    map
}
