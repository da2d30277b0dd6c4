use super::command_registry::{CommandSpec, IMAGE_SLOTS, NO_ARG_COMMANDS, SETTING_COMMANDS};
use crate::credentials::Credential;
use crate::providers::ProviderId;
use crate::requests::{Resolution, ScaleFactor, MAX_IMAGE_COUNT};
use crate::screens::{Action, Mode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Main,
    /// Zero-based sample slot (`sample1` is 0).
    Sample(usize),
    Input,
}

impl ImageSlot {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "main" => Some(ImageSlot::Main),
            "sample1" | "sample" => Some(ImageSlot::Sample(0)),
            "sample2" => Some(ImageSlot::Sample(1)),
            "sample3" => Some(ImageSlot::Sample(2)),
            "input" => Some(ImageSlot::Input),
            _ => None,
        }
    }

    pub fn label(self) -> String {
        match self {
            ImageSlot::Main => "main".to_string(),
            ImageSlot::Sample(index) => format!("sample{}", index + 1),
            ImageSlot::Input => "input".to_string(),
        }
    }
}

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Noop,
    Login {
        provider: ProviderId,
        credential: Credential,
    },
    Navigate(Action),
    Set {
        name: String,
        value: String,
    },
    Options,
    Count(u8),
    Resolution(Resolution),
    Scale(ScaleFactor),
    Image {
        slot: ImageSlot,
        path: String,
    },
    Clear,
    Submit,
    Save {
        dir: Option<String>,
    },
    History,
    Status,
    Providers,
    Help,
    Quit,
    /// A known command with unusable arguments.
    Invalid {
        command: String,
        message: String,
    },
    Unknown {
        command: String,
        arg: String,
    },
    /// Free text that is not a command.
    Text(String),
}

fn find_action(command: &str, specs: &[CommandSpec]) -> Option<&'static str> {
    specs
        .iter()
        .find(|spec| spec.command == command)
        .map(|spec| spec.action)
}

fn split_args(arg: &str) -> Vec<String> {
    if arg.trim().is_empty() {
        return Vec::new();
    }
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect(),
        Err(_) => arg
            .split_whitespace()
            .map(str::to_string)
            .filter(|value| !value.is_empty())
            .collect(),
    }
}

fn invalid(command: &str, message: impl Into<String>) -> Command {
    Command::Invalid {
        command: command.to_string(),
        message: message.into(),
    }
}

fn parse_no_arg(action: &str) -> Command {
    match action {
        "logout" => Command::Navigate(Action::Logout),
        "back" => Command::Navigate(Action::Back),
        "options" => Command::Options,
        "clear" => Command::Clear,
        "submit" => Command::Submit,
        "history" => Command::History,
        "status" => Command::Status,
        "providers" => Command::Providers,
        "help" => Command::Help,
        _ => Command::Quit,
    }
}

fn parse_setting(command: &str, action: &str, arg: &str) -> Command {
    match action {
        "set_count" => match arg.trim().parse::<u8>() {
            Ok(count) if (1..=MAX_IMAGE_COUNT).contains(&count) => Command::Count(count),
            _ => invalid(command, format!("expected a number from 1 to {MAX_IMAGE_COUNT}")),
        },
        "set_resolution" => Resolution::parse(arg)
            .map(Command::Resolution)
            .unwrap_or_else(|| invalid(command, "expected 2k or 4k")),
        _ => ScaleFactor::parse(arg)
            .map(Command::Scale)
            .unwrap_or_else(|| invalid(command, "expected 2x or 4x")),
    }
}

fn parse_login(arg: &str) -> Command {
    let mut parts = arg.trim().splitn(2, char::is_whitespace);
    let provider = parts.next().unwrap_or_default();
    let Some(provider) = ProviderId::parse(provider) else {
        return invalid("login", "expected google or replicate");
    };
    let credential = Credential::new(parts.next().unwrap_or_default());
    Command::Login {
        provider,
        credential,
    }
}

fn parse_mode(arg: &str) -> Command {
    match Mode::parse(arg) {
        Some(Mode::EditMenu) => Command::Navigate(Action::OpenEditMenu),
        Some(mode) => Command::Navigate(Action::SelectMode(mode)),
        None => invalid(
            "mode",
            "expected generation, edit, outfit, face, background, color or upscale",
        ),
    }
}

fn parse_set(arg: &str) -> Command {
    let parts = split_args(arg);
    match parts.as_slice() {
        [name, value] => Command::Set {
            name: name.to_ascii_lowercase(),
            value: value.clone(),
        },
        _ => invalid("set", "usage: /set <attribute> <value>"),
    }
}

fn parse_image(arg: &str) -> Command {
    let mut parts = split_args(arg).into_iter();
    let Some(slot) = parts.next().as_deref().and_then(ImageSlot::parse) else {
        return invalid(
            "image",
            format!("expected a slot: {}", IMAGE_SLOTS.join(", ")),
        );
    };
    let path = parts.collect::<Vec<_>>().join(" ");
    if path.is_empty() {
        return invalid("image", "expected a file path");
    }
    Command::Image { slot, path }
}

pub fn parse_command(text: &str) -> Command {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return Command::Noop;
    }

    let Some(slash_tail) = raw_trimmed.strip_prefix('/') else {
        return Command::Text(raw_trimmed.to_string());
    };
    let command_len = slash_tail
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .count();
    if command_len == 0 {
        return Command::Text(raw_trimmed.to_string());
    }
    let command = slash_tail[..command_len].to_ascii_lowercase();
    let arg = slash_tail[command_len..].trim();

    if let Some(action) = find_action(&command, NO_ARG_COMMANDS) {
        return parse_no_arg(action);
    }
    if let Some(action) = find_action(&command, SETTING_COMMANDS) {
        return parse_setting(&command, action, arg);
    }

    match command.as_str() {
        "login" => parse_login(arg),
        "mode" => parse_mode(arg),
        "set" => parse_set(arg),
        "image" => parse_image(arg),
        "save" => {
            let dir = split_args(arg).join(" ");
            Command::Save {
                dir: (!dir.is_empty()).then_some(dir),
            }
        }
        _ => Command::Unknown {
            command,
            arg: arg.to_string(),
        },
    }
}
