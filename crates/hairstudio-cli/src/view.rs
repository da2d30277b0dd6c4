use hairstudio_contracts::navigation::reachable_screens;
use hairstudio_contracts::providers::{CapabilityTable, ProviderId};
use hairstudio_contracts::requests::GenerationResult;
use hairstudio_contracts::screens::{Action, Mode, ScreenId};
use hairstudio_contracts::session::Transition;

use crate::output::describe_image;

/// The command a user types to trigger `action`.
pub fn action_command(action: Action) -> String {
    match action {
        Action::SelectMode(Mode::EditMenu) | Action::OpenEditMenu => "/mode edit".to_string(),
        Action::SelectMode(mode) => format!("/mode {}", mode.slug()),
        Action::Back => "/back".to_string(),
        Action::Logout => "/logout".to_string(),
    }
}

pub fn badge(provider: Option<ProviderId>) -> String {
    match provider {
        Some(provider) => format!("[{}]", provider.label()),
        None => "[signed out]".to_string(),
    }
}

/// Lines shown after a transition: where the user is and what they can do next.
pub fn render_screen(transition: &Transition, actions: &[Action]) -> Vec<String> {
    let location = if transition.changed_screen() {
        format!("{} -> {}", transition.previous, transition.screen)
    } else {
        transition.screen.to_string()
    };
    let mut lines = vec![format!("{} {location}", badge(transition.provider))];
    if transition.screen == ScreenId::Login {
        lines.push("Sign in with /login google <key> or /login replicate <token>.".to_string());
        return lines;
    }
    if !actions.is_empty() {
        let commands = actions
            .iter()
            .map(|action| action_command(*action))
            .collect::<Vec<_>>();
        lines.push(format!("Next: {}", commands.join("  ")));
    }
    if transition.screen.is_form() {
        lines.push("Fill the form, then /submit.".to_string());
    }
    lines
}

/// One line per provider in table order, with the screens it can reach.
pub fn render_providers(table: &CapabilityTable, registered: &[ProviderId]) -> Vec<String> {
    table
        .list()
        .map(|spec| {
            let screens = reachable_screens(table, spec.id)
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            let status = if registered.contains(&spec.id) {
                ""
            } else {
                " (no adapter)"
            };
            format!("  {}{status}: {}", spec.id.label(), screens.join(", "))
        })
        .collect()
}

pub fn render_result(result: &GenerationResult) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} returned {} image(s).",
        result.provider.label(),
        result.operation.slug(),
        result.images.len()
    )];
    for (index, image) in result.images.iter().enumerate() {
        lines.push(format!("  {}. {}", index + 1, describe_image(image)));
    }
    for warning in &result.warnings {
        lines.push(format!("  warning: {warning}"));
    }
    lines
}
