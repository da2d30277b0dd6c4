//! Screen transitions as a pure function of (screen, provider, action).
//!
//! Provider differences come only from the [`CapabilityTable`]: a mode is
//! selectable on a menu screen iff the provider's [`ProviderSpec`] lists it there, and a
//! form's `back` target is whichever menu offered its mode.

use crate::error::SessionError;
use crate::providers::{CapabilityTable, ProviderId, ProviderSpec};
use crate::screens::{Action, Mode, ScreenId};

pub fn next_screen(
    table: &CapabilityTable,
    screen: ScreenId,
    provider: Option<ProviderId>,
    action: Action,
) -> Result<ScreenId, SessionError> {
    if action == Action::Logout {
        return Ok(ScreenId::Login);
    }
    let reject = || SessionError::unsupported(provider, screen, action.describe());

    let Some(spec) = provider.and_then(|provider| table.get(provider)) else {
        return Err(reject());
    };
    if screen == ScreenId::Login || !spec.reaches(screen) {
        return Err(reject());
    }

    match action {
        Action::Logout => Ok(ScreenId::Login),
        Action::OpenEditMenu => select(spec, screen, Mode::EditMenu).ok_or_else(reject),
        Action::SelectMode(mode) => select(spec, screen, mode).ok_or_else(reject),
        Action::Back => back_target(spec, screen).ok_or_else(reject),
    }
}

fn select(spec: &ProviderSpec, screen: ScreenId, mode: Mode) -> Option<ScreenId> {
    spec.modes_on(screen).contains(&mode).then_some(mode.screen())
}

fn back_target(spec: &ProviderSpec, screen: ScreenId) -> Option<ScreenId> {
    let mode = screen.mode()?;
    if spec.offers_on_edit_menu(mode) {
        return Some(ScreenId::EditMenu);
    }
    spec.offers_on_home(mode).then_some(ScreenId::ProviderHome)
}

/// Screens reachable for `provider` starting from ProviderHome.
pub fn reachable_screens(table: &CapabilityTable, provider: ProviderId) -> Vec<ScreenId> {
    let mut seen = vec![ScreenId::ProviderHome];
    let mut cursor = 0;
    while cursor < seen.len() {
        let screen = seen[cursor];
        cursor += 1;
        for action in Action::all() {
            if action == Action::Logout {
                continue;
            }
            if let Ok(next) = next_screen(table, screen, Some(provider), action) {
                if !seen.contains(&next) {
                    seen.push(next);
                }
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::EditSubtype;

    fn all_screens() -> Vec<ScreenId> {
        let mut screens = vec![
            ScreenId::Login,
            ScreenId::ProviderHome,
            ScreenId::GenerationForm,
            ScreenId::EditMenu,
            ScreenId::UpscaleForm,
        ];
        screens.extend(EditSubtype::ALL.into_iter().map(ScreenId::EditForm));
        screens
    }

    #[test]
    fn replicate_reaches_face_edit_through_menu() {
        let table = CapabilityTable::default();
        let provider = Some(ProviderId::Replicate);
        let menu = next_screen(
            &table,
            ScreenId::ProviderHome,
            provider,
            Action::SelectMode(Mode::EditMenu),
        );
        assert_eq!(menu, Ok(ScreenId::EditMenu));
        let face = next_screen(
            &table,
            ScreenId::EditMenu,
            provider,
            Action::SelectMode(Mode::Edit(EditSubtype::Face)),
        );
        assert_eq!(face, Ok(ScreenId::EditForm(EditSubtype::Face)));
        let back = next_screen(
            &table,
            ScreenId::EditForm(EditSubtype::Face),
            provider,
            Action::Back,
        );
        assert_eq!(back, Ok(ScreenId::EditMenu));
        assert_eq!(
            next_screen(&table, ScreenId::EditMenu, provider, Action::Back),
            Ok(ScreenId::ProviderHome)
        );
    }

    #[test]
    fn google_upscale_fails_closed() {
        let table = CapabilityTable::default();
        let result = next_screen(
            &table,
            ScreenId::ProviderHome,
            Some(ProviderId::Google),
            Action::SelectMode(Mode::Upscale),
        );
        assert!(matches!(
            result,
            Err(SessionError::UnsupportedAction {
                provider: Some(ProviderId::Google),
                screen: ScreenId::ProviderHome,
                ..
            })
        ));
    }

    #[test]
    fn google_edits_open_directly_and_return_home() {
        let table = CapabilityTable::default();
        let provider = Some(ProviderId::Google);
        for subtype in EditSubtype::ALL {
            let form = next_screen(
                &table,
                ScreenId::ProviderHome,
                provider,
                Action::SelectMode(Mode::Edit(subtype)),
            );
            assert_eq!(form, Ok(ScreenId::EditForm(subtype)));
            assert_eq!(
                next_screen(&table, ScreenId::EditForm(subtype), provider, Action::Back),
                Ok(ScreenId::ProviderHome)
            );
        }
        assert!(next_screen(&table, ScreenId::ProviderHome, provider, Action::OpenEditMenu).is_err());
    }

    #[test]
    fn replicate_edits_are_not_on_home() {
        let table = CapabilityTable::default();
        let result = next_screen(
            &table,
            ScreenId::ProviderHome,
            Some(ProviderId::Replicate),
            Action::SelectMode(Mode::Edit(EditSubtype::Outfit)),
        );
        assert!(matches!(result, Err(SessionError::UnsupportedAction { .. })));
    }

    #[test]
    fn logout_always_lands_on_login() {
        let table = CapabilityTable::default();
        for screen in all_screens() {
            for provider in [None, Some(ProviderId::Google), Some(ProviderId::Replicate)] {
                assert_eq!(
                    next_screen(&table, screen, provider, Action::Logout),
                    Ok(ScreenId::Login)
                );
            }
        }
    }

    #[test]
    fn unauthenticated_session_cannot_navigate() {
        let table = CapabilityTable::default();
        for action in Action::all() {
            if action == Action::Logout {
                continue;
            }
            assert!(next_screen(&table, ScreenId::Login, None, action).is_err());
        }
    }

    #[test]
    fn every_transition_stays_inside_the_provider_reachable_set() {
        let table = CapabilityTable::default();
        for provider in ProviderId::ALL {
            let reachable = reachable_screens(&table, provider);
            for screen in all_screens() {
                for action in Action::all() {
                    match next_screen(&table, screen, Some(provider), action) {
                        Ok(next) => {
                            assert!(
                                next == ScreenId::Login || reachable.contains(&next),
                                "{provider} {screen} {action:?} -> {next}"
                            );
                            assert!(
                                reachable.contains(&screen) || action == Action::Logout,
                                "{provider}: transition out of unreachable {screen}"
                            );
                        }
                        Err(err) => {
                            assert!(matches!(err, SessionError::UnsupportedAction { .. }))
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn reachable_sets_differ_by_provider() {
        let table = CapabilityTable::default();
        let google = reachable_screens(&table, ProviderId::Google);
        let replicate = reachable_screens(&table, ProviderId::Replicate);
        assert_eq!(google.len(), 6);
        assert_eq!(replicate.len(), 8);
        assert!(!google.contains(&ScreenId::UpscaleForm));
        assert!(!google.contains(&ScreenId::EditMenu));
        assert!(replicate.contains(&ScreenId::UpscaleForm));
        assert!(replicate.contains(&ScreenId::EditForm(EditSubtype::Color)));
    }

    #[test]
    fn forms_reject_mode_selection_and_home_rejects_back() {
        let table = CapabilityTable::default();
        assert!(next_screen(
            &table,
            ScreenId::GenerationForm,
            Some(ProviderId::Google),
            Action::SelectMode(Mode::Generation)
        )
        .is_err());
        assert!(next_screen(
            &table,
            ScreenId::ProviderHome,
            Some(ProviderId::Replicate),
            Action::Back
        )
        .is_err());
    }
}
