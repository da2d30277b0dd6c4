use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use hairstudio_contracts::credentials::Credential;
use hairstudio_contracts::error::SessionError;
use hairstudio_contracts::events::{EventLog, OutputRecord, SessionEvent};
use hairstudio_contracts::navigation::next_screen;
use hairstudio_contracts::prompts::{compile_edit_prompt, compile_generation_prompt, UPSCALE_PROMPT};
use hairstudio_contracts::providers::{CapabilityTable, Operation, ProviderId, ProviderSpec};
use hairstudio_contracts::requests::{
    GeneratedImage, GenerationRequest, GenerationResult, ProviderOptions, ReplicateOptions,
    Submission,
};
use hairstudio_contracts::screens::{Action, Mode};
use hairstudio_contracts::session::{Session, Transition};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::gateway::ProviderGateway;
use crate::http::push_unique_warning;

const REPLICATE_ASPECT_RATIO: &str = "1:1";

/// Mediates every session mutation and every provider call. The only place
/// network I/O is started.
pub struct SessionOrchestrator {
    session: Session,
    table: CapabilityTable,
    gateway: ProviderGateway,
    events: Option<EventLog>,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the call returns, including on error.
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, SessionError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SessionError::Busy)?;
        Ok(Self(Arc::clone(flag)))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SessionOrchestrator {
    pub fn new(table: CapabilityTable, gateway: ProviderGateway) -> Self {
        Self {
            session: Session::new(),
            table,
            gateway,
            events: None,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self.emit(SessionEvent::SessionStarted {
            screen: self.session.screen(),
        });
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn table(&self) -> &CapabilityTable {
        &self.table
    }

    pub fn gateway(&self) -> &ProviderGateway {
        &self.gateway
    }

    /// Shared flag that reads `true` while a provider call is outstanding.
    #[cfg(test)]
    fn busy_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.in_flight)
    }

    /// Actions legal on the current screen, in capability table order.
    pub fn available_actions(&self) -> Vec<Action> {
        let Some(spec) = self.session.provider().and_then(|id| self.table.get(id)) else {
            return Vec::new();
        };
        let screen = self.session.screen();
        let mut actions = spec
            .modes_on(screen)
            .iter()
            .map(|mode| match mode {
                Mode::EditMenu => Action::OpenEditMenu,
                other => Action::SelectMode(*other),
            })
            .collect::<Vec<_>>();
        if next_screen(&self.table, screen, Some(spec.id), Action::Back).is_ok() {
            actions.push(Action::Back);
        }
        actions.push(Action::Logout);
        actions
    }

    pub fn login(
        &mut self,
        provider: ProviderId,
        credential: Credential,
    ) -> Result<Transition, SessionError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        let started = Instant::now();
        match self.session.login(provider, credential, &self.gateway) {
            Ok(transition) => {
                info!(
                    provider = provider.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "login succeeded"
                );
                self.emit(SessionEvent::LoginSucceeded { provider });
                Ok(transition)
            }
            Err(err) => {
                warn!(provider = provider.name(), kind = err.kind(), "login failed: {err}");
                self.emit(SessionEvent::LoginFailed {
                    provider,
                    kind: err.kind(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    pub fn logout(&mut self) -> Transition {
        let transition = self.session.logout();
        info!(screen = %transition.previous, "logged out");
        self.emit(SessionEvent::LoggedOut {
            provider: transition.provider,
            from: transition.previous,
        });
        transition
    }

    pub fn dispatch(&mut self, action: Action) -> Result<Transition, SessionError> {
        if action == Action::Logout {
            return Ok(self.logout());
        }
        match self.session.apply(&self.table, action) {
            Ok(transition) => {
                info!(from = %transition.previous, to = %transition.screen, "screen changed");
                self.emit(SessionEvent::ScreenChanged {
                    from: transition.previous,
                    to: transition.screen,
                });
                Ok(transition)
            }
            Err(err) => {
                warn!(action = %action.describe(), "action rejected: {err}");
                self.emit(SessionEvent::ActionRejected {
                    action: action.describe(),
                    screen: self.session.screen(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Validates the form, calls the provider once, and appends the result to
    /// history. The screen does not change whatever the outcome.
    pub fn submit(&mut self, submission: Submission) -> Result<Transition, SessionError> {
        let screen = self.session.screen();
        let provider = self.session.provider();
        let rejected = || SessionError::unsupported(provider, screen, "submit");

        let spec = provider
            .and_then(|id| self.table.get(id))
            .ok_or_else(rejected)?;
        let operation = Operation::for_screen(screen)
            .filter(|operation| spec.supports(*operation))
            .ok_or_else(rejected)?;
        let credential = self.session.credential().cloned().ok_or_else(rejected)?;

        let (request, warnings) = build_request(spec, operation, submission)?;
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let provider = spec.id;
        info!(
            provider = provider.name(),
            operation = operation.slug(),
            references = request.reference_images.len(),
            "generation started"
        );
        self.emit(SessionEvent::GenerationStarted {
            provider,
            operation,
            references: request.reference_images.len(),
        });

        let started = Instant::now();
        let outcome = self.gateway.generate(provider, &credential, &request);
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let output = match outcome {
            Ok(output) => output,
            Err(err) => {
                warn!(provider = provider.name(), elapsed_ms, "generation failed: {err}");
                self.emit(SessionEvent::GenerationFailed {
                    provider,
                    operation,
                    elapsed_ms,
                    message: err.to_string(),
                });
                return Err(err.into());
            }
        };

        debug!(
            provider = provider.name(),
            request = %serde_json::Value::Object(output.provider_request.clone()),
            "provider request"
        );
        let mut all_warnings = warnings;
        for warning in output.warnings {
            push_unique_warning(&mut all_warnings, warning);
        }
        let result = GenerationResult {
            id: uuid::Uuid::new_v4().to_string(),
            provider,
            operation,
            prompt: request.prompt,
            images: output.images,
            warnings: all_warnings,
            created_at: Utc::now(),
        };
        info!(
            provider = provider.name(),
            images = result.images.len(),
            elapsed_ms,
            "generation succeeded"
        );
        self.emit(SessionEvent::GenerationSucceeded {
            provider,
            operation,
            result_id: result.id.clone(),
            elapsed_ms,
            outputs: result.images.iter().map(output_record).collect(),
            warnings: result.warnings.clone(),
            request: output.provider_request,
        });
        Ok(self.session.record(result))
    }

    fn emit(&self, event: SessionEvent) {
        let Some(events) = &self.events else {
            return;
        };
        if let Err(err) = events.record(&event) {
            warn!(session_id = events.session_id(), "failed to write session event: {err:#}");
        }
    }
}

/// Turns a form into a provider request. Pure; performs no I/O.
fn build_request(
    spec: &ProviderSpec,
    operation: Operation,
    submission: Submission,
) -> Result<(GenerationRequest, Vec<String>), SessionError> {
    let mut warnings = Vec::new();
    let shape = &spec.payload;
    let (prompt, mut references, count, size) = match (operation, submission) {
        (Operation::Generate, Submission::Generation { attributes, settings }) => {
            let count = settings.image_count().min(shape.max_outputs.max(1));
            if count < settings.image_count() {
                push_unique_warning(
                    &mut warnings,
                    format!(
                        "{} returns {} image per request; requested {}.",
                        spec.id.label(),
                        count,
                        settings.image_count()
                    ),
                );
            }
            (
                compile_generation_prompt(&attributes),
                Vec::new(),
                count,
                Some(settings.resolution),
            )
        }
        (Operation::Edit(subtype), Submission::Edit { images }) => (
            compile_edit_prompt(subtype).to_string(),
            images.into_references()?,
            1,
            None,
        ),
        (Operation::Upscale, Submission::Upscale { image, scale }) => {
            let image = image.ok_or_else(|| SessionError::validation("input image required"))?;
            (UPSCALE_PROMPT.to_string(), vec![image], 1, Some(scale.resolution()))
        }
        (operation, submission) => {
            return Err(SessionError::validation(format!(
                "{} form cannot be submitted for {}",
                submission.kind(),
                operation.slug()
            )))
        }
    };

    if references.len() > shape.max_reference_images {
        let dropped = references.len() - shape.max_reference_images;
        references.truncate(shape.max_reference_images);
        push_unique_warning(
            &mut warnings,
            format!(
                "{} accepts {} reference image(s); dropped {dropped} sample(s).",
                spec.id.label(),
                shape.max_reference_images
            ),
        );
    }

    let options = match spec.id {
        ProviderId::Google => ProviderOptions::Google,
        ProviderId::Replicate => ProviderOptions::Replicate(ReplicateOptions {
            num_outputs: count,
            size,
            aspect_ratio: (operation == Operation::Generate).then_some(REPLICATE_ASPECT_RATIO),
            prompt_strength: match operation {
                Operation::Generate => None,
                Operation::Edit(_) => shape.edit_strength,
                Operation::Upscale => shape.upscale_strength,
            },
        }),
    };

    Ok((
        GenerationRequest {
            operation,
            prompt,
            reference_images: references,
            options,
        },
        warnings,
    ))
}

/// Event-log identity of one output: a digest for bytes, the link otherwise.
fn output_record(image: &GeneratedImage) -> OutputRecord {
    match image {
        GeneratedImage::Bytes { data, mime_type } => OutputRecord::Bytes {
            sha256: hex::encode(Sha256::digest(data)),
            mime_type: mime_type.clone(),
            bytes: data.len(),
        },
        GeneratedImage::Url(url) if url.starts_with("data:") => OutputRecord::Inline {
            sha256: hex::encode(Sha256::digest(url.as_bytes())),
        },
        GeneratedImage::Url(url) => OutputRecord::Link { url: url.clone() },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use hairstudio_contracts::error::ProviderError;
    use hairstudio_contracts::prompts::AttributeSelection;
    use hairstudio_contracts::requests::{
        sanitize_payload, EditImages, GenerationSettings, ReferenceImage, Resolution, ScaleFactor,
    };
    use hairstudio_contracts::screens::{EditSubtype, ScreenId};
    use serde_json::{json, Value};

    use super::*;
    use crate::gateway::{ProviderAdapter, ProviderOutput};

    #[derive(Clone, Default)]
    struct Calls {
        verify: Arc<AtomicUsize>,
        generate: Arc<AtomicUsize>,
        last_request: Arc<Mutex<Option<GenerationRequest>>>,
    }

    struct FakeAdapter {
        provider: ProviderId,
        calls: Calls,
        fail_with: Option<ProviderError>,
    }

    impl ProviderAdapter for FakeAdapter {
        fn id(&self) -> ProviderId {
            self.provider
        }

        fn verify(&self, credential: &Credential) -> Result<bool, ProviderError> {
            self.calls.verify.fetch_add(1, Ordering::SeqCst);
            Ok(credential.expose() == "valid-key")
        }

        fn generate(
            &self,
            credential: &Credential,
            request: &GenerationRequest,
        ) -> Result<ProviderOutput, ProviderError> {
            self.calls.generate.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut last) = self.calls.last_request.lock() {
                *last = Some(request.clone());
            }
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            let image = match self.provider {
                ProviderId::Google => GeneratedImage::Bytes {
                    data: vec![1, 2, 3],
                    mime_type: "image/png".to_string(),
                },
                ProviderId::Replicate => GeneratedImage::Url("https://cdn.example/out.png".to_string()),
            };
            let payload = json!({
                "prompt": request.prompt,
                "key": credential.expose(),
                "image": "data:image/png;base64,AAAA",
            });
            Ok(ProviderOutput {
                images: vec![image],
                warnings: Vec::new(),
                provider_request: crate::http::map_object(json!({
                    "endpoint": "https://fake.example/generate",
                    "payload": sanitize_payload(&payload),
                })),
            })
        }
    }

    fn orchestrator(fail_with: Option<ProviderError>) -> (SessionOrchestrator, Calls) {
        let calls = Calls::default();
        let mut gateway = ProviderGateway::new();
        for provider in ProviderId::ALL {
            gateway.register(FakeAdapter {
                provider,
                calls: calls.clone(),
                fail_with: fail_with.clone(),
            });
        }
        (
            SessionOrchestrator::new(CapabilityTable::default(), gateway),
            calls,
        )
    }

    fn image(label: &str) -> ReferenceImage {
        ReferenceImage::new(label, "image/png", label.as_bytes().to_vec())
    }

    fn last_request(calls: &Calls) -> Option<GenerationRequest> {
        calls.last_request.lock().ok().and_then(|last| last.clone())
    }

    #[test]
    fn invalid_login_stays_on_login_with_one_verification() {
        let (mut orchestrator, calls) = orchestrator(None);
        let err = orchestrator.login(ProviderId::Google, Credential::new("bad-key"));
        assert!(matches!(err, Err(SessionError::InvalidCredential { .. })));
        assert_eq!(calls.verify.load(Ordering::SeqCst), 1);
        assert_eq!(orchestrator.session().screen(), ScreenId::Login);
        assert!(!orchestrator.session().is_authenticated());
    }

    #[test]
    fn google_generation_appends_byte_result() -> anyhow::Result<()> {
        let (mut orchestrator, calls) = orchestrator(None);
        orchestrator.login(ProviderId::Google, Credential::new("valid-key"))?;
        orchestrator.dispatch(Action::SelectMode(Mode::Generation))?;

        let transition = orchestrator.submit(Submission::Generation {
            attributes: AttributeSelection::default(),
            settings: GenerationSettings::default(),
        })?;

        assert_eq!(transition.screen, ScreenId::GenerationForm);
        assert_eq!(calls.generate.load(Ordering::SeqCst), 1);
        assert_eq!(orchestrator.session().history().len(), 1);
        let result = transition.result.as_deref().cloned();
        assert!(matches!(
            result.as_ref().map(|result| &result.images[0]),
            Some(GeneratedImage::Bytes { .. })
        ));
        let request = last_request(&calls);
        assert_eq!(request.map(|request| request.options), Some(ProviderOptions::Google));
        Ok(())
    }

    #[test]
    fn replicate_edit_without_sample_never_calls_provider() -> anyhow::Result<()> {
        let (mut orchestrator, calls) = orchestrator(None);
        orchestrator.login(ProviderId::Replicate, Credential::new("valid-key"))?;
        orchestrator.dispatch(Action::OpenEditMenu)?;
        orchestrator.dispatch(Action::SelectMode(Mode::Edit(EditSubtype::Face)))?;

        let err = orchestrator.submit(Submission::Edit {
            images: EditImages {
                main: Some(image("main")),
                samples: [None, None, None],
            },
        });

        assert_eq!(
            err,
            Err(SessionError::validation("main image and sample 1 required"))
        );
        assert_eq!(calls.generate.load(Ordering::SeqCst), 0);
        assert_eq!(
            orchestrator.session().screen(),
            ScreenId::EditForm(EditSubtype::Face)
        );
        Ok(())
    }

    #[test]
    fn outfit_edit_without_main_image_never_calls_provider() -> anyhow::Result<()> {
        let (mut orchestrator, calls) = orchestrator(None);
        orchestrator.login(ProviderId::Google, Credential::new("valid-key"))?;
        orchestrator.dispatch(Action::SelectMode(Mode::Edit(EditSubtype::Outfit)))?;

        let err = orchestrator.submit(Submission::Edit {
            images: EditImages {
                main: None,
                samples: [Some(image("sample1")), None, None],
            },
        });

        assert_eq!(
            err,
            Err(SessionError::validation("main image and sample 1 required"))
        );
        assert_eq!(calls.generate.load(Ordering::SeqCst), 0);
        assert!(last_request(&calls).is_none());
        assert_eq!(
            orchestrator.session().screen(),
            ScreenId::EditForm(EditSubtype::Outfit)
        );
        assert!(orchestrator.session().history().is_empty());
        Ok(())
    }

    #[test]
    fn replicate_edit_sends_main_image_only_with_warning() -> anyhow::Result<()> {
        let (mut orchestrator, calls) = orchestrator(None);
        orchestrator.login(ProviderId::Replicate, Credential::new("valid-key"))?;
        orchestrator.dispatch(Action::OpenEditMenu)?;
        orchestrator.dispatch(Action::SelectMode(Mode::Edit(EditSubtype::Color)))?;

        let transition = orchestrator.submit(Submission::Edit {
            images: EditImages {
                main: Some(image("main")),
                samples: [Some(image("sample1")), Some(image("sample2")), None],
            },
        })?;

        let request = last_request(&calls).ok_or_else(|| anyhow::anyhow!("no request"))?;
        assert_eq!(request.reference_images.len(), 1);
        assert_eq!(request.reference_images[0].label, "main");
        let ProviderOptions::Replicate(options) = request.options else {
            anyhow::bail!("expected replicate options");
        };
        assert_eq!(options.prompt_strength, Some(0.8));
        assert_eq!(options.aspect_ratio, None);

        let warnings = transition
            .result
            .map(|result| result.warnings.clone())
            .unwrap_or_default();
        assert!(warnings.iter().any(|warning| warning.contains("dropped 2 sample")));
        Ok(())
    }

    #[test]
    fn google_edit_keeps_main_first_and_all_samples() -> anyhow::Result<()> {
        let (mut orchestrator, calls) = orchestrator(None);
        orchestrator.login(ProviderId::Google, Credential::new("valid-key"))?;
        orchestrator.dispatch(Action::SelectMode(Mode::Edit(EditSubtype::Outfit)))?;
        orchestrator.submit(Submission::Edit {
            images: EditImages {
                main: Some(image("main")),
                samples: [Some(image("sample1")), Some(image("sample2")), Some(image("sample3"))],
            },
        })?;
        let labels = last_request(&calls)
            .map(|request| {
                request
                    .reference_images
                    .into_iter()
                    .map(|image| image.label)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        assert_eq!(labels, vec!["main", "sample1", "sample2", "sample3"]);
        Ok(())
    }

    #[test]
    fn replicate_generation_passes_count_and_size() -> anyhow::Result<()> {
        let (mut orchestrator, calls) = orchestrator(None);
        orchestrator.login(ProviderId::Replicate, Credential::new("valid-key"))?;
        orchestrator.dispatch(Action::SelectMode(Mode::Generation))?;
        let mut settings = GenerationSettings::default();
        settings.set_image_count(3)?;
        settings.resolution = Resolution::FourK;
        orchestrator.submit(Submission::Generation {
            attributes: AttributeSelection::default(),
            settings,
        })?;
        let request = last_request(&calls).ok_or_else(|| anyhow::anyhow!("no request"))?;
        assert_eq!(
            request.options,
            ProviderOptions::Replicate(ReplicateOptions {
                num_outputs: 3,
                size: Some(Resolution::FourK),
                aspect_ratio: Some("1:1"),
                prompt_strength: None,
            })
        );
        Ok(())
    }

    #[test]
    fn upscale_requires_input_image() -> anyhow::Result<()> {
        let (mut orchestrator, calls) = orchestrator(None);
        orchestrator.login(ProviderId::Replicate, Credential::new("valid-key"))?;
        orchestrator.dispatch(Action::SelectMode(Mode::Upscale))?;
        let err = orchestrator.submit(Submission::Upscale {
            image: None,
            scale: ScaleFactor::Four,
        });
        assert_eq!(err, Err(SessionError::validation("input image required")));
        assert_eq!(calls.generate.load(Ordering::SeqCst), 0);

        orchestrator.submit(Submission::Upscale {
            image: Some(image("input")),
            scale: ScaleFactor::Two,
        })?;
        let request = last_request(&calls).ok_or_else(|| anyhow::anyhow!("no request"))?;
        assert_eq!(request.prompt, UPSCALE_PROMPT);
        let ProviderOptions::Replicate(options) = request.options else {
            anyhow::bail!("expected replicate options");
        };
        assert_eq!(options.prompt_strength, Some(0.3));
        assert_eq!(options.size, Some(Resolution::TwoK));
        Ok(())
    }

    #[test]
    fn provider_failure_keeps_screen_and_history() -> anyhow::Result<()> {
        let (mut orchestrator, calls) =
            orchestrator(Some(ProviderError::Quota("HTTP 429: slow down".to_string())));
        orchestrator.login(ProviderId::Google, Credential::new("valid-key"))?;
        orchestrator.dispatch(Action::SelectMode(Mode::Generation))?;
        let err = orchestrator.submit(Submission::Generation {
            attributes: AttributeSelection::default(),
            settings: GenerationSettings::default(),
        });
        assert!(matches!(err, Err(SessionError::Provider(ProviderError::Quota(_)))));
        assert_eq!(calls.generate.load(Ordering::SeqCst), 1);
        assert_eq!(orchestrator.session().screen(), ScreenId::GenerationForm);
        assert!(orchestrator.session().history().is_empty());
        assert!(!orchestrator.busy_flag().load(Ordering::SeqCst));
        Ok(())
    }

    #[test]
    fn submit_outside_a_form_is_rejected() -> anyhow::Result<()> {
        let (mut orchestrator, calls) = orchestrator(None);
        let before_login = orchestrator.submit(Submission::Upscale {
            image: Some(image("input")),
            scale: ScaleFactor::Four,
        });
        assert!(matches!(before_login, Err(SessionError::UnsupportedAction { .. })));

        orchestrator.login(ProviderId::Google, Credential::new("valid-key"))?;
        let on_home = orchestrator.submit(Submission::Generation {
            attributes: AttributeSelection::default(),
            settings: GenerationSettings::default(),
        });
        assert!(matches!(on_home, Err(SessionError::UnsupportedAction { .. })));

        orchestrator.dispatch(Action::SelectMode(Mode::Generation))?;
        let wrong_form = orchestrator.submit(Submission::Upscale {
            image: Some(image("input")),
            scale: ScaleFactor::Four,
        });
        assert!(matches!(wrong_form, Err(SessionError::Validation(_))));
        assert_eq!(calls.generate.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[test]
    fn busy_orchestrator_rejects_second_submission() -> anyhow::Result<()> {
        let (mut orchestrator, calls) = orchestrator(None);
        orchestrator.login(ProviderId::Google, Credential::new("valid-key"))?;
        orchestrator.dispatch(Action::SelectMode(Mode::Generation))?;

        let flag = orchestrator.busy_flag();
        flag.store(true, Ordering::SeqCst);
        let err = orchestrator.submit(Submission::Generation {
            attributes: AttributeSelection::default(),
            settings: GenerationSettings::default(),
        });
        assert_eq!(err, Err(SessionError::Busy));
        assert_eq!(calls.generate.load(Ordering::SeqCst), 0);

        flag.store(false, Ordering::SeqCst);
        assert!(orchestrator
            .submit(Submission::Generation {
                attributes: AttributeSelection::default(),
                settings: GenerationSettings::default(),
            })
            .is_ok());
        Ok(())
    }

    #[test]
    fn rejected_action_leaves_screen_unchanged() -> anyhow::Result<()> {
        let (mut orchestrator, _calls) = orchestrator(None);
        orchestrator.login(ProviderId::Google, Credential::new("valid-key"))?;
        let err = orchestrator.dispatch(Action::SelectMode(Mode::Upscale));
        assert!(matches!(err, Err(SessionError::UnsupportedAction { .. })));
        assert_eq!(orchestrator.session().screen(), ScreenId::ProviderHome);
        assert!(!orchestrator.available_actions().contains(&Action::Back));
        assert!(orchestrator
            .available_actions()
            .contains(&Action::SelectMode(Mode::Edit(EditSubtype::Face))));
        Ok(())
    }

    #[test]
    fn events_record_the_session_without_secrets() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("events.jsonl");
        let (orchestrator, _calls) = orchestrator(None);
        let mut orchestrator = orchestrator.with_events(EventLog::open(&path, "s-1")?);

        assert!(orchestrator
            .login(ProviderId::Google, Credential::new("wrong-secret"))
            .is_err());
        orchestrator.login(ProviderId::Google, Credential::new("valid-key"))?;
        orchestrator.dispatch(Action::SelectMode(Mode::Generation))?;
        orchestrator.submit(Submission::Generation {
            attributes: AttributeSelection::default(),
            settings: GenerationSettings::default(),
        })?;
        orchestrator.dispatch(Action::Logout)?;

        let raw = std::fs::read_to_string(&path)?;
        assert!(!raw.contains("valid-key"));
        assert!(!raw.contains("wrong-secret"));
        let types: Vec<String> = raw
            .lines()
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .filter_map(|row| row.get("type").and_then(Value::as_str).map(str::to_string))
            .collect();
        assert_eq!(
            types,
            vec![
                "session_started",
                "login_failed",
                "login_succeeded",
                "screen_changed",
                "generation_started",
                "generation_succeeded",
                "logged_out",
            ]
        );
        let succeeded = raw
            .lines()
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .find(|row| row["type"] == json!("generation_succeeded"))
            .ok_or_else(|| anyhow::anyhow!("missing generation_succeeded"))?;
        assert_eq!(
            succeeded["outputs"][0]["sha256"],
            json!(hex::encode(Sha256::digest([1u8, 2, 3])))
        );
        assert_eq!(succeeded["session_id"], "s-1");
        let request = &succeeded["request"];
        assert_eq!(request["endpoint"], "https://fake.example/generate");
        assert!(request["payload"]["prompt"].is_string());
        assert_eq!(request["payload"]["key"], "<omitted>");
        assert_eq!(request["payload"]["image"], "<omitted>");
        assert!(!raw.contains("data:"));
        Ok(())
    }
}
