mod draft;
mod output;
mod view;

use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use hairstudio_contracts::chat::{parse_command, Command, CHAT_HELP_COMMANDS};
use hairstudio_contracts::events::{new_session_id, EventLog};
use hairstudio_contracts::prompts::ATTRIBUTE_NAMES;
use hairstudio_contracts::providers::CapabilityTable;
use hairstudio_contracts::session::Transition;
use hairstudio_engine::{GatewayConfig, ProviderGateway, ReplicateVerification, SessionOrchestrator};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::draft::{load_reference_image, FormDraft};
use crate::output::{save_result, SavedOutput};
use crate::view::{badge, render_providers, render_result, render_screen};

const DEFAULT_SAVE_DIR: &str = "hairstudio-output";

#[derive(Debug, Parser)]
#[command(name = "hairstudio", version, about = "Hairstyle image studio")]
struct Cli {
    /// Append session events as JSON lines to this file.
    #[arg(long)]
    events: Option<PathBuf>,
    /// Render placeholder images offline instead of calling providers.
    #[arg(long)]
    dryrun: bool,
    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout: Option<f64>,
    /// Check Replicate tokens against the account endpoint at login.
    #[arg(long)]
    verify_replicate_account: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hairstudio=info,hairstudio_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(err) = run() {
        eprintln!("hairstudio error: {err:#}");
        std::process::exit(1);
    }
}

fn gateway_config(cli: &Cli) -> GatewayConfig {
    let mut config = GatewayConfig::from_env();
    if let Some(seconds) = cli.timeout {
        config = config.with_timeout_secs(seconds);
    }
    if cli.dryrun {
        config.dry_run = true;
    }
    if cli.verify_replicate_account {
        config.replicate_verification = ReplicateVerification::Account;
    }
    config
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = gateway_config(&cli);
    let gateway = ProviderGateway::from_config(&config)?;
    let mut orchestrator = SessionOrchestrator::new(CapabilityTable::default(), gateway);
    if let Some(path) = &cli.events {
        orchestrator = orchestrator.with_events(EventLog::open(path, new_session_id())?);
    }
    info!(dry_run = config.dry_run, "hairstudio started");

    let stdin = io::stdin();
    let mut line = String::new();
    let mut draft = FormDraft::default();

    println!("Hairstudio started. Type /help for commands.");
    print_lines(&render_screen(&current(&orchestrator), &[]));

    loop {
        print!("{} > ", badge(orchestrator.session().provider()));
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        let input = line.trim_end_matches(['\n', '\r']);
        match parse_command(input) {
            Command::Noop => {}
            Command::Quit => break,
            Command::Help => {
                for (usage, description) in CHAT_HELP_COMMANDS {
                    println!("  {usage:<58} {description}");
                }
            }
            Command::Login {
                provider,
                credential,
            } => {
                println!("Verifying {} credential...", provider.label());
                match orchestrator.login(provider, credential) {
                    Ok(transition) => show(&orchestrator, &transition),
                    Err(err) => println!("Login failed: {err}"),
                }
            }
            Command::Navigate(action) => match orchestrator.dispatch(action) {
                Ok(transition) => {
                    if !orchestrator.session().is_authenticated() {
                        draft = FormDraft::default();
                    }
                    show(&orchestrator, &transition);
                }
                Err(err) => println!("{err}"),
            },
            Command::Set { name, value } => match draft.attributes.set(&name, &value) {
                Ok(()) => println!("{name} set to {value}"),
                Err(err) => println!("{err}"),
            },
            Command::Options => {
                for name in ATTRIBUTE_NAMES {
                    println!("  {name:<12} {}", draft.attributes.options(name).join(", "));
                }
            }
            Command::Count(count) => match draft.settings.set_image_count(count) {
                Ok(()) => println!("Image count set to {count}"),
                Err(err) => println!("{err}"),
            },
            Command::Resolution(resolution) => {
                draft.set_resolution(resolution);
                println!("Resolution set to {}", resolution.as_str());
            }
            Command::Scale(scale) => {
                draft.scale = scale;
                println!("Upscale target set to {}", scale.resolution().as_str());
            }
            Command::Image { slot, path } => {
                match load_reference_image(&PathBuf::from(&path), slot) {
                    Ok(image) => {
                        println!("Attached {path} as {}", image.label);
                        draft.attach(slot, image);
                    }
                    Err(err) => println!("Image rejected: {err:#}"),
                }
            }
            Command::Clear => {
                draft.clear_images();
                println!("Cleared attached images.");
            }
            Command::Submit => {
                let screen = orchestrator.session().screen();
                let Some(submission) = draft.submission_for(screen) else {
                    println!("Open a form before /submit.");
                    continue;
                };
                println!("Working...");
                match orchestrator.submit(submission) {
                    Ok(transition) => {
                        if let Some(result) = &transition.result {
                            print_lines(&render_result(result));
                            println!("Use /save to download.");
                        }
                    }
                    Err(err) => println!("Request failed: {err}"),
                }
            }
            Command::Save { dir } => {
                let Some(result) = orchestrator.session().last_result() else {
                    println!("Nothing to save yet.");
                    continue;
                };
                let dir = PathBuf::from(dir.unwrap_or_else(|| DEFAULT_SAVE_DIR.to_string()));
                match save_result(result, &dir) {
                    Ok(saved) => {
                        for entry in saved {
                            match entry {
                                SavedOutput::File(path) => println!("Saved {}", path.display()),
                                SavedOutput::Link(url) => println!("Open {url}"),
                            }
                        }
                    }
                    Err(err) => {
                        warn!(error = %format!("{err:#}"), "save failed");
                        println!("Save failed: {err:#}");
                    }
                }
            }
            Command::History => {
                let history = orchestrator.session().history();
                if history.is_empty() {
                    println!("No results this session.");
                }
                for (index, result) in history.iter().enumerate() {
                    println!(
                        "  {}. {} {} {} image(s) at {}",
                        index + 1,
                        result.provider.label(),
                        result.operation.slug(),
                        result.images.len(),
                        result.created_at.format("%H:%M:%S")
                    );
                }
            }
            Command::Status => {
                print_lines(&render_screen(
                    &current(&orchestrator),
                    &orchestrator.available_actions(),
                ));
                let attached = draft.attached_labels();
                println!(
                    "Images: {}  count: {}  resolution: {}",
                    if attached.is_empty() {
                        "none".to_string()
                    } else {
                        attached.join(", ")
                    },
                    draft.settings.image_count(),
                    draft.settings.resolution.as_str()
                );
            }
            Command::Providers => print_lines(&render_providers(
                orchestrator.table(),
                &orchestrator.gateway().providers(),
            )),
            Command::Invalid { command, message } => println!("/{command}: {message}"),
            Command::Unknown { command, .. } => {
                println!("Unknown command /{command}. Type /help for commands.")
            }
            Command::Text(_) => println!("Commands start with /. Type /help for commands."),
        }
    }
    Ok(())
}

fn current(orchestrator: &SessionOrchestrator) -> Transition {
    let screen = orchestrator.session().screen();
    Transition {
        previous: screen,
        screen,
        provider: orchestrator.session().provider(),
        result: None,
    }
}

fn show(orchestrator: &SessionOrchestrator, transition: &Transition) {
    print_lines(&render_screen(transition, &orchestrator.available_actions()));
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
