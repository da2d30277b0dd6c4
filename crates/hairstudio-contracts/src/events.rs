//! Session audit log: one JSON object per line, tagged by `type`.
//!
//! Events carry identifiers, digests, and sanitized request summaries only.
//! Credentials and image bytes never reach this module. Nothing reads the
//! log back; it is not a persistence format.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::providers::{Operation, ProviderId};
use crate::screens::ScreenId;

/// How one generated image is identified in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutputRecord {
    Bytes {
        sha256: String,
        mime_type: String,
        bytes: usize,
    },
    /// A `data:` URL, recorded by digest only.
    Inline { sha256: String },
    Link { url: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SessionStarted {
        screen: ScreenId,
    },
    LoginSucceeded {
        provider: ProviderId,
    },
    LoginFailed {
        provider: ProviderId,
        kind: &'static str,
        message: String,
    },
    LoggedOut {
        provider: Option<ProviderId>,
        from: ScreenId,
    },
    ScreenChanged {
        from: ScreenId,
        to: ScreenId,
    },
    ActionRejected {
        action: String,
        screen: ScreenId,
        message: String,
    },
    GenerationStarted {
        provider: ProviderId,
        operation: Operation,
        references: usize,
    },
    GenerationSucceeded {
        provider: ProviderId,
        operation: Operation,
        result_id: String,
        elapsed_ms: u64,
        outputs: Vec<OutputRecord>,
        warnings: Vec<String>,
        /// Endpoint and sanitized payload as sent to the provider.
        request: Map<String, Value>,
    },
    GenerationFailed {
        provider: ProviderId,
        operation: Operation,
        elapsed_ms: u64,
        message: String,
    },
}

#[derive(Serialize)]
struct EventLine<'a> {
    session_id: &'a str,
    ts: String,
    #[serde(flatten)]
    event: &'a SessionEvent,
}

/// Append-only JSONL sink bound to one session id.
#[derive(Debug)]
pub struct EventLog {
    session_id: String,
    file: Mutex<File>,
}

impl EventLog {
    /// Opens `path` for appending, creating parent directories first.
    pub fn open(path: &Path, session_id: impl Into<String>) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open event log {}", path.display()))?;
        Ok(Self {
            session_id: session_id.into(),
            file: Mutex::new(file),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn record(&self, event: &SessionEvent) -> anyhow::Result<()> {
        let line = serde_json::to_string(&EventLine {
            session_id: &self.session_id,
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            event,
        })?;
        let mut file = self
            .file
            .lock()
            .map_err(|_| anyhow::anyhow!("event log lock poisoned"))?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

/// Fresh identifier stamped on every event of one session.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
