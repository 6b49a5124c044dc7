//! Request orchestration
//!
//! One request at a time: a trigger that arrives while another request is
//! in flight is rejected, never queued. The pipeline sits behind a tokio
//! mutex whose owned guard travels with the request task, so the lock is
//! released on every exit path, including a panic.
//!
//! ```text
//!   Idle --trigger--> Processing --(done | failed | panicked)--> Idle
//!                          |
//!   trigger while busy ----+--> rejected
//! ```

use crate::config::UiConfig;
use crate::mode::RewriteMode;
use crate::notification::Notifier;
use crate::rewrite::RewriteClient;
use crate::selection::SelectionIo;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Title used for every notification
pub const NOTIFICATION_TITLE: &str = "Redraft";

const PROCESSING_DURATION: Duration = Duration::from_secs(1);
const STATUS_DURATION: Duration = Duration::from_secs(2);

/// How a request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Selection replaced with the rewritten text
    Replaced { chars: usize },
    /// Nothing was selected; no API call was made
    NoSelection,
    /// The rewrite client gave up
    RewriteFailed,
    /// The rewritten text could not be pasted
    ReplaceFailed,
    /// The request task panicked
    Crashed,
}

/// Result of a trigger
#[derive(Debug)]
pub enum Dispatch {
    /// The request is running; the handle resolves when it finishes
    Started(JoinHandle<RequestOutcome>),
    /// Another request is in flight; this trigger was dropped
    Busy,
}

/// Shows notifications when enabled in the UI config
#[derive(Clone)]
struct StatusReporter {
    notifier: Arc<dyn Notifier>,
    ui: UiConfig,
}

impl StatusReporter {
    async fn show(&self, message: &str, duration: Duration) {
        if self.ui.show_notifications {
            self.notifier
                .notify(NOTIFICATION_TITLE, message, duration)
                .await;
        }
    }
}

/// Capture, rewrite and replace: the work done for one trigger
pub struct Pipeline {
    client: RewriteClient,
    selection: Box<dyn SelectionIo>,
    status: StatusReporter,
}

impl Pipeline {
    pub fn new(
        client: RewriteClient,
        selection: Box<dyn SelectionIo>,
        notifier: Arc<dyn Notifier>,
        ui: UiConfig,
    ) -> Self {
        Self {
            client,
            selection,
            status: StatusReporter { notifier, ui },
        }
    }

    /// Run one request to completion
    pub async fn process(&mut self, mode: RewriteMode) -> RequestOutcome {
        tracing::info!("Hotkey triggered: {}", mode);

        self.status
            .show(&format!("Processing ({})...", mode), PROCESSING_DURATION)
            .await;

        let Some(selected) = self.selection.capture().await else {
            tracing::info!("No text selected");
            self.status.show("No text selected", STATUS_DURATION).await;
            return RequestOutcome::NoSelection;
        };

        tracing::info!("Processing {} characters", selected.chars().count());

        let improved = match self.client.rewrite(&selected, mode.as_str()).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to improve text: {}", e);
                self.status
                    .show("Failed to improve text", STATUS_DURATION)
                    .await;
                return RequestOutcome::RewriteFailed;
            }
        };

        if !self.selection.replace(&improved).await {
            tracing::error!("Failed to replace text");
            self.status
                .show("Failed to replace text", STATUS_DURATION)
                .await;
            return RequestOutcome::ReplaceFailed;
        }

        tracing::info!("Text replaced successfully");
        let duration = self.status.ui.notification_duration();
        self.status
            .show(&format!("Text improved ({})", mode), duration)
            .await;

        RequestOutcome::Replaced {
            chars: improved.chars().count(),
        }
    }
}

/// Dispatches triggers to the pipeline, rejecting them while busy
pub struct Orchestrator {
    pipeline: Arc<Mutex<Pipeline>>,
    status: StatusReporter,
}

impl Orchestrator {
    pub fn new(pipeline: Pipeline) -> Self {
        let status = pipeline.status.clone();
        Self {
            pipeline: Arc::new(Mutex::new(pipeline)),
            status,
        }
    }

    /// Start a request for `mode` unless one is already running
    pub fn trigger(&self, mode: RewriteMode) -> Dispatch {
        let mut guard = match self.pipeline.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!("Already processing a request, ignoring hotkey");
                return Dispatch::Busy;
            }
        };

        // The guard lives inside the request task and drops with it
        let request = tokio::spawn(async move { guard.process(mode).await });

        let status = self.status.clone();
        let supervisor = tokio::spawn(async move {
            match request.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Error handling hotkey: {}", e);
                    status.show("An error occurred", STATUS_DURATION).await;
                    RequestOutcome::Crashed
                }
            }
        });

        Dispatch::Started(supervisor)
    }

    /// True when no request is in flight
    pub fn is_idle(&self) -> bool {
        self.pipeline.try_lock().is_ok()
    }
}
