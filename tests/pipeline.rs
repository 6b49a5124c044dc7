//! End-to-end request flow with scripted selection, provider and notifier
//!
//! All tests run on a paused clock, so provider latency and retry backoff
//! cost no wall time.

use redraft::config::{Config, UiConfig};
use redraft::daemon::Daemon;
use redraft::error::{HotkeyError, RewriteError};
use redraft::hotkey::{Binding, HotkeyEvent, HotkeyListener};
use redraft::notification::Notifier;
use redraft::orchestrator::{Dispatch, Orchestrator, Pipeline, RequestOutcome};
use redraft::rewrite::{RewriteClient, TextGenerator};
use redraft::selection::SelectionIo;
use redraft::RewriteMode;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

// =============================================================================
// Fakes
// =============================================================================

/// Provider that answers after `latency`, or always fails
struct FakeGenerator {
    latency: Duration,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeGenerator {
    fn answering(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency,
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            latency: Duration::ZERO,
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, RewriteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        if self.fail {
            return Err(RewriteError::Network("connection refused".into()));
        }
        let text = prompt.rsplit("Text: ").next().unwrap_or_default();
        Ok(format!("  {}!\n", text.to_uppercase()))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

#[derive(Clone, Default)]
struct FakeSelection {
    selected: Option<&'static str>,
    paste_fails: bool,
    panics: bool,
    replaced: Arc<Mutex<Vec<String>>>,
}

impl FakeSelection {
    fn with_text(text: &'static str) -> Self {
        Self {
            selected: Some(text),
            ..Default::default()
        }
    }

    fn replaced(&self) -> Vec<String> {
        self.replaced.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SelectionIo for FakeSelection {
    async fn capture(&self) -> Option<String> {
        if self.panics {
            panic!("clipboard backend crashed");
        }
        self.selected.map(str::to_string)
    }

    async fn replace(&self, text: &str) -> bool {
        if self.paste_fails {
            return false;
        }
        self.replaced.lock().unwrap().push(text.to_string());
        true
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, title: &str, message: &str, _duration: Duration) {
        assert_eq!(title, "Redraft");
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Listener fed by the test through a channel
struct FakeListener {
    bindings: Vec<Binding>,
    events: Option<mpsc::Receiver<HotkeyEvent>>,
    stopped: Arc<AtomicBool>,
}

#[async_trait::async_trait]
impl HotkeyListener for FakeListener {
    fn register(&mut self, combo: &str, mode: RewriteMode) -> Result<(), HotkeyError> {
        self.bindings.push(Binding {
            combo_str: combo.to_string(),
            combo: combo.parse()?,
            mode,
        });
        Ok(())
    }

    async fn start(&mut self) -> Result<mpsc::Receiver<HotkeyEvent>, HotkeyError> {
        self.events.take().ok_or(HotkeyError::AlreadyRunning)
    }

    async fn stop(&mut self) -> Result<(), HotkeyError> {
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn bindings(&self) -> &[Binding] {
        &self.bindings
    }
}

fn ui(show_notifications: bool) -> UiConfig {
    UiConfig {
        show_notifications,
        notification_duration: 2,
    }
}

fn orchestrator(
    generator: &Arc<FakeGenerator>,
    selection: &FakeSelection,
    notifier: &RecordingNotifier,
    show_notifications: bool,
) -> Orchestrator {
    let client = RewriteClient::new(generator.clone(), 10, 2);
    Orchestrator::new(Pipeline::new(
        client,
        Box::new(selection.clone()),
        Arc::new(notifier.clone()),
        ui(show_notifications),
    ))
}

async fn finish(dispatch: Dispatch) -> RequestOutcome {
    match dispatch {
        Dispatch::Started(handle) => handle.await.expect("supervisor task"),
        Dispatch::Busy => panic!("trigger was rejected"),
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_second_trigger_while_busy_is_dropped() {
    let generator = FakeGenerator::answering(Duration::from_secs(2));
    let selection = FakeSelection::with_text("hello there");
    let notifier = RecordingNotifier::default();
    let orchestrator = orchestrator(&generator, &selection, &notifier, true);

    let first = orchestrator.trigger(RewriteMode::GrammarFix);
    assert!(!orchestrator.is_idle());
    assert!(matches!(
        orchestrator.trigger(RewriteMode::Formal),
        Dispatch::Busy
    ));

    assert_eq!(finish(first).await, RequestOutcome::Replaced { chars: 12 });
    assert_eq!(generator.calls(), 1);
    assert_eq!(selection.replaced(), vec!["HELLO THERE!".to_string()]);
    assert!(orchestrator.is_idle());

    // Free again once the first request is done
    let again = orchestrator.trigger(RewriteMode::Casual);
    assert!(matches!(finish(again).await, RequestOutcome::Replaced { .. }));
    assert_eq!(generator.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_success_notifications() {
    let generator = FakeGenerator::answering(Duration::ZERO);
    let selection = FakeSelection::with_text("ok");
    let notifier = RecordingNotifier::default();
    let orchestrator = orchestrator(&generator, &selection, &notifier, true);

    finish(orchestrator.trigger(RewriteMode::Formal)).await;
    assert_eq!(
        notifier.messages(),
        vec!["Processing (formal)...", "Text improved (formal)"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_no_selection_makes_no_api_call() {
    let generator = FakeGenerator::answering(Duration::ZERO);
    let selection = FakeSelection::default();
    let notifier = RecordingNotifier::default();
    let orchestrator = orchestrator(&generator, &selection, &notifier, true);

    let outcome = finish(orchestrator.trigger(RewriteMode::Simplify)).await;
    assert_eq!(outcome, RequestOutcome::NoSelection);
    assert_eq!(generator.calls(), 0);
    assert_eq!(notifier.messages().last().unwrap(), "No text selected");
    assert!(orchestrator.is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_rewrite_failure_returns_to_idle() {
    let generator = FakeGenerator::failing();
    let selection = FakeSelection::with_text("some text");
    let notifier = RecordingNotifier::default();
    let orchestrator = orchestrator(&generator, &selection, &notifier, true);

    let outcome = finish(orchestrator.trigger(RewriteMode::Expand)).await;
    assert_eq!(outcome, RequestOutcome::RewriteFailed);
    assert_eq!(generator.calls(), 2);
    assert!(selection.replaced().is_empty());
    assert_eq!(notifier.messages().last().unwrap(), "Failed to improve text");
    assert!(orchestrator.is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_replace_failure_is_reported() {
    let generator = FakeGenerator::answering(Duration::ZERO);
    let selection = FakeSelection {
        selected: Some("some text"),
        paste_fails: true,
        ..Default::default()
    };
    let notifier = RecordingNotifier::default();
    let orchestrator = orchestrator(&generator, &selection, &notifier, true);

    let outcome = finish(orchestrator.trigger(RewriteMode::Casual)).await;
    assert_eq!(outcome, RequestOutcome::ReplaceFailed);
    assert_eq!(notifier.messages().last().unwrap(), "Failed to replace text");
}

#[tokio::test(start_paused = true)]
async fn test_notifications_can_be_disabled() {
    let generator = FakeGenerator::answering(Duration::ZERO);
    let selection = FakeSelection::with_text("quiet");
    let notifier = RecordingNotifier::default();
    let orchestrator = orchestrator(&generator, &selection, &notifier, false);

    finish(orchestrator.trigger(RewriteMode::GrammarFix)).await;
    assert!(notifier.messages().is_empty());
    assert_eq!(selection.replaced().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_panicking_request_releases_lock() {
    let generator = FakeGenerator::answering(Duration::ZERO);
    let selection = FakeSelection {
        panics: true,
        ..Default::default()
    };
    let notifier = RecordingNotifier::default();
    let orchestrator = orchestrator(&generator, &selection, &notifier, true);

    let outcome = finish(orchestrator.trigger(RewriteMode::Formal)).await;
    assert_eq!(outcome, RequestOutcome::Crashed);
    assert_eq!(notifier.messages().last().unwrap(), "An error occurred");
    assert!(orchestrator.is_idle());
    assert!(matches!(
        orchestrator.trigger(RewriteMode::Formal),
        Dispatch::Started(_)
    ));
}

// =============================================================================
// Daemon
// =============================================================================

struct Harness {
    daemon: Daemon,
    events: mpsc::Sender<HotkeyEvent>,
    stopped: Arc<AtomicBool>,
}

fn daemon(generator: &Arc<FakeGenerator>, selection: &FakeSelection, notifier: &RecordingNotifier) -> Harness {
    let (tx, rx) = mpsc::channel(8);
    let stopped = Arc::new(AtomicBool::new(false));
    let mut listener = FakeListener {
        bindings: Vec::new(),
        events: Some(rx),
        stopped: stopped.clone(),
    };
    listener
        .register("cmd+shift+g", RewriteMode::GrammarFix)
        .unwrap();

    let daemon = Daemon::from_parts(
        Config::default(),
        orchestrator(generator, selection, notifier, true),
        Box::new(listener),
        Arc::new(notifier.clone()),
    );

    Harness {
        daemon,
        events: tx,
        stopped,
    }
}

#[tokio::test(start_paused = true)]
async fn test_daemon_drops_burst_and_stops_when_listener_closes() {
    let generator = FakeGenerator::answering(Duration::from_secs(1));
    let selection = FakeSelection::with_text("burst");
    let notifier = RecordingNotifier::default();
    let mut harness = daemon(&generator, &selection, &notifier);

    let grammar = HotkeyEvent {
        mode: RewriteMode::GrammarFix,
    };
    harness.events.send(grammar).await.unwrap();
    harness.events.send(grammar).await.unwrap();
    drop(harness.events);

    harness
        .daemon
        .run_until(std::future::pending())
        .await
        .unwrap();

    assert_eq!(generator.calls(), 1);
    assert_eq!(selection.replaced(), vec!["BURST!".to_string()]);
    assert_eq!(notifier.messages().first().unwrap(), "Ready to help!");
    assert!(harness.stopped.load(Ordering::SeqCst));
    assert!(!harness.daemon.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_waits_for_in_flight_request() {
    let generator = FakeGenerator::answering(Duration::from_secs(30));
    let selection = FakeSelection::with_text("slow");
    let notifier = RecordingNotifier::default();
    let mut harness = daemon(&generator, &selection, &notifier);

    harness
        .events
        .send(HotkeyEvent {
            mode: RewriteMode::GrammarFix,
        })
        .await
        .unwrap();

    let started = Instant::now();
    harness
        .daemon
        .run_until(tokio::time::sleep(Duration::from_secs(5)))
        .await
        .unwrap();

    // Shutdown was requested at 5s but the request ran to completion
    assert!(started.elapsed() >= Duration::from_secs(30));
    assert_eq!(selection.replaced(), vec!["SLOW!".to_string()]);
    assert!(harness.daemon.orchestrator().is_idle());
    assert!(harness.stopped.load(Ordering::SeqCst));
}
