//! Global hotkey support using rdev
//!
//! Captures keyboard events system-wide on a dedicated OS thread and
//! forwards matched combinations over a bounded channel.
//!
//! - macOS: requires Accessibility permission for the terminal/app
//! - Linux: requires an X11 session (XRecord)

use super::combo::{ComboMatcher, KeyCombo};
use super::{Binding, HotkeyEvent, HotkeyListener};
use crate::error::HotkeyError;
use crate::mode::RewriteMode;
use rdev::{listen, Event};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Pending triggers beyond this are dropped
const CHANNEL_CAPACITY: usize = 32;

/// rdev-based hotkey listener
pub struct RdevListener {
    bindings: Vec<Binding>,
    running: Arc<AtomicBool>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
}

impl RdevListener {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }
}

impl Default for RdevListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HotkeyListener for RdevListener {
    fn register(&mut self, combo: &str, mode: RewriteMode) -> Result<(), HotkeyError> {
        let parsed: KeyCombo = combo.parse()?;
        tracing::debug!("Registered hotkey: {} -> {}", combo, mode);
        self.bindings.push(Binding {
            combo_str: combo.to_string(),
            combo: parsed,
            mode,
        });
        Ok(())
    }

    async fn start(&mut self) -> Result<mpsc::Receiver<HotkeyEvent>, HotkeyError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(HotkeyError::AlreadyRunning);
        }
        if self.bindings.is_empty() {
            return Err(HotkeyError::NoBindings);
        }

        #[cfg(target_os = "macos")]
        if !check_accessibility_permission() {
            tracing::warn!(
                "Accessibility permission not granted. \
                 macOS should have shown a permission dialog. \
                 Grant access in: System Settings > Privacy & Security > Accessibility"
            );
        }

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let mut matcher = ComboMatcher::new(
            self.bindings
                .iter()
                .map(|b| (b.combo, b.mode))
                .collect(),
        );
        let running = self.running.clone();
        running.store(true, Ordering::SeqCst);

        let thread_handle = std::thread::Builder::new()
            .name("hotkey-listener".to_string())
            .spawn(move || {
                let running_clone = running.clone();

                let callback = move |event: Event| {
                    if !running_clone.load(Ordering::SeqCst) {
                        return;
                    }

                    if let Some(mode) = matcher.handle(&event.event_type) {
                        tracing::debug!("Hotkey pressed: {}", mode);
                        if tx.try_send(HotkeyEvent { mode }).is_err() {
                            tracing::debug!("Hotkey event dropped, consumer is busy");
                        }
                    }
                };

                // Blocks until an error occurs or the process exits
                if let Err(e) = listen(callback) {
                    tracing::error!("rdev listen error: {:?}", e);
                    tracing::warn!(
                        "Global hotkey capture failed. On macOS grant Accessibility \
                         permission; on Linux run inside an X11 session."
                    );
                }
                running.store(false, Ordering::SeqCst);
            })
            .map_err(|e| HotkeyError::Listen(e.to_string()))?;

        self.thread_handle = Some(thread_handle);
        tracing::info!("Listening for {} hotkeys", self.bindings.len());
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), HotkeyError> {
        self.running.store(false, Ordering::SeqCst);
        // rdev::listen has no cancellation; the thread idles until exit
        self.thread_handle.take();
        Ok(())
    }

    fn bindings(&self) -> &[Binding] {
        &self.bindings
    }
}

/// Check if Accessibility permission is granted, prompting the user if not.
///
/// Calls AXIsProcessTrustedWithOptions with kAXTrustedCheckOptionPrompt=true,
/// which makes macOS show the "App wants to control this computer" dialog
/// if permission hasn't been granted yet.
#[cfg(target_os = "macos")]
pub fn check_accessibility_permission() -> bool {
    #[link(name = "ApplicationServices", kind = "framework")]
    extern "C" {
        fn AXIsProcessTrustedWithOptions(options: core_foundation::base::CFTypeRef) -> bool;
    }

    use core_foundation::base::TCFType;
    use core_foundation::boolean::CFBoolean;
    use core_foundation::dictionary::CFDictionary;
    use core_foundation::string::CFString;

    let key = CFString::new("AXTrustedCheckOptionPrompt");
    let value = CFBoolean::true_value();
    let options = CFDictionary::from_CFType_pairs(&[(key.as_CFType(), value.as_CFType())]);

    unsafe { AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef() as _) }
}
