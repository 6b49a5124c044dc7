//! Simulated copy/paste keystrokes
//!
//! Each backend shells out to a scripting tool with a fixed timeout:
//! 1. osascript - macOS System Events (requires Accessibility permission)
//! 2. xdotool - X11, clears held modifiers before sending
//! 3. ydotool - Wayland/TTY via uinput, requires the ydotoold daemon
//!
//! Backends are tried in order until one succeeds.

use crate::error::SelectionError;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Timeout for a single scripted interaction
pub const SCRIPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Key chords the selection flow needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chord {
    /// Cmd+C / Ctrl+C
    Copy,
    /// Cmd+V / Ctrl+V
    Paste,
}

impl Chord {
    fn letter(self) -> &'static str {
        match self {
            Chord::Copy => "c",
            Chord::Paste => "v",
        }
    }
}

/// Trait for keystroke simulation backends
#[async_trait::async_trait]
pub trait Keystrokes: Send + Sync {
    /// Send the chord to the focused application
    async fn send(&self, chord: Chord) -> Result<(), SelectionError>;

    /// Check if this backend can run here
    fn is_available(&self) -> bool;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Run a scripting tool, failing on non-zero exit or timeout
async fn run_tool(tool: &'static str, args: &[&str]) -> Result<(), SelectionError> {
    let child = Command::new(tool)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = timeout(SCRIPT_TIMEOUT, child)
        .await
        .map_err(|_| SelectionError::Timeout(SCRIPT_TIMEOUT.as_secs()))?
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SelectionError::ToolNotFound(tool)
            } else {
                SelectionError::Keystroke(e.to_string())
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SelectionError::Keystroke(format!(
            "{} failed: {}",
            tool,
            stderr.trim()
        )));
    }

    Ok(())
}

fn tool_in_path(tool: &str) -> bool {
    which::which(tool).is_ok()
}

/// macOS keystrokes via AppleScript
#[derive(Debug, Default)]
pub struct OsascriptKeys;

impl OsascriptKeys {
    fn script(chord: Chord) -> String {
        format!(
            r#"tell application "System Events" to keystroke "{}" using command down"#,
            chord.letter()
        )
    }
}

#[async_trait::async_trait]
impl Keystrokes for OsascriptKeys {
    async fn send(&self, chord: Chord) -> Result<(), SelectionError> {
        let script = Self::script(chord);
        run_tool("osascript", &["-e", &script]).await.map_err(|e| match e {
            // Check for common permission error
            SelectionError::Keystroke(msg)
                if msg.contains("not allowed") || msg.contains("accessibility") =>
            {
                SelectionError::Keystroke(
                    "Accessibility permission required. Grant access in System Settings > Privacy & Security > Accessibility".to_string(),
                )
            }
            other => other,
        })
    }

    fn is_available(&self) -> bool {
        cfg!(target_os = "macos") && tool_in_path("osascript")
    }

    fn name(&self) -> &'static str {
        "osascript (macOS)"
    }
}

/// X11 keystrokes via xdotool
#[derive(Debug, Default)]
pub struct XdotoolKeys;

#[async_trait::async_trait]
impl Keystrokes for XdotoolKeys {
    async fn send(&self, chord: Chord) -> Result<(), SelectionError> {
        let keys = format!("ctrl+{}", chord.letter());
        run_tool("xdotool", &["key", "--clearmodifiers", &keys]).await
    }

    fn is_available(&self) -> bool {
        std::env::var_os("DISPLAY").is_some() && tool_in_path("xdotool")
    }

    fn name(&self) -> &'static str {
        "xdotool (X11)"
    }
}

/// uinput keystrokes via ydotool
#[derive(Debug, Default)]
pub struct YdotoolKeys;

impl YdotoolKeys {
    /// Raw key events: press Ctrl, press key, release key, release Ctrl.
    /// 29 = KEY_LEFTCTRL, 46 = KEY_C, 47 = KEY_V
    fn key_events(chord: Chord) -> [&'static str; 4] {
        match chord {
            Chord::Copy => ["29:1", "46:1", "46:0", "29:0"],
            Chord::Paste => ["29:1", "47:1", "47:0", "29:0"],
        }
    }
}

#[async_trait::async_trait]
impl Keystrokes for YdotoolKeys {
    async fn send(&self, chord: Chord) -> Result<(), SelectionError> {
        let mut args = vec!["key"];
        args.extend(Self::key_events(chord));
        run_tool("ydotool", &args).await
    }

    fn is_available(&self) -> bool {
        tool_in_path("ydotool")
    }

    fn name(&self) -> &'static str {
        "ydotool (uinput)"
    }
}

/// Tries each backend in order until one succeeds
pub struct KeystrokeChain {
    backends: Vec<Box<dyn Keystrokes>>,
}

impl KeystrokeChain {
    pub fn new(backends: Vec<Box<dyn Keystrokes>>) -> Self {
        Self { backends }
    }
}

#[async_trait::async_trait]
impl Keystrokes for KeystrokeChain {
    async fn send(&self, chord: Chord) -> Result<(), SelectionError> {
        for backend in &self.backends {
            if !backend.is_available() {
                tracing::debug!("{} not available, trying next", backend.name());
                continue;
            }

            match backend.send(chord).await {
                Ok(()) => {
                    tracing::debug!("Sent {:?} via {}", chord, backend.name());
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("{} failed: {}, trying next", backend.name(), e);
                }
            }
        }

        Err(SelectionError::NoKeystrokeTool)
    }

    fn is_available(&self) -> bool {
        self.backends.iter().any(|b| b.is_available())
    }

    fn name(&self) -> &'static str {
        "keystroke chain"
    }
}

/// Build the backend chain for this platform
pub fn create_keystrokes() -> KeystrokeChain {
    let mut chain: Vec<Box<dyn Keystrokes>> = Vec::new();

    if cfg!(target_os = "macos") {
        chain.push(Box::new(OsascriptKeys));
    } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        // Prefer uinput on Wayland; xdotool only reaches XWayland windows
        chain.push(Box::new(YdotoolKeys));
        chain.push(Box::new(XdotoolKeys));
    } else {
        chain.push(Box::new(XdotoolKeys));
        chain.push(Box::new(YdotoolKeys));
    }

    KeystrokeChain::new(chain)
}
