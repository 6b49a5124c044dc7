//! Platform-specific desktop notifications
//!
//! - Linux: notify-send (libnotify)
//! - macOS: osascript `display notification` with the Glass sound
//!
//! Notifications are best-effort: failures are logged at debug level and
//! never reach the caller.

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Application name shown by the notification daemon
pub const APP_NAME: &str = "Redraft";

/// Destination for user-facing status messages
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Show `message` under `title` for roughly `duration`
    async fn notify(&self, title: &str, message: &str, duration: Duration);
}

/// Notifier backed by the desktop notification service
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

#[async_trait::async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, title: &str, message: &str, duration: Duration) {
        #[cfg(target_os = "macos")]
        {
            let _ = duration; // Notification Center decides how long to show it
            send_macos(title, message).await;
        }

        #[cfg(not(target_os = "macos"))]
        send_notify_send(title, message, duration).await;
    }
}

/// Send a notification using notify-send
#[cfg(not(target_os = "macos"))]
async fn send_notify_send(title: &str, message: &str, duration: Duration) {
    let app_name = format!("--app-name={}", APP_NAME);
    let expire = format!("--expire-time={}", duration.as_millis());

    let result = Command::new("notify-send")
        .args([app_name.as_str(), expire.as_str(), title, message])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await;

    if let Err(e) = result {
        tracing::debug!("Failed to send notification: {}", e);
    }
}

/// Send a notification on macOS via AppleScript
#[cfg(target_os = "macos")]
async fn send_macos(title: &str, message: &str) {
    let script = notification_script(title, message);

    let result = Command::new("osascript")
        .args(["-e", &script])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await;

    if let Err(e) = result {
        tracing::debug!("Failed to send notification: {}", e);
    }
}

fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn notification_script(title: &str, message: &str) -> String {
    format!(
        r#"display notification "{}" with title "{}" sound name "Glass""#,
        escape_applescript(message),
        escape_applescript(title)
    )
}
