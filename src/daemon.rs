//! Daemon module - main event loop
//!
//! Owns every component for the life of the process: the hotkey listener
//! feeds triggers to the orchestrator until Ctrl+C, SIGTERM, or the
//! listener closing ends the loop.

use crate::config::Config;
use crate::error::Result;
use crate::hotkey::{self, HotkeyEvent, HotkeyListener};
use crate::mode::RewriteMode;
use crate::notification::{DesktopNotifier, Notifier};
use crate::orchestrator::{Dispatch, Orchestrator, Pipeline, RequestOutcome, NOTIFICATION_TITLE};
use crate::rewrite::RewriteClient;
use crate::selection::ClipboardSelection;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Application context: configuration plus the running components
pub struct Daemon {
    config: Config,
    orchestrator: Orchestrator,
    listener: Box<dyn HotkeyListener>,
    notifier: Arc<dyn Notifier>,
    /// Most recently started request
    in_flight: Option<JoinHandle<RequestOutcome>>,
    running: bool,
}

impl Daemon {
    /// Build every component from a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        tracing::info!("Initializing rewrite client...");
        let client = RewriteClient::from_config(&config)?;

        tracing::info!("Initializing selection handler...");
        let selection = ClipboardSelection::system()?;

        tracing::info!("Initializing hotkey listener...");
        let listener = hotkey::create_listener(config.hotkeys())?;

        let notifier: Arc<dyn Notifier> = Arc::new(DesktopNotifier);
        let pipeline = Pipeline::new(
            client,
            Box::new(selection),
            notifier.clone(),
            config.ui.clone(),
        );

        tracing::info!("Initialization complete");
        Ok(Self::from_parts(
            config,
            Orchestrator::new(pipeline),
            listener,
            notifier,
        ))
    }

    /// Assemble a daemon from prebuilt components
    pub fn from_parts(
        config: Config,
        orchestrator: Orchestrator,
        listener: Box<dyn HotkeyListener>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            orchestrator,
            listener,
            notifier,
            in_flight: None,
            running: false,
        }
    }

    /// Run until Ctrl+C or SIGTERM
    pub async fn run(&mut self) -> Result<()> {
        #[cfg(unix)]
        let shutdown = {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = signal(SignalKind::terminate())?;

            async move {
                tokio::select! {
                    // Handle graceful shutdown (SIGINT from Ctrl+C)
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Received SIGINT, shutting down...");
                    }
                    // Handle graceful shutdown (SIGTERM from systemctl stop)
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, shutting down...");
                    }
                }
            }
        };

        #[cfg(not(unix))]
        let shutdown = async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl+C, shutting down...");
            }
        };

        self.run_until(shutdown).await
    }

    /// Run the event loop until `shutdown` resolves or the listener closes
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        if self.running {
            tracing::warn!("Already running");
            return Ok(());
        }

        tracing::info!("Starting hotkey listener...");
        let mut events = self.listener.start().await?;
        self.running = true;

        self.print_banner();
        self.notify("Ready to help!").await;

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(HotkeyEvent { mode }) => self.dispatch(mode),
                    None => {
                        tracing::warn!("Hotkey listener closed, shutting down...");
                        break;
                    }
                },

                _ = &mut shutdown => break,
            }
        }

        self.shutdown().await
    }

    fn dispatch(&mut self, mode: RewriteMode) {
        match self.orchestrator.trigger(mode) {
            Dispatch::Started(handle) => self.in_flight = Some(handle),
            Dispatch::Busy => {}
        }
    }

    /// Stop the listener and wait for an in-flight request to finish
    pub async fn shutdown(&mut self) -> Result<()> {
        if !self.running {
            return Ok(());
        }

        tracing::info!("Stopping redraft...");
        println!("\nStopping redraft...");

        let stopped = self.listener.stop().await;

        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                tracing::info!("Waiting for in-flight request to finish...");
            }
            match handle.await {
                Ok(outcome) => tracing::debug!("Last request finished: {:?}", outcome),
                Err(e) => tracing::warn!("Request task failed during shutdown: {}", e),
            }
        }

        self.running = false;
        stopped?;

        tracing::info!("Redraft stopped");
        println!("Stopped successfully\n");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    fn print_banner(&self) {
        println!("\nRedraft is running!");
        println!("\nAvailable hotkeys:");
        for binding in self.listener.bindings() {
            println!("  {:20} - {}", binding.combo_str, binding.mode.description());
        }

        println!("\nTips:");
        println!("  1. Select text in any application");
        println!("  2. Press a hotkey to improve the text");
        println!("  3. Text will be automatically replaced");
        println!("\nPress Ctrl+C to stop\n");
    }

    async fn notify(&self, message: &str) {
        if self.config.ui.show_notifications {
            self.notifier
                .notify(NOTIFICATION_TITLE, message, Duration::from_secs(2))
                .await;
        }
    }
}
