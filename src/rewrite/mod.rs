//! Rate-limited rewrite client
//!
//! Wraps a [`TextGenerator`] backend with quota enforcement and retry:
//!
//! 1. Blank input and unknown modes are rejected without touching the network
//! 2. The request waits for a free slot in the 60s quota window
//! 3. Each attempt that errors or comes back empty is retried after
//!    `2^attempt` seconds, up to `max_retries` attempts in total
//! 4. The first non-empty response is returned trimmed

pub mod gemini;
pub mod rate_limit;

use crate::config::Config;
use crate::error::RewriteError;
use crate::mode::RewriteMode;
use rate_limit::RateLimiter;
use std::sync::Arc;
use std::time::Duration;

/// Sampling temperature; low for consistent corrections
pub const TEMPERATURE: f32 = 0.3;

/// Upper bound on generated tokens per request
pub const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Trait for text generation backends
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one prompt and return the raw generated text
    async fn generate(&self, prompt: &str) -> Result<String, RewriteError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Create the generator configured for this process
pub fn create_generator(config: &Config) -> Result<Arc<dyn TextGenerator>, RewriteError> {
    Ok(Arc::new(gemini::GeminiGenerator::new(&config.gemini)?))
}

/// Delay before the retry that follows `attempt` (0-based)
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(16))
}

/// Rewrites text through a generator, respecting the request quota
pub struct RewriteClient {
    generator: Arc<dyn TextGenerator>,
    limiter: RateLimiter,
    max_retries: u32,
}

impl RewriteClient {
    pub fn new(generator: Arc<dyn TextGenerator>, requests_per_minute: u32, max_retries: u32) -> Self {
        tracing::info!(
            "Rewrite client initialized ({}, {} req/min, {} attempts)",
            generator.name(),
            requests_per_minute,
            max_retries.max(1)
        );

        Self {
            generator,
            limiter: RateLimiter::new(requests_per_minute),
            max_retries: max_retries.max(1),
        }
    }

    /// Build a client from the validated configuration
    pub fn from_config(config: &Config) -> Result<Self, RewriteError> {
        Ok(Self::new(
            create_generator(config)?,
            config.quota(),
            config.gemini.max_retries,
        ))
    }

    /// Rewrite `text` under `mode` (a mode name such as "grammar_fix")
    pub async fn rewrite(&mut self, text: &str, mode: &str) -> Result<String, RewriteError> {
        if text.trim().is_empty() {
            tracing::warn!("Empty text provided");
            return Err(RewriteError::EmptyInput);
        }

        let mode: RewriteMode = mode.parse().map_err(|e| {
            tracing::error!("{}", e);
            e
        })?;

        self.limiter.acquire().await;

        let prompt = mode.prompt(text);

        for attempt in 0..self.max_retries {
            tracing::debug!(
                "Sending request (attempt {}/{})",
                attempt + 1,
                self.max_retries
            );

            match self.generator.generate(&prompt).await {
                Ok(response) if !response.trim().is_empty() => {
                    tracing::info!("Successfully improved text ({})", mode);
                    return Ok(response.trim().to_string());
                }
                Ok(_) => {
                    tracing::warn!("Empty response from {}", self.generator.name());
                }
                Err(e) => {
                    tracing::error!("API error (attempt {}): {}", attempt + 1, e);
                }
            }

            if attempt + 1 < self.max_retries {
                let delay = backoff_delay(attempt);
                tracing::info!("Retrying in {}s...", delay.as_secs());
                tokio::time::sleep(delay).await;
            }
        }

        tracing::error!("All retry attempts failed");
        Err(RewriteError::RetriesExhausted(self.max_retries))
    }
}
