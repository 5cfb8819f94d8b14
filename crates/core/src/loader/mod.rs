//! Runtime loading of the games file with bounded retries.
//!
//! One load cycle walks `Idle → Fetching → {Success, Retrying → Fetching,
//! Exhausted}` and ends in `Rendered` or `ErrorRendered` once the outcome is
//! turned into markup. Nothing re-enters the cycle afterwards.

mod retry;
mod source;

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    filter::FilterState,
    games_file::GamesFile,
    render::{self, RenderedPage},
};

pub use retry::RetryPolicy;
pub use source::{FileSource, GamesSource, HttpSource};

/// Failure of a single load attempt.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Network failure before a response arrived.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx response.
    #[error("HTTP error! status: {0}")]
    Status(u16),
    /// Body was not a JSON object of the expected shape.
    #[error("invalid games payload: {0}")]
    Payload(String),
    /// Attempt exceeded the per-attempt timeout.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),
    /// Local read failed.
    #[error("failed to read games file: {0}")]
    Io(#[from] std::io::Error),
}

/// Step of a load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Nothing has happened yet.
    Idle,
    /// Attempt `attempt` (1-based) is in flight.
    Fetching {
        /// 1-based attempt number.
        attempt: u32,
    },
    /// Attempt `attempt` failed; waiting `delay` before the next one.
    Retrying {
        /// The attempt that failed.
        attempt: u32,
        /// Wait before the next attempt.
        delay: Duration,
    },
    /// A games file was obtained.
    Success,
    /// Every attempt failed.
    Exhausted,
    /// Cards or the empty-state placeholder were rendered.
    Rendered,
    /// The error placeholder was rendered.
    ErrorRendered,
}

/// Terminal result of a load cycle. Failures never escape as errors.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The games file as read.
    Loaded(GamesFile),
    /// Sentinel for exhausted retries, carrying the last failure.
    Failed(LoadError),
}

impl LoadOutcome {
    /// True when retries were exhausted.
    pub fn is_failed(&self) -> bool {
        matches!(self, LoadOutcome::Failed(_))
    }
}

/// Everything a load cycle did.
#[derive(Debug)]
pub struct LoadReport {
    /// Final outcome.
    pub outcome: LoadOutcome,
    /// Attempts made.
    pub attempts: u32,
    /// Delays slept between attempts, in order.
    pub delays: Vec<Duration>,
    /// Phase trace of the cycle.
    pub phases: Vec<LoadPhase>,
}

impl LoadReport {
    /// Render the outcome through `filter`, closing the phase trace.
    pub fn render(&mut self, filter: &FilterState) -> RenderedPage {
        let page = render::render_outcome(&self.outcome, filter);
        self.phases.push(page.phase);
        page
    }
}

/// Fetches a games file from a [`GamesSource`] under a [`RetryPolicy`].
pub struct GamesLoader<S> {
    source: S,
    policy: RetryPolicy,
    attempt_timeout: Duration,
}

impl<S: GamesSource> GamesLoader<S> {
    /// Loader with the given policy and per-attempt timeout.
    pub fn new(source: S, policy: RetryPolicy, attempt_timeout: Duration) -> Self {
        Self {
            source,
            policy,
            attempt_timeout,
        }
    }

    /// Run one load cycle. Sleeps between attempts without blocking the runtime.
    pub async fn load(&self) -> LoadReport {
        let mut phases = vec![LoadPhase::Idle];
        let mut delays = Vec::new();
        let mut attempt = 0;

        let outcome = loop {
            attempt += 1;
            phases.push(LoadPhase::Fetching { attempt });
            debug!("loading games from {} (attempt {attempt})", self.source.describe());

            match self.attempt().await {
                Ok(file) => {
                    phases.push(LoadPhase::Success);
                    if let Some(label) = file.last_updated_label() {
                        info!("games last updated: {label}");
                    }
                    break LoadOutcome::Loaded(file);
                }
                Err(err) if self.policy.has_attempt_after(attempt) => {
                    let delay = self.policy.delay_for_attempt(attempt);
                    warn!("attempt {attempt} failed: {err}; retrying in {delay:?}");
                    phases.push(LoadPhase::Retrying { attempt, delay });
                    delays.push(delay);
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    warn!("giving up on games after {attempt} attempts: {err}");
                    phases.push(LoadPhase::Exhausted);
                    break LoadOutcome::Failed(err);
                }
            }
        };

        LoadReport {
            outcome,
            attempts: attempt,
            delays,
            phases,
        }
    }

    async fn attempt(&self) -> Result<GamesFile, LoadError> {
        let body = tokio::time::timeout(self.attempt_timeout, self.source.fetch())
            .await
            .map_err(|_| LoadError::Timeout(self.attempt_timeout))??;
        parse_games_file(&body)
    }
}

/// Parse a games file body, rejecting anything that is not a JSON object.
pub fn parse_games_file(body: &str) -> Result<GamesFile, LoadError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| LoadError::Payload(err.to_string()))?;
    if !value.is_object() {
        return Err(LoadError::Payload("expected a JSON object".to_string()));
    }
    serde_json::from_value(value).map_err(|err| LoadError::Payload(err.to_string()))
}
