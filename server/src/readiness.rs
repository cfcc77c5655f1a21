//! One-shot readiness probe.
//!
//! # Design
//! `Readiness` is created as early as possible in `main`, which fixes the
//! start instant. `probe` pings the store once; the outcome is written into a
//! `OnceLock`, so it is recorded at most once and every handler thread sees
//! it after it is set. A failed ping is final: the service stays not-ready
//! until restart.

use std::sync::OnceLock;
use std::time::Instant;

use crate::store::TodoStore;

#[derive(Debug)]
pub struct Readiness {
    started: Instant,
    /// `Some(ms)` once the store answered, `None` if the ping failed.
    outcome: OnceLock<Option<i64>>,
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

impl Readiness {
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(started: Instant) -> Self {
        Self {
            started,
            outcome: OnceLock::new(),
        }
    }

    /// Pings `store` unless an outcome is already recorded. Never fails:
    /// errors are logged and turn into "not ready".
    pub async fn probe(&self, store: &dyn TodoStore) -> bool {
        if let Some(outcome) = self.outcome.get() {
            return outcome.is_some();
        }
        let outcome = match store.ping().await {
            Ok(()) => {
                let startup_ms =
                    i64::try_from(self.started.elapsed().as_millis()).unwrap_or(i64::MAX);
                tracing::info!(startup_ms, "APP_READY_MS={startup_ms}");
                Some(startup_ms)
            }
            Err(error) => {
                tracing::error!(%error, "failed to connect to the todo store");
                None
            }
        };
        let _ = self.outcome.set(outcome);
        self.is_ready()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.outcome.get(), Some(Some(_)))
    }

    /// Startup duration in milliseconds, or `-1` when not ready.
    pub fn startup_time_ms(&self) -> i64 {
        match self.outcome.get() {
            Some(Some(ms)) => *ms,
            _ => -1,
        }
    }
}
