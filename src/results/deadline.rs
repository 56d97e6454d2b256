//! Cooperative time budget for one aggregator

use std::time::{Duration, Instant};

/// Elapsed-time check polled once per pulled item.
///
/// The clock starts on [`Deadline::start`], normally right before the first
/// pull, so every aggregator measures its own budget.
#[derive(Debug, Clone)]
pub struct Deadline {
    limit: Option<Duration>,
    started: Option<Instant>,
}

impl Deadline {
    /// `None` means unbounded; negative or non-finite budgets count as zero
    pub fn new(timeout_secs: Option<f64>) -> Self {
        let limit = timeout_secs.map(|secs| {
            if secs.is_finite() && secs > 0.0 {
                Duration::from_secs_f64(secs)
            } else {
                Duration::ZERO
            }
        });
        Self {
            limit,
            started: None,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }

    /// Whether the budget is spent; starts the clock if needed
    pub fn expired(&mut self) -> bool {
        self.start();
        match self.limit {
            Some(limit) => self.elapsed() >= limit,
            None => false,
        }
    }
}
