//! # Run Configuration
//!
//! Per-invocation options for the execution driver. Options are immutable
//! for the duration of one leg and are not persisted across legs; the host
//! is expected to pass the same options on every invocation of the same
//! entry point.

use std::time::{Duration, Instant};

use crate::constants::{
    DEFAULT_RESUME_DELAY, DEFAULT_SPLIT_FACTOR, DEFAULT_TIMEOUT_BUDGET, MAX_SPLIT_FACTOR,
};
use crate::error::{LongrunError, Result};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Wall-clock budget for this leg. Checked between items, not
    /// preemptively: a single long callback can overshoot it.
    pub timeout_budget: Duration,
    /// Delay before a registered continuation fires.
    pub resume_delay: Duration,
    /// Fan-out exponent for parallel runs: up to 2^split_factor segments.
    pub split_factor: u8,
    /// Override for the budget clock's start; defaults to call time.
    pub clock_start: Option<Instant>,
    /// Emit per-item timing and position logs. Never changes control flow.
    pub debug: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout_budget: DEFAULT_TIMEOUT_BUDGET,
            resume_delay: DEFAULT_RESUME_DELAY,
            split_factor: DEFAULT_SPLIT_FACTOR,
            clock_start: None,
            debug: false,
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();

        if let Ok(budget_ms) = std::env::var("LONGRUN_TIMEOUT_BUDGET_MS") {
            let ms: u64 = budget_ms.parse().map_err(|e| {
                LongrunError::Configuration(format!("Invalid LONGRUN_TIMEOUT_BUDGET_MS: {e}"))
            })?;
            options.timeout_budget = Duration::from_millis(ms);
        }

        if let Ok(delay_ms) = std::env::var("LONGRUN_RESUME_DELAY_MS") {
            let ms: u64 = delay_ms.parse().map_err(|e| {
                LongrunError::Configuration(format!("Invalid LONGRUN_RESUME_DELAY_MS: {e}"))
            })?;
            options.resume_delay = Duration::from_millis(ms);
        }

        if let Ok(factor) = std::env::var("LONGRUN_SPLIT_FACTOR") {
            options.split_factor = factor.parse().map_err(|e| {
                LongrunError::Configuration(format!("Invalid LONGRUN_SPLIT_FACTOR: {e}"))
            })?;
        }

        if let Ok(debug) = std::env::var("LONGRUN_DEBUG") {
            options.debug = debug == "1" || debug.eq_ignore_ascii_case("true");
        }

        options.validate()?;
        Ok(options)
    }

    pub fn with_timeout_budget(mut self, budget: Duration) -> Self {
        self.timeout_budget = budget;
        self
    }

    pub fn with_resume_delay(mut self, delay: Duration) -> Self {
        self.resume_delay = delay;
        self
    }

    pub fn with_split_factor(mut self, factor: u8) -> Self {
        self.split_factor = factor;
        self
    }

    pub fn with_clock_start(mut self, start: Instant) -> Self {
        self.clock_start = Some(start);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Reject malformed options before any item is processed.
    pub fn validate(&self) -> Result<()> {
        if self.split_factor > MAX_SPLIT_FACTOR {
            return Err(LongrunError::Configuration(format!(
                "split_factor must be 0..={MAX_SPLIT_FACTOR}, got {}",
                self.split_factor
            )));
        }
        Ok(())
    }
}
