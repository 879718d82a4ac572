//! # System Constants
//!
//! Operational defaults and sentinels for the continuation runtime. These
//! mirror the limits typically imposed by scripting hosts: a hard wall-clock
//! execution ceiling per invocation and a small quota of outstanding
//! one-shot timers.

use std::time::Duration;

/// Default wall-clock budget for a single invocation leg (5 minutes).
pub const DEFAULT_TIMEOUT_BUDGET: Duration = Duration::from_millis(300_000);

/// Default delay before a registered continuation fires (1 minute).
pub const DEFAULT_RESUME_DELAY: Duration = Duration::from_millis(60_000);

/// Default fan-out exponent for parallel runs (2^4 = 16 segments).
pub const DEFAULT_SPLIT_FACTOR: u8 = 4;

/// Upper limit on the fan-out exponent.
pub const MAX_SPLIT_FACTOR: u8 = 4;

/// Outstanding one-shot timer limit typical of scripting hosts.
pub const DEFAULT_TIMER_QUOTA: usize = 20;

/// Entry-point name a host reports for anonymous functions. A timer cannot
/// address an anonymous function by name, so it is never schedulable.
pub const ANONYMOUS_ENTRY_POINT: &str = "anonymous";

/// Default namespace prefix for persisted cursor keys, so deployments that
/// share one property store do not collide.
pub const DEFAULT_STORE_NAMESPACE: &str = "longrun";
