//! # Timer Registrar
//!
//! Wraps the host's one-shot delayed-callback facility: create a future
//! invocation of a named entry point, enumerate pending ones, cancel one.
//! The id returned by `register` is the join key into the continuation
//! store and is usable before the call returns.
//!
//! Hosts cap the number of outstanding timers; [`TimerRegistrar::quota`]
//! surfaces that cap so the driver can refuse a fan-out that would not fit.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::constants::DEFAULT_TIMER_QUOTA;

/// One outstanding scheduled invocation of an entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerRegistration {
    /// Unique id; also the continuation store key for the paired cursor.
    pub id: String,
    /// Name of the function the host will invoke.
    pub entry_point: String,
    /// Earliest time the host may fire the timer.
    pub fire_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    #[error("Timer quota exhausted: {outstanding} of {quota} slots in use")]
    QuotaExhausted { outstanding: usize, quota: usize },

    #[error("Backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait TimerRegistrar: Send + Sync {
    /// Schedule a one-shot invocation of `entry_point` after `delay`.
    async fn register(
        &self,
        entry_point: &str,
        delay: Duration,
    ) -> Result<TimerRegistration, TimerError>;

    /// All registrations that have not yet fired or been cancelled.
    async fn list_pending(&self) -> Result<Vec<TimerRegistration>, TimerError>;

    /// Cancel a registration. Cancelling an unknown or already-fired id is
    /// not an error.
    async fn cancel(&self, id: &str) -> Result<(), TimerError>;

    /// Host limit on outstanding one-shot timers.
    fn quota(&self) -> usize {
        DEFAULT_TIMER_QUOTA
    }
}

/// In-memory registrar for testing and local development. Timers never
/// actually fire; tests emulate delivery by re-invoking the entry point
/// with a resumption event carrying the registration id.
pub struct InMemoryTimerRegistrar {
    quota: usize,
    pending: RwLock<HashMap<String, TimerRegistration>>,
}

impl Default for InMemoryTimerRegistrar {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTimerRegistrar {
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_TIMER_QUOTA)
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota,
            pending: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl TimerRegistrar for InMemoryTimerRegistrar {
    async fn register(
        &self,
        entry_point: &str,
        delay: Duration,
    ) -> Result<TimerRegistration, TimerError> {
        let mut pending = self.pending.write().await;
        if pending.len() >= self.quota {
            return Err(TimerError::QuotaExhausted {
                outstanding: pending.len(),
                quota: self.quota,
            });
        }
        let registration = TimerRegistration {
            id: Uuid::new_v4().to_string(),
            entry_point: entry_point.to_string(),
            fire_at: Utc::now() + chrono::Duration::milliseconds(delay.as_millis() as i64),
        };
        pending.insert(registration.id.clone(), registration.clone());
        Ok(registration)
    }

    async fn list_pending(&self) -> Result<Vec<TimerRegistration>, TimerError> {
        Ok(self.pending.read().await.values().cloned().collect())
    }

    async fn cancel(&self, id: &str) -> Result<(), TimerError> {
        self.pending.write().await.remove(id);
        Ok(())
    }

    fn quota(&self) -> usize {
        self.quota
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_list() {
        let registrar = InMemoryTimerRegistrar::new();
        let before = Utc::now();
        let registration = registrar
            .register("resume_batch", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(registration.entry_point, "resume_batch");
        assert!(registration.fire_at >= before + chrono::Duration::seconds(60));

        let pending = registrar.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, registration.id);
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let registrar = InMemoryTimerRegistrar::new();
        let registration = registrar
            .register("resume_batch", Duration::from_secs(1))
            .await
            .unwrap();

        registrar.cancel(&registration.id).await.unwrap();
        registrar.cancel(&registration.id).await.unwrap();
        assert!(registrar.list_pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quota_enforced_at_register() {
        let registrar = InMemoryTimerRegistrar::with_quota(2);
        registrar
            .register("resume_batch", Duration::from_secs(1))
            .await
            .unwrap();
        registrar
            .register("resume_batch", Duration::from_secs(1))
            .await
            .unwrap();

        let overflow = registrar
            .register("resume_batch", Duration::from_secs(1))
            .await;
        assert!(matches!(
            overflow,
            Err(TimerError::QuotaExhausted {
                outstanding: 2,
                quota: 2
            })
        ));
    }
}
