use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{PoisonError, RwLock};

use crate::metrics::{BACKEND_CONSECUTIVE_FAILURES, BACKEND_HEALTHY};

/// Point-in-time copy of the backend health telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionSnapshot {
    pub healthy: bool,
    pub failure_count: u32,
    pub last_checked_at: Option<DateTime<Utc>>,
}

/// Advisory health of the generation backend. Updated after every attempt;
/// it never decides whether an attempt is made.
#[derive(Debug)]
pub struct ConnectionState {
    inner: RwLock<ConnectionSnapshot>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionState {
    pub fn new() -> Self {
        BACKEND_HEALTHY.set(1);
        BACKEND_CONSECUTIVE_FAILURES.set(0);
        Self {
            inner: RwLock::new(ConnectionSnapshot {
                healthy: true,
                failure_count: 0,
                last_checked_at: None,
            }),
        }
    }

    pub fn record_success(&self) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.healthy = true;
        state.failure_count = 0;
        state.last_checked_at = Some(Utc::now());

        BACKEND_HEALTHY.set(1);
        BACKEND_CONSECUTIVE_FAILURES.set(0);
    }

    /// Marks the backend unhealthy and returns the new consecutive failure count.
    pub fn record_failure(&self) -> u32 {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.healthy = false;
        state.failure_count = state.failure_count.saturating_add(1);
        state.last_checked_at = Some(Utc::now());

        BACKEND_HEALTHY.set(0);
        BACKEND_CONSECUTIVE_FAILURES.set(i64::from(state.failure_count));
        state.failure_count
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_healthy(&self) -> bool {
        self.snapshot().healthy
    }
}
