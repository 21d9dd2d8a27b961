//! Database readiness gate.
//!
//! Mirrors the compose healthcheck: probe on a fixed interval, give each
//! attempt a timeout, and give up after a bounded number of consecutive
//! failures. `serve` refuses to bind its listener until the gate reports
//! [`ReadinessState::Healthy`].

use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use sea_orm::{DatabaseConnection, DbErr};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    Starting,
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone)]
pub struct ProbePolicy {
    pub interval: Duration,
    pub timeout: Duration,
    pub retries: NonZeroU32,
}

/// A single connectivity check against a dependency.
pub trait Probe {
    type Error: std::fmt::Display;

    fn check(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

impl Probe for DatabaseConnection {
    type Error = DbErr;

    async fn check(&self) -> Result<(), DbErr> {
        self.ping().await
    }
}

/// Folds probe outcomes into a readiness state. `Healthy` and `Unhealthy`
/// are terminal.
#[derive(Debug)]
pub struct ReadinessTracker {
    state: ReadinessState,
    failures: u32,
    retries: NonZeroU32,
}

impl ReadinessTracker {
    pub fn new(retries: NonZeroU32) -> Self {
        Self {
            state: ReadinessState::Starting,
            failures: 0,
            retries,
        }
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn observe(&mut self, probe_ok: bool) -> ReadinessState {
        if self.state != ReadinessState::Starting {
            return self.state;
        }
        if probe_ok {
            self.state = ReadinessState::Healthy;
        } else {
            self.failures += 1;
            if self.failures >= self.retries.get() {
                self.state = ReadinessState::Unhealthy;
            }
        }
        self.state
    }
}

/// Polls `probe` until it succeeds or the retry budget is spent.
pub async fn wait_until_ready<P: Probe>(probe: &P, policy: &ProbePolicy) -> ReadinessState {
    let mut tracker = ReadinessTracker::new(policy.retries);

    loop {
        let outcome = tokio::time::timeout(policy.timeout, probe.check()).await;
        let probe_ok = match outcome {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!(attempt = tracker.failures() + 1, error = %err, "readiness probe failed");
                false
            }
            Err(_) => {
                warn!(
                    attempt = tracker.failures() + 1,
                    timeout_ms = policy.timeout.as_millis() as u64,
                    "readiness probe timed out"
                );
                false
            }
        };

        match tracker.observe(probe_ok) {
            ReadinessState::Starting => tokio::time::sleep(policy.interval).await,
            ReadinessState::Healthy => {
                info!("database is ready");
                return ReadinessState::Healthy;
            }
            ReadinessState::Unhealthy => {
                warn!(retries = policy.retries.get(), "database never became ready");
                return ReadinessState::Unhealthy;
            }
        }
    }
}
