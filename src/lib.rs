//! CineBook API: theatre-owner onboarding behind a liveness-only health check,
//! plus the operator tooling (readiness gate, revision generator) that ships
//! in the same binary.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod owners;
pub mod readiness;
pub mod revision;
pub mod telemetry;
pub mod validation;

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use metrics_exporter_prometheus::PrometheusHandle;

pub use api::router;

#[derive(Clone)]
pub struct AppState {
    pub db: sea_orm::DatabaseConnection,
    pub metrics: PrometheusHandle,
    pub auth_limiter: Arc<DefaultDirectRateLimiter>,
}

impl AppState {
    pub fn new(
        db: sea_orm::DatabaseConnection,
        metrics: PrometheusHandle,
        auth_per_second: NonZeroU32,
    ) -> Self {
        Self {
            db,
            metrics,
            auth_limiter: Arc::new(RateLimiter::direct(Quota::per_second(auth_per_second))),
        }
    }
}
