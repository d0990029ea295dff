//! Health check handler
//!
//! Reports whether the credential store answers and what the revocation
//! registry is holding. A store that does not answer makes the service
//! `degraded` with a 503.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::AuthService;

#[derive(Clone)]
pub struct HealthState {
    pub auth: Arc<AuthService>,
    pub started_at: Arc<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

impl HealthStatus {
    fn http_status(self) -> StatusCode {
        match self {
            HealthStatus::Ok => StatusCode::OK,
            HealthStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Result of one round-trip to the credential store
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoreCheck {
    pub reachable: bool,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RevocationSummary {
    /// Revoked tokens not yet past their expiry
    pub revoked_tokens: usize,
    /// Whether revocations are written through to the database
    pub persisted: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub store: StoreCheck,
    pub revocations: RevocationSummary,
}

async fn check_store(auth: &AuthService) -> StoreCheck {
    let started = Instant::now();
    let reachable = match auth.check_store().await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Credential store did not answer the health check");
            false
        }
    };
    StoreCheck {
        reachable,
        latency_ms: millis(started.elapsed()),
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Credential store reachable", body = HealthReport),
        (status = 503, description = "Credential store unreachable", body = HealthReport)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthReport>) {
    let store = check_store(&state.auth).await;
    let status = if store.reachable {
        HealthStatus::Ok
    } else {
        HealthStatus::Degraded
    };

    let report = HealthReport {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        store,
        revocations: RevocationSummary {
            revoked_tokens: state.auth.registry().revoked_count(),
            persisted: state.auth.revocation_store().is_some(),
        },
    };

    (status.http_status(), Json(report))
}
