//! Point-in-time health reporting.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::ServiceError;
use crate::gpu::{round2, GpuProbe, GpuStatus};
use crate::session::ModelSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

impl HealthStatus {
    pub fn from_readiness(model_ready: bool) -> Self {
        if model_ready {
            HealthStatus::Ok
        } else {
            HealthStatus::Degraded
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub uptime_seconds: f64,
    pub model_ready: bool,
    pub model_name: Option<String>,
    pub device: String,
    pub gpu: Option<GpuStatus>,
}

/// Upper bound on one telemetry probe before the snapshot goes without it.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HealthMonitor {
    session: Arc<ModelSession>,
    probe: Arc<dyn GpuProbe>,
    started_at: Instant,
    probe_timeout: Duration,
}

impl HealthMonitor {
    pub fn new(session: Arc<ModelSession>, probe: Arc<dyn GpuProbe>) -> Self {
        Self::with_start(session, probe, Instant::now())
    }

    /// Monitor whose uptime counts from `started_at`.
    pub fn with_start(
        session: Arc<ModelSession>,
        probe: Arc<dyn GpuProbe>,
        started_at: Instant,
    ) -> Self {
        Self {
            session,
            probe,
            started_at,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    pub fn uptime_seconds(&self) -> f64 {
        round2(self.started_at.elapsed().as_secs_f64())
    }

    /// Build a snapshot. An unready model is reported as
    /// [`ServiceError::ModelNotReady`] carrying the snapshot.
    ///
    /// Telemetry is probed on every call.
    pub async fn get_status(&self) -> Result<HealthSnapshot, ServiceError> {
        let uptime_seconds = self.uptime_seconds();
        let model_ready = self.session.is_loaded();
        let model_name = Some(self.session.model_name().to_string());
        let gpu = self.gpu_status().await;

        let snapshot = HealthSnapshot {
            status: HealthStatus::from_readiness(model_ready),
            uptime_seconds,
            model_ready,
            model_name: model_name.clone(),
            device: if gpu.is_some() { "cuda" } else { "cpu" }.to_string(),
            gpu,
        };

        if !model_ready {
            return Err(ServiceError::ModelNotReady {
                model_name,
                snapshot: Box::new(snapshot),
            });
        }

        Ok(snapshot)
    }

    async fn gpu_status(&self) -> Option<GpuStatus> {
        let probe = Arc::clone(&self.probe);
        let task = tokio::task::spawn_blocking(move || probe.gpu_status());
        // A hung probe keeps its blocking thread but no longer holds up the caller.
        match tokio::time::timeout(self.probe_timeout, task).await {
            Ok(Ok(Ok(gpu))) => Some(gpu),
            Ok(Ok(Err(e))) => {
                tracing::debug!("GPU telemetry unavailable: {}", e);
                None
            }
            Ok(Err(e)) => {
                tracing::warn!("GPU probe task failed: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "GPU probe did not answer within {:?}",
                    self.probe_timeout
                );
                None
            }
        }
    }
}
