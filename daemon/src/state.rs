use anyhow::Result;
use llmapi_backend_api::ChatBackend;
use llmapi_backend_ollama::{OllamaBackend, OllamaConfig};
use llmapi_core::{Config, GpuProbe, HealthMonitor, ModelSession, NvidiaSmiProbe};
use std::sync::Arc;
use std::time::Duration;

use crate::metrics::Metrics;

/// Everything a request handler needs, built once at startup.
pub struct AppState {
    pub session: Arc<ModelSession>,
    pub health: HealthMonitor,
    pub metrics: Arc<Metrics>,
    pub gpu: Arc<dyn GpuProbe>,
}

impl AppState {
    pub fn new(session: Arc<ModelSession>, gpu: Arc<dyn GpuProbe>) -> Self {
        Self {
            health: HealthMonitor::new(Arc::clone(&session), Arc::clone(&gpu)),
            session,
            metrics: Arc::new(Metrics::new()),
            gpu,
        }
    }

    /// Wire the Ollama client and `nvidia-smi` telemetry from config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend: Arc<dyn ChatBackend> = Arc::new(OllamaBackend::new(OllamaConfig {
            base_url: config.model.backend_url.clone(),
            connect_timeout: Duration::from_secs(config.backend.connect_timeout_secs),
            request_timeout: Duration::from_secs(config.backend.request_timeout_secs),
        })?);
        let session = Arc::new(ModelSession::new(config.model.name.clone(), backend));

        Ok(Self::new(session, Arc::new(NvidiaSmiProbe)))
    }

    /// Verify the configured model. Failures are logged and the service keeps
    /// running unloaded, so `generate` fails fast until restart.
    pub async fn initialize_model(&self) {
        tracing::info!(
            "Loading model {} from {}",
            self.session.model_name(),
            self.session.backend_endpoint()
        );
        match self.session.initialize().await {
            Ok(()) => tracing::info!("Model {} loaded successfully", self.session.model_name()),
            Err(e) => tracing::error!("{}", e),
        }
    }

    /// Refresh CPU/GPU gauges off the request path.
    pub fn refresh_system_metrics(&self) {
        let metrics = Arc::clone(&self.metrics);
        let gpu = Arc::clone(&self.gpu);
        tokio::task::spawn_blocking(move || metrics.refresh_system(gpu.as_ref()));
    }
}
