//! Accelerator telemetry.
//!
//! Telemetry is best-effort. Probes report failures as
//! [`ServiceError::GpuStatusUnavailable`] and callers decide to drop them.

use serde::{Deserialize, Serialize};
use std::process::Command;

use crate::error::ServiceError;

/// Memory snapshot of the first accelerator device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuStatus {
    pub name: String,
    pub memory_total_mb: f64,
    pub memory_used_mb: f64,
    pub memory_free_mb: f64,
}

/// Source of accelerator telemetry. Probes block, so async callers should
/// run them on a blocking thread.
pub trait GpuProbe: Send + Sync {
    fn gpu_status(&self) -> Result<GpuStatus, ServiceError>;

    /// Utilization of the first device, 0-100.
    fn utilization_percent(&self) -> Result<f64, ServiceError>;
}

/// Probe backed by `nvidia-smi`
#[derive(Debug, Clone, Default)]
pub struct NvidiaSmiProbe;

impl NvidiaSmiProbe {
    fn query(fields: &str) -> Result<String, ServiceError> {
        let output = Command::new("nvidia-smi")
            .arg(format!("--query-gpu={}", fields))
            .args(["--format=csv,noheader,nounits", "--id=0"])
            .output()
            .map_err(|e| unavailable(format!("failed to run nvidia-smi: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(unavailable(format!(
                "nvidia-smi exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .ok_or_else(|| unavailable("nvidia-smi reported no devices".to_string()))
    }
}

impl GpuProbe for NvidiaSmiProbe {
    fn gpu_status(&self) -> Result<GpuStatus, ServiceError> {
        let line = Self::query("name,memory.total,memory.used,memory.free")?;
        parse_memory_line(&line)
    }

    fn utilization_percent(&self) -> Result<f64, ServiceError> {
        let line = Self::query("utilization.gpu")?;
        parse_number(&line)
    }
}

fn unavailable(details: String) -> ServiceError {
    ServiceError::GpuStatusUnavailable { details }
}

fn parse_number(field: &str) -> Result<f64, ServiceError> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|_| unavailable(format!("unexpected nvidia-smi value: {:?}", field)))
}

/// Parse a `name, total, used, free` line (MiB, no units).
pub fn parse_memory_line(line: &str) -> Result<GpuStatus, ServiceError> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    let [name, total, used, free] = parts.as_slice() else {
        return Err(unavailable(format!("unexpected nvidia-smi output: {:?}", line)));
    };

    Ok(GpuStatus {
        name: name.to_string(),
        memory_total_mb: round2(parse_number(total)?),
        memory_used_mb: round2(parse_number(used)?),
        memory_free_mb: round2(parse_number(free)?),
    })
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
