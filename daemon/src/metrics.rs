//! In-process request and system metrics, rendered in the Prometheus text
//! exposition format.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use llmapi_core::GpuProbe;
use sysinfo::System;

/// Prometheus client default latency buckets, in seconds.
const LATENCY_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// f64 gauge stored as raw bits
#[derive(Default)]
struct Gauge(AtomicU64);

impl Gauge {
    fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }
}

#[derive(Default)]
struct Histogram {
    buckets: [u64; LATENCY_BUCKETS.len()],
    sum: f64,
    count: u64,
}

impl Histogram {
    fn observe(&mut self, value: f64) {
        for (bound, bucket) in LATENCY_BUCKETS.iter().zip(self.buckets.iter_mut()) {
            if value <= *bound {
                *bucket += 1;
            }
        }
        self.sum += value;
        self.count += 1;
    }
}

pub struct Metrics {
    requests_total: AtomicU64,
    latency: Mutex<Histogram>,
    cpu_usage: Gauge,
    gpu_usage: Gauge,
    system: Mutex<System>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            latency: Mutex::new(Histogram::default()),
            cpu_usage: Gauge::default(),
            gpu_usage: Gauge::default(),
            system: Mutex::new(System::new()),
        }
    }

    /// Count one generate call and record how long it took.
    pub fn observe_request(&self, elapsed: Duration) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.latency
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .observe(elapsed.as_secs_f64());
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    /// Sample CPU and GPU utilization. Blocking.
    ///
    /// A failing GPU probe leaves the previous GPU value in place.
    pub fn refresh_system(&self, gpu: &dyn GpuProbe) {
        let cpu = {
            let mut system = self.system.lock().unwrap_or_else(|e| e.into_inner());
            system.refresh_cpu_usage();
            f64::from(system.global_cpu_usage())
        };
        self.cpu_usage.set(cpu);

        match gpu.utilization_percent() {
            Ok(value) => self.gpu_usage.set(value),
            Err(e) => tracing::trace!("GPU utilization unavailable: {}", e),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(out, "# HELP llm_requests_total Total number of requests to the LLM model");
        let _ = writeln!(out, "# TYPE llm_requests_total counter");
        let _ = writeln!(out, "llm_requests_total {}", self.requests_total());

        {
            let histogram = self.latency.lock().unwrap_or_else(|e| e.into_inner());
            let _ = writeln!(out, "# HELP llm_request_latency_seconds LLM model response time");
            let _ = writeln!(out, "# TYPE llm_request_latency_seconds histogram");
            for (bound, count) in LATENCY_BUCKETS.iter().zip(histogram.buckets.iter()) {
                let _ = writeln!(
                    out,
                    "llm_request_latency_seconds_bucket{{le=\"{}\"}} {}",
                    bound, count
                );
            }
            let _ = writeln!(
                out,
                "llm_request_latency_seconds_bucket{{le=\"+Inf\"}} {}",
                histogram.count
            );
            let _ = writeln!(out, "llm_request_latency_seconds_sum {}", histogram.sum);
            let _ = writeln!(out, "llm_request_latency_seconds_count {}", histogram.count);
        }

        let _ = writeln!(out, "# HELP system_cpu_usage_percent CPU usage in percent");
        let _ = writeln!(out, "# TYPE system_cpu_usage_percent gauge");
        let _ = writeln!(out, "system_cpu_usage_percent {}", self.cpu_usage.get());

        let _ = writeln!(out, "# HELP gpu_usage_percent GPU usage in percent (if available)");
        let _ = writeln!(out, "# TYPE gpu_usage_percent gauge");
        let _ = writeln!(out, "gpu_usage_percent {}", self.gpu_usage.get());

        out
    }
}
