use anyhow::{Context, Result};
use llmapi_core::HealthSnapshot;
use serde_json::Value;

pub async fn execute(url: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let url = format!("{}/health", url.trim_end_matches('/'));

    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Server is not reachable at {}. Start it with `llmapi serve`", url))?;

    let status = response.status();
    if status.is_success() {
        let snapshot: HealthSnapshot = response.json().await?;
        print_snapshot(&snapshot);
        return Ok(());
    }

    let body: Value = response.json().await.unwrap_or(Value::Null);
    println!("Server responded {}", status);
    if let Some(detail) = body["detail"].as_str() {
        println!("  {}", detail);
    }
    if let Ok(snapshot) = serde_json::from_value::<HealthSnapshot>(body["health"].clone()) {
        println!();
        print_snapshot(&snapshot);
    }

    Ok(())
}

fn print_snapshot(snapshot: &HealthSnapshot) {
    println!("llmapi status\n");
    println!("Status: {:?}", snapshot.status);
    println!("Uptime: {:.2}s", snapshot.uptime_seconds);
    println!(
        "Model: {} ({})",
        snapshot.model_name.as_deref().unwrap_or("unknown"),
        if snapshot.model_ready { "ready" } else { "not ready" }
    );
    println!("Device: {}", snapshot.device);
    match &snapshot.gpu {
        Some(gpu) => println!(
            "GPU: {} ({:.0} / {:.0} MB used, {:.0} MB free)",
            gpu.name, gpu.memory_used_mb, gpu.memory_total_mb, gpu.memory_free_mb
        ),
        None => println!("GPU: unavailable"),
    }
}
