use anyhow::Result;
use llmapi_core::Config;

pub async fn execute(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    println!("Starting llmapi...");
    println!("Listening on http://{}:{}", config.server.host, config.server.port);
    println!("Model: {} via {}", config.model.name, config.model.backend_url);
    println!("\nAPI endpoints:");
    println!("  POST /api/chat - Chat with the model");
    println!("  GET  /status   - Liveness and model readiness");
    println!("  GET  /health   - Health snapshot (503 until the model is ready)");
    println!("  GET  /metrics  - Prometheus metrics");
    println!("\nPress Ctrl+C to stop.\n");

    llmapi_daemon::run_server(config).await?;

    Ok(())
}
