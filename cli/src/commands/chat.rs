//! Single-shot chat command

use anyhow::{Context, Result};
use serde_json::Value;

pub async fn execute(url: &str, prompt: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let url = format!("{}/api/chat", url.trim_end_matches('/'));

    let response = client
        .post(&url)
        .json(&serde_json::json!({ "message": prompt }))
        .send()
        .await
        .with_context(|| format!("Server is not reachable at {}. Start it with `llmapi serve`", url))?;

    let status = response.status();
    let body: Value = response.json().await?;

    if status.is_success() {
        if let Some(text) = body["response"].as_str() {
            println!("{}", text);
        }
    } else {
        let detail = body["detail"].as_str().unwrap_or("unknown error");
        let error_type = body["error_type"].as_str().unwrap_or("unknown");
        anyhow::bail!("{} ({}): {}", status, error_type, detail);
    }

    Ok(())
}
