use anyhow::Result;
use llmapi_core::Config;

pub async fn execute(key: Option<&str>, value: Option<&str>) -> Result<()> {
    // Edit the file as written; environment overrides apply only at runtime
    let mut config = Config::load_file()?;

    match (key, value) {
        // Show all config
        (None, None) => {
            println!("Configuration file: {:?}\n", Config::config_path()?);
            println!("[server]");
            println!("  host = \"{}\"", config.server.host);
            println!("  port = {}", config.server.port);
            println!();
            println!("[logging]");
            println!("  level = \"{}\"", config.logging.level);
            println!();
            println!("[model]");
            println!("  name = \"{}\"", config.model.name);
            println!("  backend_url = \"{}\"", config.model.backend_url);
            println!();
            println!("[backend]");
            println!("  connect_timeout_secs = {}", config.backend.connect_timeout_secs);
            println!("  request_timeout_secs = {}", config.backend.request_timeout_secs);
            println!();
            println!("Environment overrides: API_HOST, API_PORT, LOG_LEVEL, LLM_MODEL, OLLAMA_BASE_URL");
        }

        // Get a specific key
        (Some(key), None) => {
            let value = get_config_value(&config, key)?;
            println!("{}", value);
        }

        // Set a specific key
        (Some(key), Some(value)) => {
            set_config_value(&mut config, key, value)?;
            config.save()?;
            println!("Set {} = {}", key, value);
        }

        (None, Some(_)) => anyhow::bail!("A key is required when setting a value"),
    }

    Ok(())
}

fn get_config_value(config: &Config, key: &str) -> Result<String> {
    match key {
        "server.host" => Ok(config.server.host.clone()),
        "server.port" => Ok(config.server.port.to_string()),
        "logging.level" => Ok(config.logging.level.clone()),
        "model.name" => Ok(config.model.name.clone()),
        "model.backend_url" => Ok(config.model.backend_url.clone()),
        "backend.connect_timeout_secs" => Ok(config.backend.connect_timeout_secs.to_string()),
        "backend.request_timeout_secs" => Ok(config.backend.request_timeout_secs.to_string()),
        _ => anyhow::bail!("Unknown config key: {}", key),
    }
}

fn set_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "server.host" => config.server.host = value.to_string(),
        "server.port" => config.server.port = value.parse()?,
        "logging.level" => config.logging.level = value.to_lowercase(),
        "model.name" => config.model.name = value.to_string(),
        "model.backend_url" => config.model.backend_url = value.to_string(),
        "backend.connect_timeout_secs" => config.backend.connect_timeout_secs = value.parse()?,
        "backend.request_timeout_secs" => config.backend.request_timeout_secs = value.parse()?,
        _ => anyhow::bail!("Unknown config key: {}", key),
    }
    Ok(())
}
