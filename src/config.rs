use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use tracing::error;

/// Load a configuration file, evaluating `.pkl` files through the `pkl` CLI and
/// reading anything else as JSON.
pub fn load_config<T: DeserializeOwned>(config_path: impl AsRef<Path>) -> Result<T> {
    let config_path = config_path.as_ref();
    match config_path.extension().and_then(|e| e.to_str()) {
        Some("pkl") => load_pkl(config_path),
        _ => load_json(config_path),
    }
}

pub fn load_json<T: DeserializeOwned>(config_path: impl AsRef<Path>) -> Result<T> {
    let config_path = config_path.as_ref();
    let json_str = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config {}", config_path.display()))?;
    let config: T = serde_json::from_str(&json_str).context("Failed to parse config json")?;
    Ok(config)
}

pub fn load_pkl<T: DeserializeOwned>(config_path: impl AsRef<Path>) -> Result<T> {
    let config_path = config_path.as_ref();
    let output = Command::new("pkl")
        .arg("eval")
        .arg("-f")
        .arg("json")
        .arg(config_path)
        .output()
        .context("Failed to execute pkl command")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("pkl eval of {} failed: {}", config_path.display(), stderr);
        return Err(anyhow!("pkl eval of {} failed: {}", config_path.display(), stderr));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    let config: T = serde_json::from_str(&json_str).context("Failed to parse config json")?;
    Ok(config)
}
