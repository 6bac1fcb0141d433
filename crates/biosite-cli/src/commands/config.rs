//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use biosite_core::Config;

use crate::output::{Output, OutputFormat};

/// Keys accepted by `config set`
const KEYS: &str = "api_url, data_dir, public_host, request_timeout_secs, log_file";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => output.json(&config),
        OutputFormat::Quiet => {
            println!("{}", config.api_url);
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  api_url:              {}", config.api_url);
            println!("  data_dir:             {}", config.data_dir.display());
            println!("  public_host:          {}", config.public_host);
            println!(
                "  request_timeout_secs: {}",
                config
                    .request_timeout_secs
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!(
                "  log_file:             {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    let mut config = Config::load_file(&save_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let unset = value.is_empty() || value == "none";
    match key {
        "api_url" => {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                bail!("api_url must start with http:// or https://");
            }
            config.api_url = value.trim_end_matches('/').to_string();
        }
        "data_dir" => {
            config.data_dir = value.into();
        }
        "public_host" => {
            if unset {
                bail!("public_host cannot be empty");
            }
            config.public_host = value.to_string();
        }
        "request_timeout_secs" => {
            config.request_timeout_secs = if unset || value == "0" {
                None
            } else {
                Some(value.parse().context(
                    "Invalid value for request_timeout_secs. Use a number of seconds.",
                )?)
            };
        }
        "log_file" => {
            config.log_file = if unset { None } else { Some(value.into()) };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                KEYS
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "api_url", "https://api.example.com/").unwrap();
        assert_eq!(config.api_url, "https://api.example.com");

        apply(&mut config, "request_timeout_secs", "15").unwrap();
        assert_eq!(config.request_timeout_secs, Some(15));
        apply(&mut config, "request_timeout_secs", "none").unwrap();
        assert_eq!(config.request_timeout_secs, None);

        apply(&mut config, "log_file", "/tmp/biosite.log").unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/biosite.log")));
        apply(&mut config, "log_file", "").unwrap();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut config = Config::default();
        assert!(apply(&mut config, "api_url", "localhost:3000").is_err());
        assert!(apply(&mut config, "request_timeout_secs", "soon").is_err());
        assert!(apply(&mut config, "public_host", "").is_err());
        assert!(apply(&mut config, "sync_url", "x").is_err());
    }

    #[test]
    fn test_set_writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let data_dir = dir.path().join("data");
        std::fs::write(&path, format!("data_dir = {:?}\n", data_dir.display().to_string())).unwrap();
        let output = Output::new(OutputFormat::Quiet);

        set(
            "public_host".to_string(),
            "links.example".to_string(),
            Some(&path),
            &output,
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("public_host = \"links.example\""));
    }

    #[test]
    fn test_set_keeps_other_file_values() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"https://api.example.com\"\nrequest_timeout_secs = 20\n",
        )
        .unwrap();
        let output = Output::new(OutputFormat::Quiet);

        set("log_file".to_string(), "none".to_string(), Some(&path), &output).unwrap();

        let saved = Config::load_file(&path).unwrap();
        assert_eq!(saved.api_url, "https://api.example.com");
        assert_eq!(saved.request_timeout_secs, Some(20));
        assert!(saved.log_file.is_none());
    }
}
