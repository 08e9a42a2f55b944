//! Config command - View and validate DirSync configuration
//!
//! Provides the `dirsync config` CLI command which:
//! 1. Shows the effective configuration (file plus environment overrides)
//! 2. Validates it and reports every error found

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use dirsync_core::config::{
    Config, ENV_CLIENT_ID, ENV_LOG_LEVEL, ENV_QUEUE_ADDRESS, ENV_QUEUE_NAME, ENV_SERVER_URL,
    ENV_STATE_DIR, ENV_SYNC_DIRECTORY,
};
use tracing::info;

use crate::output::{get_formatter, plural, OutputFormat};

const ENV_VARS: [&str; 7] = [
    ENV_CLIENT_ID,
    ENV_QUEUE_ADDRESS,
    ENV_QUEUE_NAME,
    ENV_SERVER_URL,
    ENV_SYNC_DIRECTORY,
    ENV_STATE_DIR,
    ENV_LOG_LEVEL,
];

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Validate the effective configuration
    Validate,
}

impl ConfigCommand {
    pub async fn execute(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(config_path, format).await,
            ConfigCommand::Validate => self.execute_validate(config_path, format).await,
        }
    }

    async fn execute_show(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format.is_json());
        let config = super::load_config(config_path)?;
        let overrides = active_overrides(|k| std::env::var(k).ok());

        info!(config_path = %config_path.display(), "Showing configuration");

        if format.is_json() {
            let json = serde_json::json!({
                "config_path": config_path.display().to_string(),
                "file_exists": config_path.exists(),
                "env_overrides": overrides,
                "snapshot_path": config.snapshot_path().display().to_string(),
                "config": serde_json::to_value(&config)
                    .context("Failed to serialize configuration to JSON")?,
            });
            formatter.print_json(&json);
            return Ok(());
        }

        if config_path.exists() {
            formatter.success(&format!("Configuration ({})", config_path.display()));
        } else {
            formatter.success(&format!(
                "Configuration (defaults, {} not found)",
                config_path.display()
            ));
        }
        if !overrides.is_empty() {
            formatter.info(&format!("Environment overrides: {}", overrides.join(", ")));
        }
        formatter.info(&format!("Baseline: {}", config.snapshot_path().display()));
        formatter.info("");

        let yaml =
            serde_yaml::to_string(&config).context("Failed to serialize configuration to YAML")?;
        for line in yaml.lines() {
            formatter.info(line);
        }
        Ok(())
    }

    async fn execute_validate(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format.is_json());

        info!(config_path = %config_path.display(), "Validating configuration");

        let errors: Vec<String> = match super::load_config(config_path) {
            Ok(config) => config.validate().iter().map(ToString::to_string).collect(),
            Err(e) => vec![format!("{e:#}")],
        };

        if format.is_json() {
            let json = serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": errors,
            });
            formatter.print_json(&json);
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", config_path.display()));
        } else {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                plural(errors.len())
            ));
            formatter.info(&format!("File: {}", config_path.display()));
            formatter.info("");
            for error in &errors {
                formatter.info(&format!("  {error}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("Configuration is invalid")
        }
    }
}

/// Names of the overlay variables set to a non-empty value
fn active_overrides<F>(lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    ENV_VARS
        .into_iter()
        .filter(|&k| lookup(k).is_some_and(|v| !v.is_empty()))
        .collect()
}
