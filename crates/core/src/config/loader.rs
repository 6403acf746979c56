//! Configuration file loader for the `.prd-kit/` directory structure.
//!
//! Loads and merges:
//! - `config.toml`: model selection, reasoning budget, reflection bound
//! - `prompts/*.md`: per-instruction overrides of the built-in prompts
//!
//! Missing directories or files yield defaults rather than errors; only
//! unreadable or syntactically invalid files fail the load.

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::models::AppConfig;
use serde::Deserialize;
use std::path::Path;
use walkdir::WalkDir;

/// Raw shape of `config.toml`; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    model: Option<String>,
    reasoning_budget: Option<u32>,
    max_reflection_rounds: Option<u32>,
    models: Option<Vec<String>>,
}

/// Loads all configuration from the `.prd-kit/` directory under `root`.
///
/// If `.prd-kit/` does not exist, returns the default configuration.
///
/// # Errors
///
/// Returns `ConfigError` if files exist but cannot be read, or have
/// invalid TOML syntax or unknown fields.
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let kit_dir = root.join(".prd-kit");

    let mut config = AppConfig::default();
    if !kit_dir.exists() {
        return Ok(config);
    }

    apply_toml(&kit_dir, &mut config)?;
    apply_prompt_overrides(&kit_dir, &mut config)?;

    Ok(config)
}

/// Merge `config.toml` over the defaults.
fn apply_toml(kit_dir: &Path, config: &mut AppConfig) -> ConfigResult<()> {
    let config_path = kit_dir.join("config.toml");
    if !config_path.exists() {
        return Ok(());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    let raw: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path,
        source,
    })?;

    if let Some(model) = raw.model {
        config.model = model;
    }
    if let Some(budget) = raw.reasoning_budget {
        config.reasoning_budget = budget;
    }
    if let Some(rounds) = raw.max_reflection_rounds {
        config.max_reflection_rounds = rounds.clamp(1, 10);
    }
    if let Some(models) = raw.models {
        if !models.is_empty() {
            config.models = models;
        }
    }

    Ok(())
}

/// Apply `prompts/*.md` overrides; file stem selects the instruction.
fn apply_prompt_overrides(kit_dir: &Path, config: &mut AppConfig) -> ConfigResult<()> {
    let prompts_dir = kit_dir.join("prompts");
    if !prompts_dir.exists() {
        return Ok(());
    }

    for entry in WalkDir::new(&prompts_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: prompts_dir.clone(),
            source,
        })?;

        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
            continue;
        }

        let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };

        let body = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let body = body.trim().to_string();
        if body.is_empty() {
            continue;
        }

        if !config.prompts.apply_override(key, body) {
            tracing::warn!(key, "ignoring prompt override with unknown key");
        }
    }

    Ok(())
}
