// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: non-empty paths,
//! ranking bounds, sampling ranges and URL schemes. All problems are
//! collected rather than failing on the first.

use crate::diagnostic::ConfigError;
use crate::model::{RecallConfig, StorageBackend};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &RecallConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.app.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::invalid(
            "app.log_level",
            format!(
                "`{}` is not one of {}",
                config.app.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if config.app.data_dir.trim().is_empty() {
        errors.push(ConfigError::invalid("app.data_dir", "must not be empty"));
    }

    let storage = &config.storage;
    if storage.backend != StorageBackend::KeyValue && storage.database_path.trim().is_empty() {
        errors.push(ConfigError::invalid(
            "storage.database_path",
            "must not be empty",
        ));
    }
    if storage.backend != StorageBackend::Sqlite && storage.kv_path.trim().is_empty() {
        errors.push(ConfigError::invalid("storage.kv_path", "must not be empty"));
    }

    let search = &config.search;
    if search.top_k == 0 {
        errors.push(ConfigError::invalid("search.top_k", "must be at least 1"));
    }
    if search.context_results == 0 {
        errors.push(ConfigError::invalid(
            "search.context_results",
            "must be at least 1",
        ));
    }
    if !(-1.0..=1.0).contains(&search.similarity_threshold) {
        errors.push(ConfigError::invalid(
            "search.similarity_threshold",
            format!(
                "must be between -1.0 and 1.0, got {}",
                search.similarity_threshold
            ),
        ));
    }

    if !(0.0..=2.0).contains(&config.completion.temperature) {
        errors.push(ConfigError::invalid(
            "completion.temperature",
            format!(
                "must be between 0.0 and 2.0, got {}",
                config.completion.temperature
            ),
        ));
    }
    if config.completion.max_tokens == 0 {
        errors.push(ConfigError::invalid(
            "completion.max_tokens",
            "must be at least 1",
        ));
    }

    check_url(&mut errors, "embedding.base_url", &config.embedding.base_url);
    check_url(&mut errors, "completion.base_url", &config.completion.base_url);
    check_url(&mut errors, "speech.base_url", &config.speech.base_url);
    check_url(&mut errors, "speech.model_url", &config.speech.model_url);

    for (key, secs) in [
        ("embedding.timeout_secs", config.embedding.timeout_secs),
        ("completion.timeout_secs", config.completion.timeout_secs),
        ("speech.timeout_secs", config.speech.timeout_secs),
    ] {
        if secs == 0 {
            errors.push(ConfigError::invalid(key, "must be at least 1"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ConfigError>, key: &str, url: &str) {
    let url = url.trim();
    let Some(rest) = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
    else {
        errors.push(ConfigError::invalid(
            key,
            format!("`{url}` must start with http:// or https://"),
        ));
        return;
    };
    if rest.is_empty() || rest.starts_with('/') {
        errors.push(ConfigError::invalid(key, format!("`{url}` has no host")));
    }
}
