use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::FailurePolicy;

use crate::DEFAULT_REQUEST_TIMEOUT;

pub const DEFAULT_CONFIG_FILE: &str = "greeter.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub request_timeout_ms: u64,
    pub failure_policy: FailurePolicy,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:4943".into(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            failure_policy: FailurePolicy::LeaveDisabled,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    request_timeout_ms: Option<u64>,
    failure_policy: Option<FailurePolicy>,
    log_filter: Option<String>,
}

/// Values supplied on the command line; each one wins over file and env.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub server_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub failure_policy: Option<FailurePolicy>,
}

/// Defaults, then the TOML file, then environment, then `overrides`.
///
/// An explicitly given config path must exist; the default `greeter.toml` is
/// optional.
pub fn load_settings(
    config_path: Option<&Path>,
    overrides: &SettingsOverrides,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    if required || path.exists() {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?;
    }

    apply_env(&mut settings, |name| std::env::var(name).ok());
    apply_overrides(&mut settings, overrides);
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_ms.filter(|v| *v > 0) {
        settings.request_timeout_ms = v;
    }
    if let Some(v) = file_cfg.failure_policy {
        settings.failure_policy = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("GREETER_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("GREETER_TIMEOUT_MS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.request_timeout_ms = parsed,
            _ => {}
        }
    }

    if let Some(v) = lookup("GREETER_FAILURE_POLICY") {
        if let Some(policy) = FailurePolicy::parse(&v) {
            settings.failure_policy = policy;
        }
    }

    if let Some(v) = lookup("RUST_LOG") {
        if !v.trim().is_empty() {
            settings.log_filter = v;
        }
    }
}

fn apply_overrides(settings: &mut Settings, overrides: &SettingsOverrides) {
    if let Some(v) = &overrides.server_url {
        settings.server_url = v.clone();
    }
    if let Some(v) = overrides.request_timeout_ms.filter(|v| *v > 0) {
        settings.request_timeout_ms = v;
    }
    if let Some(v) = overrides.failure_policy {
        settings.failure_policy = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
