use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "gallery.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub search_endpoint: String,
    pub listing_endpoint: String,
    pub listing_limit: u32,
    pub debounce_ms: u64,
    pub page_size: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            search_endpoint: "https://dummyjson.com/recipes/search".into(),
            listing_endpoint: "https://dummyjson.com/products".into(),
            listing_limit: 100,
            debounce_ms: 300,
            page_size: 6,
        }
    }
}

/// Optional overrides read from the config file; unset keys keep defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    search_endpoint: Option<String>,
    listing_endpoint: Option<String>,
    listing_limit: Option<u32>,
    debounce_ms: Option<u64>,
    page_size: Option<usize>,
}

impl ClientSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        Url::parse(&self.search_endpoint)
            .with_context(|| format!("invalid search_endpoint '{}'", self.search_endpoint))?;
        Url::parse(&self.listing_endpoint)
            .with_context(|| format!("invalid listing_endpoint '{}'", self.listing_endpoint))?;
        Ok(())
    }

    fn apply_file(&mut self, file_cfg: FileSettings) {
        if let Some(v) = file_cfg.search_endpoint {
            self.search_endpoint = v;
        }
        if let Some(v) = file_cfg.listing_endpoint {
            self.listing_endpoint = v;
        }
        if let Some(v) = file_cfg.listing_limit {
            self.listing_limit = v;
        }
        if let Some(v) = file_cfg.debounce_ms {
            self.debounce_ms = v;
        }
        if let Some(v) = file_cfg.page_size {
            self.page_size = v;
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("APP__SEARCH_ENDPOINT") {
            self.search_endpoint = v;
        }
        if let Some(v) = lookup("APP__LISTING_ENDPOINT") {
            self.listing_endpoint = v;
        }
        if let Some(v) = lookup("APP__LISTING_LIMIT") {
            match v.parse() {
                Ok(parsed) => self.listing_limit = parsed,
                Err(_) => tracing::warn!(value = %v, "ignoring unparsable APP__LISTING_LIMIT"),
            }
        }
        if let Some(v) = lookup("APP__DEBOUNCE_MS") {
            match v.parse() {
                Ok(parsed) => self.debounce_ms = parsed,
                Err(_) => tracing::warn!(value = %v, "ignoring unparsable APP__DEBOUNCE_MS"),
            }
        }
        if let Some(v) = lookup("APP__PAGE_SIZE") {
            match v.parse() {
                Ok(parsed) => self.page_size = parsed,
                Err(_) => tracing::warn!(value = %v, "ignoring unparsable APP__PAGE_SIZE"),
            }
        }
    }
}

/// Defaults, then `gallery.toml` in the working directory, then `APP__*` env vars.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
        settings.apply_file(file_cfg);
    }

    settings.apply_env(lookup);
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
