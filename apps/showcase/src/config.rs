use std::{fs, path::Path, time::Duration};

use catalog_client::{state::DEFAULT_PAGE_SIZE, SearchOptions};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub anon_key: String,
    pub page_size: u32,
    pub search_debounce_ms: u64,
    pub random_throttle_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:54321".into(),
            anon_key: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: 500,
            random_throttle_ms: 1000,
        }
    }
}

impl Settings {
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            page_size: self.page_size,
            quiet_window: Duration::from_millis(self.search_debounce_ms),
            random_interval: self.random_interval(),
        }
    }

    pub fn random_interval(&self) -> Duration {
        Duration::from_millis(self.random_throttle_ms)
    }

    fn set_page_size(&mut self, page_size: u32) {
        self.page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    anon_key: Option<String>,
    page_size: Option<u32>,
    search_debounce_ms: Option<u64>,
    random_throttle_ms: Option<u64>,
}

/// Defaults, then `path` if it exists, then the environment.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw, path);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str, path: &Path) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(path = %path.display(), %err, "ignoring unreadable settings file");
            return;
        }
    };
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.anon_key {
        settings.anon_key = v;
    }
    if let Some(v) = file_cfg.page_size {
        settings.set_page_size(v);
    }
    if let Some(v) = file_cfg.search_debounce_ms {
        settings.search_debounce_ms = v;
    }
    if let Some(v) = file_cfg.random_throttle_ms {
        settings.random_throttle_ms = v;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SHOWCASE_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = var("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = var("SHOWCASE_ANON_KEY") {
        settings.anon_key = v;
    }
    if let Some(v) = var("APP__ANON_KEY") {
        settings.anon_key = v;
    }

    if let Some(v) = var("APP__PAGE_SIZE") {
        if let Ok(parsed) = v.trim().parse::<u32>() {
            settings.set_page_size(parsed);
        }
    }
    if let Some(v) = var("APP__SEARCH_DEBOUNCE_MS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.search_debounce_ms = parsed;
        }
    }
    if let Some(v) = var("APP__RANDOM_THROTTLE_MS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.random_throttle_ms = parsed;
        }
    }
}
