// Application settings
// Loaded from ~/.config/harada/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment override for the configuration directory.
pub const CONFIG_DIR_ENV: &str = "HARADA_CONFIG_DIR";

/// Environment override for the board store location.
pub const STORE_DIR_ENV: &str = "HARADA_STORE_DIR";

/// Where the board and onboarding marker are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One file per record in the store directory
    #[default]
    Files,
    /// A single SQLite database in the store directory
    Sqlite,
}

/// Assist provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistProvider {
    /// Assist disabled (default)
    #[default]
    None,
    /// Hosted Harada web service (recommendations endpoint)
    Service,
    /// OpenAI chat completions API
    #[serde(rename = "openai")]
    OpenAI,
    /// Local model via Ollama's OpenAI-compatible endpoint
    Local,
}

impl AssistProvider {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, AssistProvider::None)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AssistProvider::None => "none",
            AssistProvider::Service => "service",
            AssistProvider::OpenAI => "openai",
            AssistProvider::Local => "local",
        }
    }

    pub fn needs_api_key(&self) -> bool {
        matches!(self, AssistProvider::OpenAI)
    }

    /// Default model for chat providers
    pub fn default_model(&self) -> &'static str {
        match self {
            AssistProvider::None | AssistProvider::Service => "",
            AssistProvider::OpenAI => "gpt-4o-mini",
            AssistProvider::Local => "llama3:8b",
        }
    }

    /// Default endpoint for chat providers
    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            AssistProvider::OpenAI => Some("https://api.openai.com/v1"),
            AssistProvider::Local => Some("http://localhost:11434/v1"),
            AssistProvider::None | AssistProvider::Service => None,
        }
    }
}

/// Assist-specific settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistSettings {
    /// Selected provider
    pub provider: AssistProvider,

    /// Model identifier (chat providers only, empty = provider default)
    pub model: String,

    /// Custom endpoint for chat providers
    pub endpoint: Option<String>,
}

impl AssistSettings {
    pub fn effective_model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Storage
    #[serde(rename = "storage.backend")]
    pub storage_backend: StorageBackend,

    #[serde(rename = "storage.dir")]
    pub storage_dir: Option<PathBuf>,

    // Hosted service (recommendations + PDF export)
    #[serde(rename = "service.baseUrl")]
    pub service_base_url: Option<String>,

    // Export
    #[serde(rename = "export.defaultFilename")]
    pub export_default_filename: String,

    // Assist
    #[serde(rename = "assist", default)]
    pub assist: AssistSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::Files,
            storage_dir: None,
            service_base_url: None,
            export_default_filename: "harada-board.pdf".to_string(),
            assist: AssistSettings::default(),
        }
    }
}

/// Directory holding settings.json and, by default, the store.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("harada")
}

const DEFAULT_CONFIG: &str = r#"{
    // Storage: "files" (one file per record) or "sqlite"
    "storage.backend": "files",
    "storage.dir": null,

    // Hosted Harada service used for suggestions and PDF export
    "service.baseUrl": null,

    // Export
    "export.defaultFilename": "harada-board.pdf",

    // Assist (disabled by default)
    // Provider options: "none", "service", "openai", "local"
    // API keys are stored in system keychain, not in this file
    "assist": {
        "provider": "none",
        "model": "",
        "endpoint": null
    }
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        config_dir().join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load settings from an explicit path. Missing or malformed files give defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring lines starting with `//`.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Directory for the board store.
    ///
    /// `HARADA_STORE_DIR` wins over `storage.dir`, which wins over
    /// `<config dir>/store`.
    pub fn store_dir(&self) -> PathBuf {
        if let Ok(dir) = std::env::var(STORE_DIR_ENV) {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }
        self.storage_dir
            .clone()
            .unwrap_or_else(|| config_dir().join("store"))
    }

    /// Service base URL without a trailing slash.
    pub fn service_base_url(&self) -> Option<&str> {
        self.service_base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
