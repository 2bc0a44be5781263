// Assist provider configuration and API keys.
//
// Keys come from the system keychain, then HARADA_<PROVIDER>_KEY.
// settings.json never holds a key.

use std::env;

use crate::settings::{AssistProvider, Settings};

const KEYCHAIN_SERVICE: &str = "harada";

/// Where a provider key was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Keychain,
    Environment,
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Keychain => "keychain",
            KeySource::Environment => "environment",
            KeySource::None => "none",
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyLookup {
    pub key: Option<String>,
    pub source: KeySource,
}

impl KeyLookup {
    fn found(key: String, source: KeySource) -> Self {
        Self { key: Some(key), source }
    }

    fn missing() -> Self {
        Self { key: None, source: KeySource::None }
    }
}

pub fn env_var_name(provider: &str) -> String {
    format!("HARADA_{}_KEY", provider.to_uppercase())
}

fn keychain_account(provider: &str) -> String {
    format!("assist/{}", provider.to_lowercase())
}

#[cfg(feature = "keychain")]
fn keychain_entry(provider: &str) -> Result<keyring::Entry, String> {
    keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider))
        .map_err(|e| format!("keychain unavailable for {}: {}", provider, e))
}

/// Look up the key for `provider`: keychain first, then the environment.
/// An empty environment value counts as unset.
pub fn get_api_key(provider: &str) -> KeyLookup {
    #[cfg(feature = "keychain")]
    {
        let stored = keychain_entry(provider).ok().and_then(|entry| entry.get_password().ok());
        if let Some(key) = stored {
            return KeyLookup::found(key, KeySource::Keychain);
        }
    }

    match env::var(env_var_name(provider)) {
        Ok(key) if !key.is_empty() => KeyLookup::found(key, KeySource::Environment),
        _ => KeyLookup::missing(),
    }
}

#[cfg(feature = "keychain")]
pub fn set_api_key(provider: &str, key: &str) -> Result<(), String> {
    keychain_entry(provider)?
        .set_password(key)
        .map_err(|e| format!("could not store key for {}: {}", provider, e))
}

#[cfg(feature = "keychain")]
pub fn delete_api_key(provider: &str) -> Result<(), String> {
    keychain_entry(provider)?
        .delete_credential()
        .map_err(|e| format!("could not remove key for {}: {}", provider, e))
}

#[cfg(not(feature = "keychain"))]
pub fn set_api_key(provider: &str, _key: &str) -> Result<(), String> {
    Err(format!("built without keychain support; set {} instead", env_var_name(provider)))
}

#[cfg(not(feature = "keychain"))]
pub fn delete_api_key(provider: &str) -> Result<(), String> {
    Err(format!("built without keychain support; unset {} instead", env_var_name(provider)))
}

#[cfg(feature = "keychain")]
pub fn keychain_available() -> bool {
    keychain_entry("availability").is_ok()
}

#[cfg(not(feature = "keychain"))]
pub fn keychain_available() -> bool {
    false
}

// ============================================================================
// Resolved assist configuration
// ============================================================================

/// Status of the assist configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistConfigStatus {
    /// provider = none
    Disabled,
    Ready,
    /// Provider needs an API key and none was found
    MissingKey,
    /// Provider needs an endpoint and none is configured
    MissingEndpoint,
}

impl AssistConfigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Ready => "ready",
            Self::MissingKey => "missing_key",
            Self::MissingEndpoint => "missing_endpoint",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// The effective assist configuration, fully resolved from settings,
/// keychain and environment.
#[derive(Debug, Clone)]
pub struct ResolvedAssistConfig {
    pub provider: AssistProvider,
    /// Effective model (chat providers only)
    pub model: String,
    /// Base URL the client talks to
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub key_source: KeySource,
    pub status: AssistConfigStatus,
    /// Human-readable reason if not ready
    pub blocking_reason: Option<String>,
}

impl ResolvedAssistConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self::resolve(settings, get_api_key)
    }

    /// Load settings and resolve in one call
    pub fn load() -> Self {
        Self::from_settings(&Settings::load())
    }

    fn resolve(settings: &Settings, lookup_key: impl Fn(&str) -> KeyLookup) -> Self {
        let assist = &settings.assist;
        let provider = assist.provider;

        if !provider.is_enabled() {
            return Self {
                provider,
                model: String::new(),
                endpoint: None,
                api_key: None,
                key_source: KeySource::None,
                status: AssistConfigStatus::Disabled,
                blocking_reason: None,
            };
        }

        let endpoint = match provider {
            AssistProvider::Service => settings.service_base_url().map(str::to_string),
            _ => assist
                .endpoint
                .as_deref()
                .filter(|e| !e.is_empty())
                .or(provider.default_endpoint())
                .map(|e| e.trim_end_matches('/').to_string()),
        };

        let (api_key, key_source) = if provider.needs_api_key() {
            let lookup = lookup_key(provider.name());
            (lookup.key, lookup.source)
        } else {
            (None, KeySource::None)
        };

        let (status, blocking_reason) = if endpoint.is_none() {
            (
                AssistConfigStatus::MissingEndpoint,
                Some("No service URL configured. Set \"service.baseUrl\" in settings.json".to_string()),
            )
        } else if provider.needs_api_key() && api_key.is_none() {
            (
                AssistConfigStatus::MissingKey,
                Some(format!(
                    "No API key found. Set via keychain or {}",
                    env_var_name(provider.name())
                )),
            )
        } else {
            (AssistConfigStatus::Ready, None)
        };

        Self {
            provider,
            model: assist.effective_model().to_string(),
            endpoint,
            api_key,
            key_source,
            status,
            blocking_reason,
        }
    }
}

// ============================================================================
// Diagnostics (for CLI doctor)
// ============================================================================

#[derive(Debug)]
pub struct AssistDiagnostics {
    pub provider: String,
    pub model: String,
    pub status: AssistConfigStatus,
    pub blocking_reason: Option<String>,
    pub key_present: bool,
    pub key_source: KeySource,
    pub keychain_available: bool,
    pub endpoint: Option<String>,
}

impl AssistDiagnostics {
    pub fn from_resolved(config: &ResolvedAssistConfig) -> Self {
        Self {
            provider: config.provider.name().to_string(),
            model: config.model.clone(),
            status: config.status,
            blocking_reason: config.blocking_reason.clone(),
            key_present: config.api_key.is_some(),
            key_source: config.key_source,
            keychain_available: keychain_available(),
            endpoint: config.endpoint.clone(),
        }
    }
}

impl std::fmt::Display for AssistDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Assist Configuration")?;
        writeln!(f, "──────────────────────────────")?;
        writeln!(f, "Provider:          {}", self.provider)?;
        writeln!(f, "Status:            {}", self.status.as_str())?;
        if let Some(reason) = &self.blocking_reason {
            writeln!(f, "Reason:            {}", reason)?;
        }
        if !self.model.is_empty() {
            writeln!(f, "Model:             {}", self.model)?;
        }
        if let Some(endpoint) = &self.endpoint {
            writeln!(f, "Endpoint:          {}", endpoint)?;
        }
        writeln!(f, "Key present:       {}", if self.key_present { "yes" } else { "no" })?;
        writeln!(f, "Key source:        {}", self.key_source.as_str())?;
        writeln!(f, "Keychain available:{}", if self.keychain_available { "yes" } else { "no" })?;
        Ok(())
    }
}
