//! # Configuration
//!
//! Process-level setup performed once by the composition root.
//!
//! Precedence for every setting: environment variable, then
//! `.canopy/config.json`, then the built-in default.

use crate::errors::PipelineError;
use crate::models::{LlmProvider, ModelConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Application name registered with every session
pub const DEFAULT_APP_NAME: &str = "Sustainability_Research_Bot";

/// User identifier used when the caller supplies none
pub const DEFAULT_USER_ID: &str = "demo_user";

/// Directory holding the optional config file and `.env`
pub const CONFIG_DIR: &str = ".canopy";

/// Settings persisted in `.canopy/config.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<LlmProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searxng_url: Option<String>,
}

impl AppConfig {
    /// Default location of the config file
    pub fn default_path() -> PathBuf {
        Path::new(CONFIG_DIR).join("config.json")
    }

    /// Load the config file, falling back to defaults when it is absent
    pub async fn load(path: &Path) -> Result<Self, PipelineError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Overlay the fields `other` sets
    pub fn merge(&mut self, other: AppConfig) {
        if other.provider.is_some() {
            self.provider = other.provider;
        }
        if other.model.is_some() {
            self.model = other.model;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.app_name.is_some() {
            self.app_name = other.app_name;
        }
        if other.user_id.is_some() {
            self.user_id = other.user_id;
        }
        if other.searxng_url.is_some() {
            self.searxng_url = other.searxng_url;
        }
    }

    /// Settings supplied through the environment
    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let provider = lookup("CANOPY_PROVIDER").and_then(|p| match p.parse::<LlmProvider>() {
            Ok(provider) => Some(provider),
            Err(e) => {
                tracing::warn!("Ignoring CANOPY_PROVIDER: {}", e);
                None
            }
        });
        Self {
            provider,
            model: None,
            base_url: lookup("CANOPY_BASE_URL"),
            app_name: lookup("CANOPY_APP_NAME"),
            user_id: lookup("CANOPY_USER_ID"),
            searxng_url: lookup("SEARXNG_URL"),
        }
    }
}

/// An API key and the variable it came from
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    var: &'static str,
    value: String,
}

impl Credential {
    pub fn new(var: &'static str, value: impl Into<String>) -> Self {
        Self {
            var,
            value: value.into(),
        }
    }

    /// Name of the variable that supplied the key
    pub fn var(&self) -> &'static str {
        self.var
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("var", &self.var)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Resolved process environment handed to the adapters
#[derive(Debug, Clone)]
pub struct Environment {
    pub model: ModelConfig,
    pub credential: Option<Credential>,
    pub app_name: String,
    pub user_id: String,
    pub searxng_url: Option<String>,
}

impl Environment {
    /// Build an environment from explicit parts
    pub fn new(model: ModelConfig, credential: Option<Credential>) -> Self {
        Self {
            model,
            credential,
            app_name: DEFAULT_APP_NAME.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            searxng_url: None,
        }
    }

    /// The credential, or the error naming the variable to set
    pub fn require_credential(&self) -> Result<&Credential, PipelineError> {
        self.credential
            .as_ref()
            .ok_or(PipelineError::MissingCredential {
                var: self.model.provider.credential_vars()[0],
            })
    }

    /// Resolve settings against a variable lookup without touching the process
    pub fn resolve(config: &AppConfig, lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let mut merged = config.clone();
        merged.merge(AppConfig::from_lookup(lookup));

        let provider = merged.provider.unwrap_or_default();
        let model = provider
            .model_var()
            .and_then(|var| lookup(var))
            .or(merged.model)
            .unwrap_or_else(|| provider.default_model().to_string());
        let base_url = merged.base_url.filter(|_| provider.supports_base_url());

        Self {
            model: ModelConfig {
                provider,
                model,
                base_url,
            },
            credential: resolve_credential(provider, lookup),
            app_name: merged
                .app_name
                .unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            user_id: merged
                .user_id
                .unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
            searxng_url: merged.searxng_url,
        }
    }
}

/// Find the first non-empty credential variable for `provider`
pub fn resolve_credential(
    provider: LlmProvider,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Option<Credential> {
    provider.credential_vars().iter().find_map(|var| {
        lookup(var)
            .filter(|value| !value.trim().is_empty())
            .map(|value| Credential::new(*var, value))
    })
}

/// Load `.env` files and resolve the process environment.
///
/// Must run once at process start, before the async runtime spawns work:
/// it exports `SEARXNG_URL` and mirrors an aliased credential into the
/// variable the radkit client reads.
pub fn initialize(config: &AppConfig) -> Environment {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!("Failed to load .env: {}", e);
        }
    }
    let local_env = Path::new(CONFIG_DIR).join(".env");
    if local_env.exists() {
        if let Err(e) = dotenvy::from_path(&local_env) {
            tracing::warn!("Failed to load {}: {}", local_env.display(), e);
        }
    }

    let env = Environment::resolve(config, &|var| std::env::var(var).ok());

    match &env.credential {
        Some(credential) => {
            let api_var = env.model.provider.api_key_var();
            if credential.var() != api_var && std::env::var_os(api_var).is_none() {
                std::env::set_var(api_var, credential.value());
            }
            tracing::info!(
                provider = env.model.provider.display_name(),
                model = %env.model.model,
                credential = credential.var(),
                "Environment initialized"
            );
        }
        None => tracing::warn!(
            "No {} found after loading .env files",
            env.model.provider.credential_vars().join(" or ")
        ),
    }

    if let Some(url) = &env.searxng_url {
        std::env::set_var("SEARXNG_URL", url);
    }

    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let env = Environment::resolve(&AppConfig::default(), &lookup_from(&[]));
        assert_eq!(env.model, ModelConfig::default());
        assert!(env.credential.is_none());
        assert_eq!(env.app_name, DEFAULT_APP_NAME);
        assert_eq!(env.user_id, DEFAULT_USER_ID);
    }

    #[test]
    fn test_google_key_resolves_for_gemini() {
        let lookup = lookup_from(&[("GOOGLE_API_KEY", "AIza-test")]);
        let env = Environment::resolve(&AppConfig::default(), &lookup);
        let credential = env.require_credential().unwrap();
        assert_eq!(credential.var(), "GOOGLE_API_KEY");
        assert_eq!(credential.value(), "AIza-test");
    }

    #[test]
    fn test_blank_credential_is_missing() {
        let lookup = lookup_from(&[("GOOGLE_API_KEY", "  ")]);
        let env = Environment::resolve(&AppConfig::default(), &lookup);
        match env.require_credential() {
            Err(PipelineError::MissingCredential { var }) => assert_eq!(var, "GOOGLE_API_KEY"),
            other => panic!("expected missing credential, got {:?}", other),
        }
    }

    #[test]
    fn test_model_env_overrides_config_file() {
        let config = AppConfig {
            model: Some("gemini-1.5-pro".to_string()),
            ..Default::default()
        };
        let env = Environment::resolve(&config, &lookup_from(&[]));
        assert_eq!(env.model.model, "gemini-1.5-pro");

        let lookup = lookup_from(&[("GEMINI_MODEL", "gemini-2.5-flash")]);
        let env = Environment::resolve(&config, &lookup);
        assert_eq!(env.model.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_provider_switch_uses_its_credential() {
        let config = AppConfig {
            provider: Some(LlmProvider::Anthropic),
            base_url: Some("http://ignored".to_string()),
            ..Default::default()
        };
        let lookup = lookup_from(&[("GOOGLE_API_KEY", "g"), ("ANTHROPIC_API_KEY", "a")]);
        let env = Environment::resolve(&config, &lookup);
        assert_eq!(env.model.model, "claude-sonnet-4-20250514");
        assert_eq!(env.model.base_url, None);
        assert_eq!(env.credential.unwrap().var(), "ANTHROPIC_API_KEY");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("GOOGLE_API_KEY", "super-secret");
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut base = AppConfig {
            user_id: Some("alice".to_string()),
            ..Default::default()
        };
        base.merge(AppConfig {
            app_name: Some("Bot".to_string()),
            ..Default::default()
        });
        assert_eq!(base.user_id.as_deref(), Some("alice"));
        assert_eq!(base.app_name.as_deref(), Some("Bot"));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let config = tokio_test::block_on(AppConfig::load(Path::new(
            "/nonexistent/canopy/config.json",
        )))
        .unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
