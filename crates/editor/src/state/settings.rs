//! Application settings

use serde::{Deserialize, Serialize};
use shared::DEFAULT_COLOR;

use super::controller::DeletePolicy;
use crate::sync::endpoint::Endpoint;

/// How to treat remote responses that complete out of order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Every completed response is applied; the last to complete wins
    #[default]
    LastCompleted,
    /// Responses older than the latest applied replacement are discarded
    LatestSubmitted,
}

/// Inference / edit backend endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Local development endpoint
    pub local_url: String,
    /// Deployed endpoint
    pub deployed_url: String,
    /// Wins over host-based selection when set
    pub override_url: Option<String>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            local_url: "http://localhost:8000".to_string(),
            deployed_url: "https://floorplan-backend.example.com".to_string(),
            override_url: None,
        }
    }
}

impl BackendSettings {
    /// Base URL for the given runtime host
    pub fn resolve(&self, host: &str) -> &str {
        if let Some(url) = self.override_url.as_deref().filter(|u| !u.is_empty()) {
            return url;
        }
        match Endpoint::for_host(host) {
            Endpoint::Local => &self.local_url,
            Endpoint::Deployed => &self.deployed_url,
        }
    }
}

/// Backend-as-a-service used for auth and project storage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudSettings {
    /// Service base URL; empty means offline (in-memory auth and storage)
    pub url: String,
    /// Public API key sent with every request
    pub anon_key: String,
}

impl CloudSettings {
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }
}

/// Editor behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub sync_policy: SyncPolicy,
    pub delete_policy: DeletePolicy,
    /// Color applied by the plain material
    pub default_color: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            sync_policy: SyncPolicy::default(),
            delete_policy: DeletePolicy::default(),
            default_color: DEFAULT_COLOR.to_string(),
        }
    }
}

/// All application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub cloud: CloudSettings,
    #[serde(default)]
    pub editor: EditorSettings,
}

impl AppSettings {
    fn config_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "floorplan", "floorplan-editor")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return default if not found.
    /// Environment variables override the file.
    pub fn load() -> Self {
        let mut settings = Self::config_path()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|json| match serde_json::from_str::<Self>(&json) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    tracing::warn!("Ignoring malformed settings file: {e}");
                    None
                }
            })
            .unwrap_or_default();
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    /// Apply `FLOORPLAN_*` overrides from `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("FLOORPLAN_BACKEND_URL") {
            self.backend.override_url = Some(url);
        }
        if let Some(url) = lookup("FLOORPLAN_CLOUD_URL") {
            self.cloud.url = url;
        }
        if let Some(key) = lookup("FLOORPLAN_CLOUD_KEY") {
            self.cloud.anon_key = key;
        }
    }
}
