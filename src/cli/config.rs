use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RemoteConfig;
use crate::session::FileTokenStore;

/// Remote API selection persisted in `remote.json`. Unset values fall back to
/// the environment-derived application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSettings {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RemoteSettings {
    /// Effective remote config: stored values over the application defaults.
    pub fn resolve(&self, defaults: &RemoteConfig) -> RemoteConfig {
        RemoteConfig {
            base_url: self.base_url.clone().unwrap_or_else(|| defaults.base_url.clone()),
            timeout_secs: self.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("CONSOLE_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("admin-console").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// File-backed token store for the CLI session (`session.json`).
pub fn session_store() -> anyhow::Result<FileTokenStore> {
    Ok(FileTokenStore::new(get_config_dir()?.join("session.json")))
}

pub fn load_remote_settings() -> anyhow::Result<RemoteSettings> {
    let remote_file = get_config_dir()?.join("remote.json");

    if !remote_file.exists() {
        return Ok(RemoteSettings::default());
    }

    let content = fs::read_to_string(remote_file)?;
    let settings: RemoteSettings = serde_json::from_str(&content)?;
    Ok(settings)
}

pub fn save_remote_settings(settings: &RemoteSettings) -> anyhow::Result<()> {
    let remote_file = get_config_dir()?.join("remote.json");

    let content = serde_json::to_string_pretty(settings)?;
    fs::write(remote_file, content)?;
    Ok(())
}

/// Remote config the CLI should talk to right now.
pub fn remote_config() -> anyhow::Result<RemoteConfig> {
    Ok(load_remote_settings()?.resolve(&crate::config::config().remote))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_settings_override_defaults() {
        let defaults = RemoteConfig {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
        };

        let resolved = RemoteSettings::default().resolve(&defaults);
        assert_eq!(resolved.base_url, defaults.base_url);

        let settings = RemoteSettings {
            base_url: Some("https://api.example.com".to_string()),
            timeout_secs: None,
            updated_at: None,
        };
        let resolved = settings.resolve(&defaults);
        assert_eq!(resolved.base_url, "https://api.example.com");
        assert_eq!(resolved.timeout_secs, 30);
    }
}
