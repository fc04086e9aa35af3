//! CLI configuration
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use setlist_client::{ClientConfig, DEFAULT_API_PREFIX};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "setlist.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthSettings {
    /// Bearer token for the playlist service
    #[serde(default)]
    pub token: Option<String>,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist. Without one, `setlist.toml` in the
    /// working directory is read if present. `SETLIST__*` variables
    /// override both, e.g. `SETLIST__SERVER__URL`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, config::Environment::with_prefix("SETLIST"))
    }

    fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(env.separator("__").try_parsing(false));

        let config = settings
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.url.trim().is_empty() {
            bail!("Server URL is required (set SETLIST__SERVER__URL)");
        }
        Ok(())
    }

    /// Client settings for the configured server
    pub fn client_config(&self) -> ClientConfig {
        let config = match &self.auth.token {
            Some(token) if !token.is_empty() => {
                ClientConfig::with_token(self.server.url.clone(), token.clone())
            }
            _ => ClientConfig::new(self.server.url.clone()),
        };
        config.api_prefix(self.server.api_prefix.clone())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        url: default_url(),
        api_prefix: default_api_prefix(),
    }
}

fn default_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_prefix() -> String {
    DEFAULT_API_PREFIX.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            auth: AuthSettings::default(),
        }
    }
}
