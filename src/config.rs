use crate::error::{RelayError, Result};
use crate::providers::Provider;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request header carrying the caller's identity token.
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
    /// Assistant content returned to callers that are not on the allow-list.
    #[serde(default = "default_denied_message")]
    pub denied_message: String,
    #[serde(default)]
    pub allowed_ids: Vec<String>,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_chatgpt_url")]
    pub chatgpt_url: String,
    #[serde(default = "default_gemini_url")]
    pub gemini_url: String,
    /// Unset means the relay imposes no timeout of its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            chatgpt_url: default_chatgpt_url(),
            gemini_url: default_gemini_url(),
            timeout_secs: None,
        }
    }
}

fn default_port() -> u16 {
    8787
}

fn default_identity_header() -> String {
    "wxid".to_string()
}

fn default_denied_message() -> String {
    "access denied".to_string()
}

fn default_chatgpt_url() -> String {
    Provider::ChatGpt.default_endpoint().to_string()
}

fn default_gemini_url() -> String {
    Provider::Gemini.default_endpoint().to_string()
}

impl RelayConfig {
    /// A config with every default applied and the given allow-list.
    pub fn with_allowed_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            port: default_port(),
            identity_header: default_identity_header(),
            denied_message: default_denied_message(),
            allowed_ids: ids.into_iter().map(Into::into).collect(),
            upstream: UpstreamConfig::default(),
        }
    }

    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RelayError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Search standard locations for a config file.
    /// Priority: CLI arg > CWD > XDG config > home dir
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::load(path);
        }

        let candidates = config_search_paths();
        for candidate in &candidates {
            if candidate.exists() {
                tracing::info!(path = %candidate.display(), "Loading config");
                return Self::load(candidate);
            }
        }

        Err(RelayError::config(format!(
            "No config file found. Searched: {}",
            candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    pub fn validate(&self) -> Result<()> {
        if self.identity_header.trim().is_empty() {
            return Err(RelayError::config("identity_header must not be empty"));
        }
        if axum::http::HeaderName::from_bytes(self.identity_header.as_bytes()).is_err() {
            return Err(RelayError::config(format!(
                "identity_header '{}' is not a valid header name",
                self.identity_header
            )));
        }
        for (name, url) in [
            ("chatgpt_url", &self.upstream.chatgpt_url),
            ("gemini_url", &self.upstream.gemini_url),
        ] {
            if url.trim().is_empty() {
                return Err(RelayError::config(format!("upstream.{name} must not be empty")));
            }
        }
        Ok(())
    }

    pub fn upstream_timeout(&self) -> Option<std::time::Duration> {
        self.upstream.timeout_secs.map(std::time::Duration::from_secs)
    }
}

pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("chat-relay.toml"));

    if cfg!(target_os = "macos") {
        if let Some(home) = home_dir() {
            paths.push(
                home.join("Library")
                    .join("Application Support")
                    .join("chat-relay")
                    .join("config.toml"),
            );
        }
    } else {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join("chat-relay").join("config.toml"));
        }
        if let Some(home) = home_dir() {
            paths.push(home.join(".config").join("chat-relay").join("config.toml"));
        }
    }

    if let Some(home) = home_dir() {
        paths.push(home.join(".chat-relay.toml"));
    }

    paths
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
