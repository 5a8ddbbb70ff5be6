//! Load configuration via `config` crate with env-override support.
//!
//! A local `.env` file is loaded into the process environment first, so the
//! usual `SLACK_BOT_TOKEN` / `OPENAI_API_KEY` pair can live there.

use std::{
    net::SocketAddr,
    ops::Deref,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use tracing::{debug, info};

use crate::base::prompts;

use super::types::{Res, Void};

/// Default completion model to use
fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

/// Default max output tokens for the completion model
fn default_openai_max_tokens() -> u32 {
    100
}

/// Default completion API base URL
fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Default reply for an empty `choices` list.
fn default_fallback_reply() -> String {
    prompts::FALLBACK_REPLY.to_string()
}

/// Default address for the standalone server.
fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

/// Configuration for the relay-bot application.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Shared configuration values.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

/// The configuration values themselves.
#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// OpenAI API key (`OPENAI_API_KEY`).
    #[serde(default)]
    pub openai_api_key: String,
    /// Completion model to use (`OPENAI_MODEL`).
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Max output tokens for the completion model (`OPENAI_MAX_TOKENS`).
    #[serde(default = "default_openai_max_tokens")]
    pub openai_max_tokens: u32,
    /// Completion API base URL (`OPENAI_API_BASE`).
    #[serde(default = "default_openai_api_base")]
    pub openai_api_base: String,
    /// Reply posted when the completion API returns no choices (`FALLBACK_REPLY`).
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    #[serde(default)]
    pub slack_bot_token: String,
    /// Bind address for the standalone server (`LISTEN_ADDR`).
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_model: default_openai_model(),
            openai_max_tokens: default_openai_max_tokens(),
            openai_api_base: default_openai_api_base(),
            fallback_reply: default_fallback_reply(),
            slack_bot_token: String::new(),
            listen_addr: default_listen_addr(),
        }
    }
}

impl Config {
    /// Load the configuration from the environment and an optional config file, then validate it.
    ///
    /// `env_file` names a dotenv file that must exist; without it, `.env` in the
    /// current directory is loaded when present.
    pub fn load(explicit_path: Option<&Path>, env_file: Option<&Path>) -> Res<Self> {
        load_env_file(env_file)?;

        let mut cfg = config::Config::builder().add_source(config::Environment::default());

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Refuse configurations the relay cannot start with.
    pub fn validate(&self) -> Void {
        if self.openai_api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("OPENAI_API_KEY is required but was not set."));
        }

        if self.slack_bot_token.trim().is_empty() {
            return Err(anyhow::anyhow!("SLACK_BOT_TOKEN is required but was not set."));
        }

        if self.openai_model.trim().is_empty() {
            return Err(anyhow::anyhow!("OPENAI_MODEL must not be empty."));
        }

        if self.openai_max_tokens < 1 || self.openai_max_tokens > 128000 {
            return Err(anyhow::anyhow!("OpenAI max tokens must be between 1 and 128000."));
        }

        self.listen_addr()?;

        Ok(())
    }

    /// The parsed standalone server address.
    pub fn listen_addr(&self) -> Res<SocketAddr> {
        self.inner
            .listen_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("LISTEN_ADDR `{}` is not a valid socket address: {e}", self.inner.listen_addr))
    }
}

/// Load dotenv values into the process environment.
fn load_env_file(env_file: Option<&Path>) -> Res<Option<PathBuf>> {
    if let Some(path) = env_file {
        dotenvy::from_path(path).map_err(|e| anyhow::anyhow!("Error loading env file `{}`: {e}", path.display()))?;
        info!("Loaded environment from {}", path.display());
        return Ok(Some(path.to_path_buf()));
    }

    match dotenvy::dotenv() {
        Ok(path) => {
            info!("Loaded environment from {}", path.display());
            Ok(Some(path))
        }
        Err(e) if e.not_found() => {
            debug!("No .env file found; using the process environment only.");
            Ok(None)
        }
        Err(e) => Err(anyhow::anyhow!("Error loading .env file: {e}")),
    }
}

// Tests.
