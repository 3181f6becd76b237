use anyhow::Context;
use hipoteca_client::{ChatContextMode, ChatOptions, SessionStore, DEFAULT_BASE_URL};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FileConfig {
    pub(crate) base_url: Option<String>,
    pub(crate) chat: ChatConfig,
    pub(crate) state: StateConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct ChatConfig {
    pub(crate) context: ChatContextMode,
    pub(crate) session_fallback: bool,
    pub(crate) temperature: Option<f32>,
    pub(crate) max_tokens: Option<u32>,
    pub(crate) reset_on_start: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StateConfig {
    pub(crate) dir: Option<PathBuf>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        let options = ChatOptions::default();
        Self {
            context: options.context,
            session_fallback: options.session_fallback,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            reset_on_start: true,
        }
    }
}

/// Reads the TOML config. A missing file yields the defaults.
pub(crate) fn load_config(path: &Path) -> anyhow::Result<FileConfig> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(FileConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {}", path.display()))
        }
    };
    let config: FileConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(config)
}

/// Effective settings after merging flags, environment and file.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Settings {
    pub(crate) base_url: String,
    pub(crate) chat: ChatOptions,
    pub(crate) reset_on_start: bool,
    pub(crate) state_dir: PathBuf,
}

impl Settings {
    /// `base_url_arg` already carries the flag or `HIPOTECA_API`, whichever
    /// clap found first.
    pub(crate) fn resolve(
        base_url_arg: Option<String>,
        state_dir_arg: Option<PathBuf>,
        file: FileConfig,
    ) -> Self {
        let base_url = non_empty(base_url_arg)
            .or_else(|| non_empty(file.base_url))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let state_dir = state_dir_arg
            .or(file.state.dir)
            .unwrap_or_else(SessionStore::default_dir);
        Self {
            base_url,
            chat: ChatOptions {
                context: file.chat.context,
                session_fallback: file.chat.session_fallback,
                temperature: file.chat.temperature,
                max_tokens: file.chat.max_tokens,
            },
            reset_on_start: file.chat.reset_on_start,
            state_dir,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
