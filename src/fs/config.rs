//! Bridge configuration persisted as JSON in `.taskbridge/config.json`.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::executor::Launcher;
use crate::core::{BridgeSettings, OperationTimeouts};

/// Directory for taskbridge configuration files.
pub const CONFIG_DIR: &str = ".taskbridge";

/// Name of the configuration file inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding [`BridgeConfig::mode`].
pub const ENV_MODE: &str = "TASKBRIDGE_MODE";
/// Environment variable overriding [`BridgeConfig::executable`].
pub const ENV_EXECUTABLE: &str = "TASKBRIDGE_EXECUTABLE";
/// Environment variable overriding [`BridgeConfig::model`].
pub const ENV_MODEL: &str = "TASKBRIDGE_MODEL";
/// Environment variable overriding every operation timeout.
pub const ENV_TIMEOUT_MS: &str = "TASKBRIDGE_TIMEOUT_MS";

/// How AI requests are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeMode {
    /// Through the locally installed command-line tool.
    #[default]
    Cli,
    /// Through a hosted API client. Not served by this crate.
    Api,
}

impl BridgeMode {
    /// Returns the configuration name of the mode.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::Api => "api",
        }
    }

    /// Parses a mode name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cli" => Some(Self::Cli),
            "api" => Some(Self::Api),
            _ => None,
        }
    }
}

/// Persisted bridge configuration.
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeConfig {
    pub mode: BridgeMode,
    /// Executable name or path (`claude` by default).
    pub executable: String,
    /// Arguments placed before every invocation, e.g. `["@anthropic-ai/claude-code"]` for `npx`.
    pub executable_args: Vec<String>,
    pub model: Option<String>,
    /// Arguments added to every operation call.
    pub extra_args: Vec<String>,
    pub timeouts: OperationTimeouts,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mode: BridgeMode::Cli,
            executable: "claude".to_string(),
            executable_args: Vec::new(),
            model: None,
            extra_args: Vec::new(),
            timeouts: OperationTimeouts::default(),
        }
    }
}

impl BridgeConfig {
    /// Applies the `TASKBRIDGE_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an override has an invalid value.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`. Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if an override has an invalid value.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(mode) = get(ENV_MODE) {
            self.mode = BridgeMode::parse(&mode)
                .with_context(|| format!("Invalid {ENV_MODE} value '{mode}' (expected cli or api)"))?;
        }
        if let Some(executable) = get(ENV_EXECUTABLE) {
            self.executable = executable.trim().to_string();
        }
        if let Some(model) = get(ENV_MODEL) {
            self.model = Some(model.trim().to_string());
        }
        if let Some(timeout) = get(ENV_TIMEOUT_MS) {
            let ms: i64 = timeout
                .trim()
                .parse()
                .with_context(|| format!("Invalid {ENV_TIMEOUT_MS} value '{timeout}'"))?;
            self.timeouts = OperationTimeouts::uniform(ms);
        }
        Ok(())
    }

    /// Checks the configuration can drive the command-line tool.
    ///
    /// # Errors
    ///
    /// Returns an error for the hosted API mode or an empty executable.
    pub fn ensure_cli_mode(&self) -> Result<()> {
        if self.mode == BridgeMode::Api {
            bail!("mode 'api' selects the hosted API, which taskbridge does not handle; set mode to 'cli'");
        }
        if self.executable.trim().is_empty() {
            bail!("no executable configured");
        }
        Ok(())
    }

    /// Resolves the executable into a launcher.
    #[must_use]
    pub fn launcher(&self) -> Launcher {
        Launcher::resolve(self.executable.trim(), self.executable_args.clone())
    }

    /// Returns the per-call settings of the bridge.
    #[must_use]
    pub fn settings(&self) -> BridgeSettings {
        BridgeSettings {
            model: self.model.clone(),
            extra_args: self.extra_args.clone(),
            timeouts: self.timeouts,
        }
    }
}

/// Loads the configuration from `path`.
///
/// If the file doesn't exist, returns the default configuration.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<BridgeConfig> {
    if !path.exists() {
        return Ok(BridgeConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Saves the configuration to `path` as pretty-printed JSON.
///
/// The parent directory must exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_config(path: &Path, config: &BridgeConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write config file: {}", path.display()))
}
