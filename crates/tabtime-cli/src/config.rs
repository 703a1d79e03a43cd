//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Deserializer, Serialize};

use crate::output::OutputFormat;

/// Default width of the description column.
pub const DEFAULT_DESCRIPTION_LIMIT: usize = 50;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Hourly rate used when neither `--rate` nor `@rate` is given.
    #[serde(default, deserialize_with = "rate_text")]
    pub rate: Option<String>,

    /// Report output format.
    pub format: OutputFormat,

    /// Truncation width for descriptions; 0 disables truncation.
    pub description_limit: usize,

    /// Fail when overlaps or coding conflicts are reported.
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rate: None,
            format: OutputFormat::Tsv,
            description_limit: DEFAULT_DESCRIPTION_LIMIT,
            strict: false,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TABTIME_*)
        figment = figment.merge(Env::prefixed("TABTIME_"));

        figment.extract()
    }
}

/// Reads a rate written either as a string or as a bare number.
///
/// TOML `rate = 100` and `TABTIME_RATE=87.5` both arrive as numbers.
fn rate_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Rate {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
    }

    Ok(Option::<Rate>::deserialize(deserializer)?.map(|rate| match rate {
        Rate::Text(text) => text,
        Rate::Signed(n) => n.to_string(),
        Rate::Unsigned(n) => n.to_string(),
        Rate::Float(n) => n.to_string(),
    }))
}

/// Returns the platform-specific config directory for tabtime.
///
/// On Linux: `~/.config/tabtime`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tabtime"))
}
