//! User configuration loaded from `$XDG_CONFIG_HOME/chatrev/config.toml`.
//!
//! Every key is optional. A missing file yields the defaults; a file that
//! fails to parse also yields the defaults, and the parse error is returned
//! alongside so it can be logged once logging is up.

use std::path::PathBuf;

use serde::Deserialize;

/// Settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Built-in theme name: `"dark"` or `"catppuccin-mocha"`.
    pub theme: String,
    /// `tracing` filter directive used when `CHATREV_LOG` is unset.
    pub log_level: String,
    /// Whether new entries start with pending changes highlighted.
    pub review_mode_default: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_owned(),
            log_level: "info".to_owned(),
            review_mode_default: true,
        }
    }
}

/// Returns the path to the chatrev config file.
///
/// Prefers `$XDG_CONFIG_HOME/chatrev/config.toml`; falls back to
/// `~/.config/chatrev/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config").join("chatrev").join("config.toml")
}

/// Resolves an XDG base directory, falling back to `$HOME/<fallback>`.
pub fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(fallback)))
        .unwrap_or_else(|| PathBuf::from(fallback))
}

/// Parses config text. Unknown keys are ignored.
pub fn parse(raw: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(raw)
}

/// Loads the config file, never failing.
///
/// Returns the config to use and, when the file existed but could not be
/// read or parsed, a description of the problem.
pub fn load() -> (Config, Option<String>) {
    let path = config_path();
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return (Config::default(), None),
        Err(e) => {
            let warning = format!("cannot read {}: {e}", path.display());
            return (Config::default(), Some(warning));
        }
    };
    match parse(&raw) {
        Ok(config) => (config, None),
        Err(e) => {
            let warning = format!("config parse error in {}: {e}", path.display());
            (Config::default(), Some(warning))
        }
    }
}
