//! Run configuration, read once from the environment at startup.

use std::path::PathBuf;

use tracing::warn;

use crate::error::{Error, Result};

/// Default byte budget for selected files.
pub const DEFAULT_MAX_CONTEXT_SIZE: u64 = 200_000;

/// Default model used for every generation call.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// API key variable.
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
/// Budget override variable.
pub const MAX_SIZE_VAR: &str = "REPOCONTEXT_MAX_SIZE";
/// Model override variable.
pub const MODEL_VAR: &str = "REPOCONTEXT_MODEL";
/// Cache root override variable.
pub const HOME_VAR: &str = "REPOCONTEXT_HOME";

/// Settings for one documentation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Anthropic API key.
    pub api_key: String,
    /// Byte budget for the selected files.
    pub max_context_size: u64,
    /// Model identifier sent with every request and stored in metadata.
    pub model: String,
    /// Root of the clone and docs cache.
    pub home: PathBuf,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), dirs::home_dir())
    }

    /// Builds configuration from a variable lookup and the user's home directory.
    ///
    /// An unparsable budget falls back to [`DEFAULT_MAX_CONTEXT_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`] if the key is unset or empty, and
    /// [`Error::NoHomeDir`] if neither `REPOCONTEXT_HOME` nor `user_home` is available.
    pub fn from_lookup<F>(lookup: F, user_home: Option<PathBuf>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR).filter(|k| !k.trim().is_empty()).ok_or(Error::MissingApiKey)?;

        let max_context_size = match lookup(MAX_SIZE_VAR) {
            Some(raw) if !raw.is_empty() => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, default = DEFAULT_MAX_CONTEXT_SIZE, "invalid {MAX_SIZE_VAR}, using default");
                DEFAULT_MAX_CONTEXT_SIZE
            }),
            _ => DEFAULT_MAX_CONTEXT_SIZE,
        };

        let model = lookup(MODEL_VAR).filter(|m| !m.is_empty()).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let home = match lookup(HOME_VAR).filter(|h| !h.is_empty()) {
            Some(home) => PathBuf::from(home),
            None => user_home.ok_or(Error::NoHomeDir)?.join(".repocontext"),
        };

        Ok(Self { api_key, max_context_size, model, home })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_with_only_api_key() {
        let cfg = Config::from_lookup(lookup(&[(API_KEY_VAR, "sk-test")]), Some(PathBuf::from("/home/u"))).unwrap();
        assert_eq!(cfg.api_key, "sk-test");
        assert_eq!(cfg.max_context_size, 200_000);
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.home, PathBuf::from("/home/u/.repocontext"));
    }

    #[test]
    fn non_numeric_budget_falls_back_to_default() {
        let cfg = Config::from_lookup(
            lookup(&[(API_KEY_VAR, "k"), (MAX_SIZE_VAR, "abc")]),
            Some(PathBuf::from("/h")),
        )
        .unwrap();
        assert_eq!(cfg.max_context_size, DEFAULT_MAX_CONTEXT_SIZE);
    }

    #[test]
    fn numeric_budget_is_used() {
        let cfg = Config::from_lookup(
            lookup(&[(API_KEY_VAR, "k"), (MAX_SIZE_VAR, "5000")]),
            Some(PathBuf::from("/h")),
        )
        .unwrap();
        assert_eq!(cfg.max_context_size, 5000);
    }

    #[test]
    fn negative_budget_falls_back_to_default() {
        let cfg = Config::from_lookup(
            lookup(&[(API_KEY_VAR, "k"), (MAX_SIZE_VAR, "-1")]),
            Some(PathBuf::from("/h")),
        )
        .unwrap();
        assert_eq!(cfg.max_context_size, DEFAULT_MAX_CONTEXT_SIZE);
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let err = Config::from_lookup(lookup(&[]), Some(PathBuf::from("/h"))).unwrap_err();
        assert!(matches!(err, Error::MissingApiKey));

        let err = Config::from_lookup(lookup(&[(API_KEY_VAR, "  ")]), Some(PathBuf::from("/h"))).unwrap_err();
        assert!(matches!(err, Error::MissingApiKey));
    }

    #[test]
    fn overrides_model_and_home() {
        let cfg = Config::from_lookup(
            lookup(&[(API_KEY_VAR, "k"), (MODEL_VAR, "claude-x"), (HOME_VAR, "/var/cache/rc")]),
            None,
        )
        .unwrap();
        assert_eq!(cfg.model, "claude-x");
        assert_eq!(cfg.home, PathBuf::from("/var/cache/rc"));
    }

    #[test]
    fn no_home_anywhere_is_an_error() {
        let err = Config::from_lookup(lookup(&[(API_KEY_VAR, "k")]), None).unwrap_err();
        assert!(matches!(err, Error::NoHomeDir));
    }
}
