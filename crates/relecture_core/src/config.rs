//! Journal configuration.
//!
//! # Responsibility
//! - Describe where the journal lives and how the core behaves.
//! - Load configuration from JSON and reject invalid values early.
//!
//! # Invariants
//! - Unknown fields are rejected.
//! - Missing fields take their documented defaults.
//! - A validated config always has a supported log level and a usable
//!   reminder policy.

use crate::logging::{default_log_level, normalize_level};
use crate::review::reminder::{ReminderPolicy, ReminderPolicyError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_RECENT_LINKS_LIMIT: u32 = 5;
const RECENT_LINKS_LIMIT_MAX: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JournalConfig {
    /// SQLite file. `None` gives library callers a private in-memory journal;
    /// the CLI `review` command requires it.
    pub database_path: Option<PathBuf>,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling logs. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Size of the "recent links" list. Clamped to `1..=50`.
    pub recent_links_limit: u32,
    pub reminder: ReminderPolicy,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            recent_links_limit: DEFAULT_RECENT_LINKS_LIMIT,
            reminder: ReminderPolicy::default(),
        }
    }
}

impl JournalConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_level(&self.log_level)
            .map_err(|_| ConfigError::UnsupportedLogLevel(self.log_level.clone()))?;
        if let Some(dir) = self.log_dir.as_ref() {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        self.reminder.validate()?;
        Ok(())
    }

    /// Recent-links list size after clamping.
    pub fn effective_recent_links_limit(&self) -> u32 {
        self.recent_links_limit.clamp(1, RECENT_LINKS_LIMIT_MAX)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    UnsupportedLogLevel(String),
    RelativeLogDir(PathBuf),
    Reminder(ReminderPolicyError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::UnsupportedLogLevel(level) => write!(
                f,
                "unsupported log_level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeLogDir(dir) => write!(
                f,
                "log_dir must be an absolute path, got `{}`",
                dir.display()
            ),
            Self::Reminder(err) => write!(f, "invalid reminder policy: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Reminder(err) => Some(err),
            Self::UnsupportedLogLevel(_) | Self::RelativeLogDir(_) => None,
        }
    }
}

impl From<ReminderPolicyError> for ConfigError {
    fn from(value: ReminderPolicyError) -> Self {
        Self::Reminder(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, JournalConfig, DEFAULT_RECENT_LINKS_LIMIT};
    use crate::review::reminder::ReminderPolicyError;
    use std::error::Error;
    use std::path::Path;

    #[test]
    fn empty_document_yields_defaults() {
        let config = JournalConfig::from_json_str("{}").expect("defaults are valid");
        assert_eq!(config, JournalConfig::default());
        assert_eq!(config.recent_links_limit, DEFAULT_RECENT_LINKS_LIMIT);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = JournalConfig::from_json_str(r#"{"databse_path": "x.db"}"#)
            .expect_err("typo must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unsupported_log_level_is_rejected() {
        let err = JournalConfig::from_json_str(r#"{"log_level": "verbose"}"#)
            .expect_err("bad level must fail");
        assert!(matches!(err, ConfigError::UnsupportedLogLevel(ref level) if level == "verbose"));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = JournalConfig::from_json_str(r#"{"log_dir": "logs"}"#)
            .expect_err("relative dir must fail");
        assert!(matches!(
            err,
            ConfigError::RelativeLogDir(ref dir) if dir.as_path() == Path::new("logs")
        ));
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn invalid_reminder_policy_keeps_its_typed_cause() {
        let err = JournalConfig::from_json_str(
            r#"{"reminder": {"prayer_weight": 0.0, "grace_weight": 0.0, "word_weight": 0.0}}"#,
        )
        .expect_err("all-zero weights must fail");
        assert!(matches!(
            err,
            ConfigError::Reminder(ReminderPolicyError::AllWeightsZero)
        ));
        assert!(err.source().is_some());
    }

    #[test]
    fn recent_links_limit_is_clamped() {
        let mut config = JournalConfig::default();
        config.recent_links_limit = 0;
        assert_eq!(config.effective_recent_links_limit(), 1);
        config.recent_links_limit = 500;
        assert_eq!(config.effective_recent_links_limit(), 50);
    }

    #[test]
    fn nested_reminder_policy_is_parsed() {
        let config = JournalConfig::from_json_str(
            r#"{"reminder": {"stale_after_days": 7, "prayer_weight": 1.0, "grace_weight": 0.0, "word_weight": 0.0}}"#,
        )
        .expect("valid reminder policy");
        assert_eq!(config.reminder.stale_after_days, 7);
    }
}
