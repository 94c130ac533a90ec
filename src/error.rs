use thiserror::Error;

pub type ChatResult<T> = Result<T, ConfigError>;

/// Configuration loading and validation failures.
///
/// The composition pipeline itself never surfaces errors: malformed markup
/// recovers through the codec fallback chain, missing external data is a
/// normal `None`, and snapshot-store failures degrade a single token. Only
/// configuration handling is fallible, and a failed load never replaces the
/// previously installed snapshot.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("YAML error: {0}")]
    Yaml(String),

    #[error("Default format template is missing the {{message}} placeholder")]
    DefaultFormatMissingMessage,

    #[error("Group '{group}' has a format template without the {{message}} placeholder")]
    GroupFormatMissingMessage { group: String },

    #[error("Duplicate group name '{group}'")]
    DuplicateGroup { group: String },

    #[error("Color preset '{name}' has an empty format")]
    EmptyPresetFormat { name: String },

    #[error("Color preset '{name}' format '{format}' is not a pure color sequence")]
    InvalidPresetFormat { name: String, format: String },

    #[error("Duplicate color preset '{name}'")]
    DuplicatePreset { name: String },

    #[error("Empty preview token literal in category '{category}'")]
    EmptyToken { category: String },

    #[error("Duplicate preview token '{token}' in category '{category}'")]
    DuplicateToken { token: String, category: String },

    #[error("Mention color '{color}' is not a recognized color sequence")]
    InvalidMentionColor { color: String },
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err.to_string())
    }
}

/// Failure reported by a snapshot store implementation. A failing store
/// degrades the affected preview token to a plain label; it never aborts
/// composition.
#[derive(Error, Debug, Clone)]
pub enum SnapshotError {
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),

    #[error("snapshot store rejected the payload: {0}")]
    Rejected(String),
}
