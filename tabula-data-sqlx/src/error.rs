use tabula_data::DataError;

/// Convenience alias for engine results backed by [`SqlxStore`](crate::SqlxStore).
pub type SqlxResult<T> = Result<T, DataError<sqlx::Error>>;

/// Errors raised while assembling a [`StoreConfig`](crate::StoreConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O or YAML parsing error occurred while loading the config file.
    Load(String),
    /// A required key was set neither in the file nor in the environment.
    Missing(&'static str),
    /// An environment variable held a value that could not be parsed.
    Invalid { key: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
            ConfigError::Missing(key) => write!(f, "Config key not found: {key}"),
            ConfigError::Invalid { key, value } => {
                write!(f, "Config value for '{key}' is invalid: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
