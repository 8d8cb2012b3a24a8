//! Extension errors.

/// Result type for extension operations.
pub type Result<T> = std::result::Result<T, ExtensionError>;

/// Errors raised while loading, unloading or configuring extensions.
#[derive(Debug, thiserror::Error)]
pub enum ExtensionError {
    #[error("Library not found: {name} ({reason})")]
    LibraryNotFound { name: String, reason: String },

    #[error("Symbol not found: {symbol} ({reason})")]
    SymbolNotFound { symbol: String, reason: String },

    #[error("Factory returned null for {name}")]
    FactoryReturnedNull { name: String },

    #[error("Extension is not tracked by this manager: {name}")]
    UntrackedExtension { name: String },

    #[error("{name} is not a {expected} library")]
    WrongKind { name: String, expected: &'static str },

    #[error("Failed to close library {name}: {reason}")]
    CloseFailed { name: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
