use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all Packsmith operations.
#[derive(Debug, Error, Diagnostic)]
pub enum PacksmithError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed pack manifest (`pack.toml`).
    #[error("Manifest error: {message}")]
    #[diagnostic(
        code(packsmith::manifest),
        help("Check the pack.toml for syntax errors")
    )]
    Manifest { message: String },

    /// Invalid or malformed workspace configuration (`Packsmith.toml`).
    #[error("Config error: {message}")]
    #[diagnostic(code(packsmith::config))]
    Config { message: String },

    /// One or more packs could not be resolved.
    #[error("Dependency resolution failed: {message}")]
    #[diagnostic(code(packsmith::resolution))]
    Resolution { message: String },

    /// A pack compiler rejected a resolved pack.
    #[error("Compilation failed: {message}")]
    #[diagnostic(code(packsmith::compilation))]
    Compilation { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type PacksmithResult<T> = miette::Result<T>;
