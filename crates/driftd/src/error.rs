use thiserror::Error;

/// Errors surfaced by the daemon/CLI layer, on top of `drift_core::Error`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("engine error: {0}")]
    Engine(#[from] drift_core::Error),

    #[error("identity file {path}: {source}")]
    Identity {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path}: {source}")]
    Config {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown contact: {0}")]
    UnknownContact(String),
}

pub type Result<T> = std::result::Result<T, Error>;
