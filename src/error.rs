//! Error taxonomy shared by the transformer and the repository updater.
//!
//! Configuration and transform errors end the run. Remote errors are
//! caught per row by the updater and only logged.
use std::path::Path;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Inputs that make the whole run impossible.
    #[error("{0}")]
    Configuration(String),

    /// The remote entity could not be found or read.
    #[error("lookup {reference}: {message}")]
    RemoteLookup { reference: String, message: String },

    /// The conditional write to the repository failed.
    #[error("update {reference}: {message}")]
    RemoteUpdate { reference: String, message: String },

    /// Reading the source or writing a document failed.
    #[error("{context}: {source}")]
    Transform {
        context: String,
        #[source]
        source: TransformSource,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TransformSource {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn lookup(reference: &str, message: impl Into<String>) -> Self {
        Self::RemoteLookup {
            reference: reference.to_string(),
            message: message.into(),
        }
    }

    pub fn update(reference: &str, message: impl Into<String>) -> Self {
        Self::RemoteUpdate {
            reference: reference.to_string(),
            message: message.into(),
        }
    }

    pub fn read_source(path: &Path, source: impl Into<TransformSource>) -> Self {
        Self::Transform {
            context: format!("read {}", path.display()),
            source: source.into(),
        }
    }

    pub fn write_document(path: &Path, source: std::io::Error) -> Self {
        Self::Transform {
            context: format!("write {}", path.display()),
            source: source.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
