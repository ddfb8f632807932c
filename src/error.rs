use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::scanner::ScanError;

/// Failures that abort a conversion run.
///
/// Conversion-logic problems (unknown classes, compiler or AI failures) never
/// surface here; they degrade to diagnostics inside the generated output.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("invalid file name: {0}")]
    InvalidFileName(PathBuf),
}

impl Error {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
