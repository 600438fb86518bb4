//! Error types for overlay extraction.

use thiserror::Error;

/// Terminal conditions of one extraction run.
///
/// Only these abort a run. Everything else (bad colors, dangling style or
/// asset references, broken documents inside an archive) degrades locally.
#[derive(Error, Debug)]
pub enum Error {
    /// The input bytes could not be obtained. The message is surfaced verbatim.
    #[error("{0}")]
    Retrieval(String),

    #[error("Invalid archive: {0}")]
    InvalidArchive(#[from] zip::result::ZipError),

    #[error("No usable document in archive")]
    NoUsableDocument,

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("No geometry found")]
    NoGeometry,
}

impl Error {
    /// Wrap any displayable retrieval failure.
    pub fn retrieval(err: impl std::fmt::Display) -> Self {
        Error::Retrieval(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
