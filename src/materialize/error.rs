use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MaterializeError>;

/// A failure that stops the current problem set.
#[derive(Debug, Error)]
#[error("failed to save problem #{index} of \"{problem_set}\"")]
pub struct MaterializeError {
    pub problem_set: String,
    pub index: usize,
    #[source]
    pub source: ProblemError,
}

/// Why a single problem could not be written.
#[derive(Debug, Error)]
pub enum ProblemError {
    /// Locale title is not `<category> <code> <name>`
    #[error("locale title {title:?} does not split into category, code and name")]
    Title { title: String },

    #[error("file stream of {file_name:?} has no comma-delimited prefix")]
    MissingStreamPrefix { file_name: String },

    #[error("file stream of {file_name:?} is not valid base64")]
    InvalidBase64 {
        file_name: String,
        #[source]
        source: base64::DecodeError,
    },

    /// Starter file names must stay inside the problem directory
    #[error("starter file name {file_name:?} is not a plain file name")]
    UnsafeFileName { file_name: String },

    /// A directory part taken from the title or set name would leave the
    /// output root
    #[error("directory part {part:?} is not a relative plain path")]
    UnsafePath { part: String },

    #[error("I/O error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProblemError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
