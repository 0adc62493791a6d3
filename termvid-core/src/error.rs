use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Probed or configured duration is zero, negative or unparsable.
    #[error("invalid video duration: {0:?}")]
    InvalidDuration(String),

    /// An ffmpeg/ffprobe invocation exited non-zero or produced unusable output.
    #[error("{operation} failed: {message}")]
    ExternalTool {
        operation: &'static str,
        message: String,
    },

    #[error("failed to convert {}: {message}", path.display())]
    Conversion { path: PathBuf, message: String },

    #[error("no frames found in {}, run `termvid render` first", .0.display())]
    NoFramesFound(PathBuf),

    /// A numbered file whose stem is not an integer. The stores only ever
    /// write numeric names, so this means the directory was tampered with.
    #[error("corrupt artifact name: {0:?}")]
    CorruptArtifactName(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn tool(operation: &'static str, message: impl ToString) -> Self {
        Error::ExternalTool {
            operation,
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attach a human-readable context to `io::Error`s.
pub trait IoContext<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| Error::Io {
            context: f().into(),
            source,
        })
    }
}
