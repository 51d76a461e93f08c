use thiserror::Error;

pub type DeserializationResult<T> = std::result::Result<T, DeserializationError>;
pub type WidenResult<T> = std::result::Result<T, WidenError>;
pub type Result<T> = std::result::Result<T, DialogError>;

/// Errors related to decoding a 16-bit dialog template.
#[derive(Debug, Error)]
pub enum DeserializationError {
    #[error("buffer too small for {what} at offset {offset} (need {need} bytes, have {have})")]
    Truncated {
        what: &'static str,
        offset: u64,
        need: usize,
        have: usize,
    },

    #[error("offset {offset}: {what} is missing its NUL terminator")]
    UnterminatedString { what: &'static str, offset: u64 },
}

impl DeserializationError {
    /// Offset (relative to the template start) at which decoding failed.
    pub fn offset(&self) -> u64 {
        match self {
            DeserializationError::Truncated { offset, .. } => *offset,
            DeserializationError::UnterminatedString { offset, .. } => *offset,
        }
    }
}

/// Errors related to re-encoding a decoded template into the native layout.
#[derive(Debug, Error)]
pub enum WidenError {
    #[error(transparent)]
    Deserialization(#[from] DeserializationError),

    #[error("failed to decode {what} (used encoding scheme {encoding}): {message}")]
    AnsiDecode {
        what: &'static str,
        encoding: &'static str,
        message: String,
    },

    #[error("failed to register the stand-in dialog class `{class}`")]
    ClassRegistration { class: String },

    #[error("failed to write widened template: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced to callers creating a dialog.
#[derive(Debug, Error)]
pub enum DialogError {
    #[error("malformed dialog template: {0}")]
    MalformedTemplate(#[from] DeserializationError),

    #[error("failed to widen dialog template: {0}")]
    Widen(WidenError),

    #[error("dialog resource `{name}` not found")]
    ResourceNotFound { name: String },

    #[error("failed to load dialog resource `{name}`")]
    ResourceLoad { name: String },

    #[error("failed to lock dialog resource `{name}`")]
    ResourceLock { name: String },

    #[error("the native dialog window could not be created")]
    CreationFailed,
}

impl From<WidenError> for DialogError {
    fn from(err: WidenError) -> Self {
        match err {
            WidenError::Deserialization(inner) => DialogError::MalformedTemplate(inner),
            other => DialogError::Widen(other),
        }
    }
}
