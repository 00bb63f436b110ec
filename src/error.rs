//! Error taxonomy for the whole crate.
//!
//! Every fallible operation returns [`Result`]. There are no internal
//! retries — all operations are deterministic — and no partial results:
//! an import or index query either fully succeeds or fails with one of
//! the variants below.
use thiserror::Error;

/// Errors raised while reading, assembling, or indexing trial data.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying file I/O failed (file not found, permission, short read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a readable MAT-file, or an element inside it is
    /// structurally malformed.
    #[error("malformed MAT-file: {0}")]
    Format(String),

    /// A variable required by the trial vocabulary is absent from the file.
    #[error("required variable `{0}` is missing")]
    MissingVariable(String),

    /// Per-trial data is malformed; names the offending trial and field.
    #[error("trial {index}, field `{field}`: {reason}")]
    Trial {
        index: i64,
        field: &'static str,
        reason: String,
    },

    /// A constructor invariant was violated (event ordering, axis/matrix
    /// shape mismatch, non-increasing frame times).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A string did not name any of the six `EventTiming` fields.
    #[error("unknown event field `{0}`")]
    UnknownEventField(String),

    /// An index query asked for data outside the trial's recorded span.
    #[error("out of range: {0}")]
    OutOfRange(String),
}

pub type Result<T> = std::result::Result<T, Error>;
