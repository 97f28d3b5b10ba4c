use std::fmt;
use std::path::PathBuf;

/// Which way the data pointer was moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "'['"),
            UnmatchedBracketKind::Close => write!(f, "']'"),
        }
    }
}

/// The data pointer tried to leave the tape. `index` is where it would have landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("pointer moved {direction} to cell {index}, outside a tape of {capacity} cells")]
pub struct TapeBoundsError {
    pub direction: Direction,
    pub index: isize,
    pub capacity: usize,
}

/// A `[` or `]` has no partner inside the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unmatched bracket {kind} at instruction {ip}")]
pub struct MalformedProgramError {
    pub ip: usize,
    pub kind: UnmatchedBracketKind,
}

/// A script does not fit in the staging buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("program is larger than the {limit} byte limit (read at least {len} bytes)")]
pub struct ProgramTooLargeError {
    pub len: usize,
    pub limit: usize,
}

/// Errors that can occur while executing a program.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The data pointer attempted to move left of cell 0 or beyond the last cell.
    #[error("Pointer out of bounds at instruction {ip}: {source}")]
    TapeBounds {
        ip: usize,
        #[source]
        source: TapeBoundsError,
    },

    /// Loops were not balanced; a matching `[` or `]` was not found.
    #[error(transparent)]
    MalformedProgram(#[from] MalformedProgramError),

    /// The input source or output sink failed.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: u64 },

    /// Execution aborted due to cooperative cancellation (e.g., timeout or Ctrl+C)
    #[error("Execution aborted: cancelled")]
    Canceled,
}

/// Errors raised while staging a script from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    TooLarge(#[from] ProgramTooLargeError),
}
