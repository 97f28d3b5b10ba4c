use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{LoadError, ProgramTooLargeError};

/// Largest script staged unless configured otherwise (1 MiB).
pub const DEFAULT_MAX_PROGRAM_SIZE: usize = 1 << 20;

/// File suffixes recognised as scripts.
pub const SCRIPT_EXTENSIONS: [&str; 2] = [".b", ".bf"];

/// How a single command-line argument should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Help,
    ExecuteFile,
    Unknown,
}

pub fn classify(argument: &str) -> ArgumentKind {
    if argument == "-h" || argument == "--help" {
        ArgumentKind::Help
    } else if SCRIPT_EXTENSIONS
        .iter()
        .any(|ext| argument.len() > ext.len() && argument.ends_with(ext))
    {
        ArgumentKind::ExecuteFile
    } else {
        ArgumentKind::Unknown
    }
}

/// Read a whole script into memory, refusing anything over `limit` bytes.
///
/// At most `limit + 1` bytes are read, so an oversized file is detected without
/// loading it completely. Nothing is ever truncated.
pub fn load_script(path: &Path, limit: usize) -> Result<Vec<u8>, LoadError> {
    let read_err = |source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_err)?;
    let mut buf = Vec::new();
    file.take((limit as u64).saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(read_err)?;

    if buf.len() > limit {
        return Err(ProgramTooLargeError {
            len: buf.len(),
            limit,
        }
        .into());
    }

    debug!(path = %path.display(), bytes = buf.len(), "script loaded");
    Ok(buf)
}
