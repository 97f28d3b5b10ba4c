use std::io::{self, IsTerminal, Write};

use nu_ansi_term::Color;

use crate::error::{EngineError, LoadError};

/// Bytes of program shown on each side of the offending instruction.
const WINDOW_BYTES: usize = 32;

/// Pretty-print a structured [`EngineError`] with caret positioning.
/// If `program` is `Some("brainfuck")`, messages are prefixed with "brainfuck: ...".
pub fn print_engine_error(program: Option<&str>, code: &[u8], err: &EngineError) {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    match err {
        EngineError::TapeBounds { ip, source } => {
            let msg = prefix_program(&format!(
                "Runtime error: pointer out of bounds (moved {} to {}, tape has {} cells)",
                source.direction, source.index, source.capacity
            ));
            print_error_with_context(&msg, code, *ip);
        }
        EngineError::MalformedProgram(e) => {
            let msg = prefix_program(&format!("Parse error: unmatched bracket {}", e.kind));
            print_error_with_context(&msg, code, e.ip);
        }
        EngineError::Io { ip, source } => {
            let msg = prefix_program(&format!("I/O error: {source}"));
            print_error_with_context(&msg, code, *ip);
        }
        EngineError::StepLimitExceeded { .. } | EngineError::Canceled => {
            print_heading(&prefix_program(&err.to_string()));
        }
    }
}

pub fn print_load_error(program: &str, err: &LoadError) {
    print_heading(&format!("{program}: {err}"));
}

/// Print a concise error with instruction index and a caret context window.
/// Bytes that would break the alignment (control characters, non-ASCII) are shown as spaces.
pub fn print_error_with_context(prefix: &str, code: &[u8], pos: usize) {
    print_heading(&format!("{prefix} at instruction {pos}"));

    let (window, caret) = context_window(code, pos);
    eprintln!("  {window}");
    eprintln!("  {caret}");
    let _ = io::stderr().flush();
}

fn print_heading(msg: &str) {
    if io::stderr().is_terminal() {
        eprintln!("{}", Color::Red.bold().paint(msg));
    } else {
        eprintln!("{msg}");
    }
    let _ = io::stderr().flush();
}

/// Render the bytes around `pos` and a matching caret line.
fn context_window(code: &[u8], pos: usize) -> (String, String) {
    let start = pos.saturating_sub(WINDOW_BYTES);
    let end = (pos + WINDOW_BYTES + 1).min(code.len());
    let start = start.min(end);

    let window: String = code[start..end]
        .iter()
        .map(|&b| if b.is_ascii_graphic() { b as char } else { ' ' })
        .collect();

    let mut underline = " ".repeat(pos - start);
    underline.push('^');
    (window.trim_end().to_string(), underline)
}
