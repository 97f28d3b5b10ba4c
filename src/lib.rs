//! A small, bounds-checked Brainfuck interpreter.
//!
//! Programs run over a fixed tape of 8-bit cells (30,000 by default) with a single
//! data pointer. The engine reads from any [`std::io::Read`] and writes to any
//! [`std::io::Write`].
//!
//! Features and behaviors:
//! - Memory tape initialized to 0; cells wrap modulo 256.
//! - Strict pointer bounds: moving left from cell 0 or right past the end
//!   returns [`EngineError::TapeBounds`].
//! - Input `,` reads a single byte; at end of input the current cell is left unchanged.
//! - Output `.` writes the byte at the current cell; write failures abort the run.
//! - Brackets are paired up front; unbalanced programs are rejected before they run.
//! - Any other character is a comment.
//!
//! Quick start:
//!
//! ```
//! use brainfuck::Engine;
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = concat!(
//!     "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.",
//!     "<<+++++++++++++++.>.+++.------.--------.>+.>.",
//! );
//! let mut bf = Engine::from_source(code.as_bytes(), std::io::empty(), Vec::new())
//!     .expect("brackets are balanced");
//! bf.run().expect("program should run");
//! assert_eq!(bf.output().as_slice(), b"Hello World!\n");
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod program;
pub mod script;
pub mod tape;

pub use engine::{Engine, StepControl};
pub use error::{
    Direction, EngineError, LoadError, MalformedProgramError, ProgramTooLargeError,
    TapeBoundsError, UnmatchedBracketKind,
};
pub use program::{Instruction, Program};
pub use tape::{DEFAULT_TAPE_SIZE, Tape};
