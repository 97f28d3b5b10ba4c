//! The execution engine: a program, a tape, and a pair of byte streams.
//!
//! Behaviours worth knowing:
//! - The tape starts zeroed with the data pointer on cell 0.
//! - Strict pointer bounds: moving left from cell 0 or right past the end
//!   returns an error and leaves the tape untouched.
//! - Input `,` reads a single byte; at end of input the current cell is left unchanged.
//! - Output `.` writes the current cell as one raw byte.
//! - Brackets are paired once when the [`Program`] is built, so jumps are O(1).
//! - Bytes outside `><+-.,[]` are comments.

use std::io::{self, Read, Write};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tracing::{debug, trace};

use crate::error::{Direction, EngineError, MalformedProgramError, UnmatchedBracketKind};
use crate::program::{Instruction, Program};
use crate::tape::{DEFAULT_TAPE_SIZE, Tape};

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone, Debug, Default)]
pub struct StepControl {
    pub max_steps: Option<u64>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<u64>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

/// Interpreter state for one program run.
///
/// The engine exclusively owns its tape and both cursors. The input source and
/// output sink are handed in by the caller and can be taken back with
/// [`Engine::into_parts`].
pub struct Engine<R, W> {
    program: Program,
    tape: Tape,
    ip: usize,
    steps: u64,
    input: R,
    output: W,
}

impl<R: Read, W: Write> Engine<R, W> {
    /// Create an engine with the default 30,000-cell tape.
    pub fn new(program: Program, input: R, output: W) -> Self {
        Self::with_tape_size(program, DEFAULT_TAPE_SIZE, input, output)
    }

    /// Create an engine with a custom tape size.
    pub fn with_tape_size(program: Program, tape_size: usize, input: R, output: W) -> Self {
        Self {
            program,
            tape: Tape::new(tape_size),
            ip: 0,
            steps: 0,
            input,
            output,
        }
    }

    /// Validate `source` and create an engine over it.
    pub fn from_source(source: &[u8], input: R, output: W) -> Result<Self, MalformedProgramError> {
        Ok(Self::new(Program::new(source)?, input, output))
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn instruction_cursor(&self) -> usize {
        self.ip
    }

    /// Instructions dispatched by the most recent run, comments included.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Execute the program until completion.
    ///
    /// Returns `Ok(())` on success or an [`EngineError`] on failure. No step limit applies.
    pub fn run(&mut self) -> Result<(), EngineError> {
        self.execute(None, None)
    }

    /// Execute with cooperative cancellation and optional step limit.
    pub fn run_with_control(&mut self, step_control: &StepControl) -> Result<(), EngineError> {
        self.execute(None, Some(step_control))
    }

    /// Debug-run the program, writing a step-by-step table of operations to `table`
    /// instead of producing I/O side effects. The tape advances exactly as it would
    /// during a real run, but:
    /// - '.' does not emit the byte; the action is logged instead
    /// - ',' does not read input; end of input is simulated and the cell kept
    pub fn run_debug(&mut self, table: &mut dyn Write) -> Result<(), EngineError> {
        self.execute(Some(table), None)
    }

    /// Debug-run with cooperative cancellation and optional step limit.
    pub fn run_debug_with_control(
        &mut self,
        table: &mut dyn Write,
        step_control: &StepControl,
    ) -> Result<(), EngineError> {
        self.execute(Some(table), Some(step_control))
    }

    fn execute(
        &mut self,
        mut table: Option<&mut dyn Write>,
        step_control: Option<&StepControl>,
    ) -> Result<(), EngineError> {
        self.steps = 0;
        debug!(
            program_len = self.program.len(),
            tape_len = self.tape.len(),
            debug = table.is_some(),
            "run started"
        );

        if let Some(t) = table.as_mut() {
            let ip = self.ip;
            writeln!(
                t,
                "STEP | IP  | PTR | CELL | INSTR | ACTION\n\
                 -----+-----+-----+------+-------+------------------------------------------------"
            )
            .map_err(|source| EngineError::Io { ip, source })?;
        }

        while self.ip < self.program.len() {
            if let Some(ctrl) = step_control {
                if ctrl.cancel_flag.load(Ordering::Relaxed) {
                    debug!(ip = self.ip, steps = self.steps, "run cancelled");
                    return Err(EngineError::Canceled);
                }
                if let Some(max) = ctrl.max_steps {
                    if self.steps >= max {
                        return Err(EngineError::StepLimitExceeded { limit: max });
                    }
                }
            }

            let code_ptr = self.ip;
            self.steps += 1;

            let Some(instr) = self.program.instruction(code_ptr) else {
                self.ip += 1;
                continue;
            };

            let (ptr_before, cell_before) = (self.tape.cursor(), self.tape.get());
            let debug = table.is_some();
            let mut action = String::new();
            let mut next = code_ptr + 1;

            match instr {
                Instruction::Right | Instruction::Left => {
                    let direction = if instr == Instruction::Right {
                        Direction::Right
                    } else {
                        Direction::Left
                    };
                    let at = self
                        .tape
                        .shift(direction)
                        .map_err(|source| EngineError::TapeBounds { ip: code_ptr, source })?;
                    if debug {
                        action = format!("Moved pointer head to index {at}");
                    }
                }
                Instruction::Increment => {
                    let after = self.tape.increment();
                    if debug {
                        action =
                            format!("Increment cell[{ptr_before}] from {cell_before} to {after}");
                    }
                }
                Instruction::Decrement => {
                    let after = self.tape.decrement();
                    if debug {
                        action =
                            format!("Decrement cell[{ptr_before}] from {cell_before} to {after}");
                    }
                }
                Instruction::Output => {
                    if debug {
                        action = format!("Output byte {cell_before} (suppressed in debug)");
                    } else {
                        self.output
                            .write_all(&[cell_before])
                            .map_err(|source| EngineError::Io { ip: code_ptr, source })?;
                    }
                }
                Instruction::Input => {
                    if debug {
                        action = "Read byte -> simulated end of input (cell unchanged)".to_string();
                    } else {
                        let byte = read_byte(&mut self.input)
                            .map_err(|source| EngineError::Io { ip: code_ptr, source })?;
                        // End of input leaves the cell as it was.
                        if let Some(b) = byte {
                            self.tape.set(b);
                        }
                    }
                }
                Instruction::LoopStart => {
                    if cell_before == 0 {
                        let j = self.partner(code_ptr)?;
                        trace!(from = code_ptr, to = j, "skip loop");
                        if debug {
                            action = format!("Cell is 0; jump past matching ']' at IP {j}");
                        }
                        next = j + 1;
                    } else if debug {
                        action = "Enter loop (cell != 0)".to_string();
                    }
                }
                Instruction::LoopEnd => {
                    // Land on the '[' itself so it re-tests the cell.
                    let j = self.partner(code_ptr)?;
                    trace!(from = code_ptr, to = j, "loop back");
                    if debug {
                        action = format!("Jump back to matching '[' at IP {j}");
                    }
                    next = j;
                }
            }

            if let Some(t) = table.as_mut() {
                writeln!(
                    t,
                    "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
                    self.steps - 1,
                    code_ptr,
                    ptr_before,
                    cell_before,
                    instr.symbol(),
                    action
                )
                .map_err(|source| EngineError::Io { ip: code_ptr, source })?;
            }

            self.ip = next;
        }

        debug!(steps = self.steps, "run finished");
        Ok(())
    }

    fn partner(&self, ip: usize) -> Result<usize, EngineError> {
        // Only reachable if the table is out of sync with the code; Program::new rules that out.
        self.program.partner(ip).ok_or_else(|| {
            EngineError::MalformedProgram(MalformedProgramError {
                ip,
                kind: if self.program.as_bytes()[ip] == b'[' {
                    UnmatchedBracketKind::Open
                } else {
                    UnmatchedBracketKind::Close
                },
            })
        })
    }
}

/// Read exactly one byte, retrying interrupted reads. `None` means end of input.
fn read_byte<R: Read>(input: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
