use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use clap::Args;
use clap::builder::RangedU64ValueParser;
use tracing::{info, warn};

use crate::cli_util::{print_engine_error, print_load_error};
use crate::config::Settings;
use crate::engine::{Engine, StepControl};
use crate::error::EngineError;
use crate::program::Program;
use crate::script::{ArgumentKind, classify, load_script};
use crate::tape::MAX_TAPE_SIZE;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print a step-by-step table of operations instead of executing
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Maximum interpreter steps before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Wall-clock timeout in milliseconds (fallback BF_TIMEOUT_MS; default none)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Number of tape cells (fallback BF_TAPE_SIZE; default 30000)
    #[arg(
        long = "tape-size",
        value_name = "N",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_TAPE_SIZE as u64)
    )]
    pub tape_size: Option<usize>,

    /// Script to execute; must end in .b or .bf
    #[arg(value_name = "filename")]
    pub script: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        debug,
        max_steps,
        timeout_ms,
        tape_size,
        script,
        ..
    } = args;

    // Exactly one argument names the script; anything else is a request for usage.
    let [script] = <[String; 1]>::try_from(script).unwrap_or_else(|_| usage_and_exit(program, 0));

    match classify(&script) {
        ArgumentKind::ExecuteFile => {}
        ArgumentKind::Help | ArgumentKind::Unknown => usage_and_exit(program, 0),
    }

    // Resolve limits: flags -> env -> config file -> defaults
    let mut settings = Settings::load();
    if let Some(n) = max_steps.filter(|&n| n > 0) {
        settings.max_steps = Some(n);
    }
    if let Some(ms) = timeout_ms.filter(|&ms| ms > 0) {
        settings.timeout_ms = Some(ms);
    }
    if let Some(n) = tape_size {
        settings.tape_size = n;
    }

    let code = match load_script(Path::new(&script), settings.max_program_size) {
        Ok(code) => code,
        Err(e) => {
            print_load_error(program, &e);
            return 1;
        }
    };

    let parsed = match Program::new(&code) {
        Ok(p) => p,
        Err(e) => {
            print_engine_error(Some(program), &code, &EngineError::from(e));
            return 1;
        }
    };

    info!(script = %script, ?settings, "executing script");

    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = cancel.clone();
    // First Ctrl+C asks the worker to stop; a second one exits even if it is blocked on input.
    if let Err(e) = ctrlc::set_handler(move || {
        if handler_flag.swap(true, Ordering::Relaxed) {
            let _ = io::stdout().flush();
            std::process::exit(130);
        }
    }) {
        warn!("failed to set ctrl+c handler: {e}");
    }

    // Execute on a worker thread with cooperative cancellation
    let (tx, rx) = mpsc::channel::<Result<(), EngineError>>();
    let ctrl = StepControl::new(settings.max_steps, cancel.clone());
    let tape_size = settings.tape_size;

    thread::spawn(move || {
        let res = if debug {
            let mut bf = Engine::with_tape_size(parsed, tape_size, io::empty(), io::sink());
            let mut table = io::stdout();
            bf.run_debug_with_control(&mut table, &ctrl)
                .and_then(|_| flush(&mut table, bf.instruction_cursor()))
        } else {
            // Unlocked handles: the main thread must still be able to flush after a timeout.
            let mut bf =
                Engine::with_tape_size(parsed, tape_size, io::stdin(), io::stdout());
            let res = bf.run_with_control(&ctrl);
            let ip = bf.instruction_cursor();
            let (_, mut out) = bf.into_parts();
            res.and_then(|_| flush(&mut out, ip))
        };
        let _ = tx.send(res);
    });

    let received = match settings.timeout_ms {
        Some(ms) => rx.recv_timeout(Duration::from_millis(ms)),
        None => rx.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected),
    };

    let exit_code = match received {
        Ok(Ok(())) => 0,
        Ok(Err(EngineError::StepLimitExceeded { limit })) => {
            eprintln!("Execution aborted: step limit exceeded ({limit})");
            1
        }
        Ok(Err(EngineError::Canceled)) => {
            eprintln!("Execution aborted: cancelled");
            1
        }
        Ok(Err(other)) => {
            print_engine_error(Some(program), &code, &other);
            1
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            let ms = settings.timeout_ms.unwrap_or_default();
            eprintln!("Execution aborted: wall-clock timeout exceeded ({ms} ms)");
            1
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => 1,
    };

    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
    exit_code
}

fn flush<W: Write>(out: &mut W, ip: usize) -> Result<(), EngineError> {
    out.flush().map_err(|source| EngineError::Io { ip, source })
}

/// Print usage and exit. Requested usage (code 0) goes to stdout; usage after an
/// argument error goes to stderr.
pub fn usage_and_exit(program: &str, code: i32) -> ! {
    let usage = format!(
        r#"A simple Brainfuck interpreter.
Usage: {0} -h | [options] [filename]

Arguments:
   [filename]            Run a Brainfuck script with a file ending in .b or .bf.
   -h, --help            Get usage information.

Options:
   --debug, -d           Print a step-by-step table of operations instead of executing
   --max-steps <N>       Abort after N instructions (fallback BF_MAX_STEPS)
   --timeout <MS>        Abort after MS milliseconds of wall-clock time (fallback BF_TIMEOUT_MS)
   --tape-size <N>       Number of tape cells (fallback BF_TAPE_SIZE; default 30000)

Notes:
- Input (`,`) reads a single byte from stdin; at end of input the current cell is unchanged.
- Characters outside of ><+-.,[] are comments.
- Settings may also be placed under [engine] in $XDG_CONFIG_HOME/brainfuck.toml.
"#,
        program
    );
    if code == 0 {
        print!("{usage}");
        let _ = io::stdout().flush();
    } else {
        eprint!("{usage}");
        let _ = io::stderr().flush();
    }
    std::process::exit(code);
}
