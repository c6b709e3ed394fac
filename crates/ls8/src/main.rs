//! CLI entry point for the LS-8 emulator binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ls8::loader::{load_image, ImageFormat};
use ls8::output::WriterOutput;
use ls8::scheduler::{PacedOutcome, PacedRunner, PacedStop};
use ls8_core::{
    disassemble, disassemble_one, CoreConfig, CoreSnapshot, CoreState, GeneralRegister, RunStop,
};
#[cfg(test)]
use tempfile as _;
use thiserror as _;

const USAGE_TEXT: &str = "\
Usage: ls8 <image> [options]

Options:
  --binary           Treat the image as raw bytes instead of .ls8 text
  --hz <rate>        Execute <rate> instructions per second (default: unpaced)
  --max-steps <n>    Stop after <n> instructions
  --trace            Print each instruction to stderr before it executes
  --dump             Print registers to stderr when the run ends
  --snapshot <file>  Write the final machine state to <file> as JSON
  --list             Print a disassembly of the image instead of running it
  -h, --help         Show this help message

Exit status:
  0  halted   1  fault or load error   2  usage error   3  step limit reached

Examples:
  ls8 demos/print8.ls8
  ls8 demos/mult.ls8 --hz 10 --trace
";

const EXIT_HALTED: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_STEP_LIMIT: i32 = 3;

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    image: PathBuf,
    format: ImageFormat,
    hz: Option<u32>,
    max_steps: Option<u64>,
    trace: bool,
    dump: bool,
    snapshot: Option<PathBuf>,
    list: bool,
}

#[derive(Debug)]
enum ParseResult {
    Run(RunArgs),
    Help,
}

fn parse_value<T: std::str::FromStr>(
    flag: &str,
    value: Option<OsString>,
) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("missing value for {flag}"))?;
    value
        .to_string_lossy()
        .parse()
        .map_err(|_| format!("invalid value for {flag}: {}", value.to_string_lossy()))
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut image: Option<PathBuf> = None;
    let mut format = ImageFormat::Text;
    let mut hz = None;
    let mut max_steps = None;
    let mut trace = false;
    let mut dump = false;
    let mut snapshot = None;
    let mut list = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--binary" {
            format = ImageFormat::Binary;
            continue;
        }

        if arg == "--trace" {
            trace = true;
            continue;
        }

        if arg == "--dump" {
            dump = true;
            continue;
        }

        if arg == "--list" {
            list = true;
            continue;
        }

        if arg == "--snapshot" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --snapshot".to_string())?;
            snapshot = Some(PathBuf::from(value));
            continue;
        }

        if arg == "--hz" {
            hz = Some(parse_value("--hz", args.next())?);
            continue;
        }

        if arg == "--max-steps" {
            max_steps = Some(parse_value("--max-steps", args.next())?);
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if image.is_some() {
            return Err("multiple image paths provided".to_string());
        }
        image = Some(PathBuf::from(arg));
    }

    let image = image.ok_or_else(|| "missing image path".to_string())?;
    Ok(ParseResult::Run(RunArgs {
        image,
        format,
        hz,
        max_steps,
        trace,
        dump,
        snapshot,
        list,
    }))
}

fn dump_state(state: &CoreState) {
    let registers = &state.registers;
    let gprs: Vec<String> = GeneralRegister::ALL
        .iter()
        .map(|&reg| format!("R{}={:02X}", reg.index(), registers.gpr(reg)))
        .collect();

    eprintln!("{}", gprs.join(" "));
    eprintln!(
        "PC={:02X} FL={:08b} SP={:02X}",
        registers.pc(),
        registers.flags(),
        registers.sp()
    );
    if let Some(fault) = state.run_state.latched_fault() {
        eprintln!("FAULT {:?}: {fault}", fault.class());
    }
}

fn print_listing(state: &CoreState, image_len: usize) {
    for row in disassemble(&state.memory, 0, image_len) {
        if usize::from(row.address) >= image_len {
            break;
        }
        println!("{row}");
    }
}

fn write_snapshot(path: &Path, state: &CoreState) -> Result<(), String> {
    let json = serde_json::to_string_pretty(&CoreSnapshot::capture(state))
        .map_err(|e| format!("failed to encode snapshot: {e}"))?;
    fs::write(path, json)
        .map_err(|e| format!("failed to write snapshot {}: {e}", path.display()))
}

fn exit_code(outcome: &PacedOutcome, args: &RunArgs) -> i32 {
    match outcome.stop {
        PacedStop::Core(RunStop::Halted) => {
            log::info!("halted after {} steps", outcome.steps);
            EXIT_HALTED
        }
        PacedStop::Core(RunStop::Fault(fault)) => {
            eprintln!("error: {fault}");
            EXIT_FAILURE
        }
        PacedStop::Core(RunStop::StepLimit) => {
            eprintln!(
                "error: step limit of {} reached before halt",
                args.max_steps.unwrap_or(outcome.steps)
            );
            EXIT_STEP_LIMIT
        }
        PacedStop::Cancelled => {
            eprintln!("error: run cancelled after {} steps", outcome.steps);
            EXIT_FAILURE
        }
    }
}

fn run_image(args: &RunArgs) -> i32 {
    let runner = match args.hz.map(PacedRunner::from_hz).transpose() {
        Ok(runner) => runner.unwrap_or_else(PacedRunner::unpaced),
        Err(e) => {
            eprintln!("error: {e}");
            return EXIT_USAGE;
        }
    };

    let image = match load_image(&args.image, args.format) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("error: {e}");
            return EXIT_FAILURE;
        }
    };

    let config = CoreConfig {
        step_limit: args.max_steps,
        ..CoreConfig::default()
    };
    let mut state = match CoreState::with_program(&config, &image) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("error: {e}");
            return EXIT_FAILURE;
        }
    };

    if args.list {
        print_listing(&state, image.len());
        return EXIT_HALTED;
    }

    let mut output = WriterOutput::new(io::stdout().lock());
    let outcome = runner.run(&mut state, &mut output, &config, |state| {
        if args.trace {
            eprintln!("{}", disassemble_one(state.registers.pc(), &state.memory));
        }
    });

    if let Err(e) = output.finish() {
        eprintln!("error: failed to write output: {e}");
        return EXIT_FAILURE;
    }

    if args.dump {
        dump_state(&state);
    }

    if let Some(path) = &args.snapshot {
        if let Err(e) = write_snapshot(path, &state) {
            eprintln!("error: {e}");
            return EXIT_FAILURE;
        }
    }

    exit_code(&outcome, args)
}

fn main() {
    env_logger::init();

    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            EXIT_HALTED
        }
        Ok(ParseResult::Run(args)) => run_image(&args),
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            EXIT_USAGE
        }
    };

    std::process::exit(exit_code);
}
