use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal};

use clap::{ArgAction, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use ustring::{ErrorPolicy, RunOptions, StopReason};

#[derive(Parser, Debug)]
#[command(name = "ustring", version, about = "UTF-8 string builder driven by commands")]
struct Args {
    /// Command script to read. Omit or use '-' to read from stdin.
    input: Option<String>,

    /// What to do when a command is malformed: abort (default) or skip.
    #[arg(long = "on-error", value_enum, value_name = "policy", default_value_t = OnErrorArg::Abort)]
    on_error: OnErrorArg,

    /// Increase log verbosity on stderr (-v: info, -vv: debug, -vvv: trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OnErrorArg {
    Abort,
    Skip,
}

impl From<OnErrorArg> for ErrorPolicy {
    fn from(value: OnErrorArg) -> Self {
        match value {
            OnErrorArg::Abort => ErrorPolicy::Abort,
            OnErrorArg::Skip => ErrorPolicy::Skip,
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(&args);

    if let Err(err) = run(&args) {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let options = RunOptions::new().with_error_policy(args.on_error.into());
    let reader = open_input(args.input.as_deref())?;

    let stdout = io::stdout();
    let summary = ustring::run_with_options(reader, stdout.lock(), &options)?;

    if summary.stopped_by == StopReason::EndOfInput {
        tracing::debug!("input ended without exit");
    }
    Ok(())
}

fn open_input(input: Option<&str>) -> Result<Box<dyn BufRead>, Box<dyn Error>> {
    match input {
        None | Some("-") => Ok(Box::new(io::stdin().lock())),
        Some(path) => {
            let file = File::open(path).map_err(|err| format!("cannot open {path}: {err}"))?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

fn init_logging(args: &Args) {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}
