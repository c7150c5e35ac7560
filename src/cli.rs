use std::path::PathBuf;

use clap::{ArgAction, Parser};

pub const NAME: &str = "evtstat";

#[derive(Parser, Debug, Clone)]
#[command(
    name = NAME,
    version,
    about = "Kernel event statistics tool\n\n\
        Prints statistics for kernel event notifications on every SIGUSR1 signal.\n\n\
        Examples:\n\
        evtstat -a ls git --replay trace.jsonl\n\
        evtstat -e NOTIFY_PTY_GRANT NOTIFY_PTY_CLOSE -a sshd\n\
        evtstat -a sshd -p -c"
)]
pub struct Options {
    /// Executable names to watch lineage statistics for. Watching any
    /// executable automatically subscribes NOTIFY_EXEC, NOTIFY_FORK and
    /// NOTIFY_EXIT.
    #[arg(short = 'a', long = "apps", num_args = 1..)]
    pub apps: Vec<String>,

    /// Event kind names to collect message statistics for. Names are
    /// matched ignoring case.
    #[arg(short = 'e', long = "events", num_args = 1..)]
    pub events: Vec<String>,

    /// Print the list of subscribable event kinds and exit.
    #[arg(short = 'E', long = "events-available")]
    pub events_available: bool,

    /// Show which parent processes exec'd into the watched executables.
    #[arg(short = 'p', long = "parent")]
    pub parent: bool,

    /// Show the child processes the watched executables exec into.
    #[arg(short = 'c', long = "child")]
    pub child: bool,

    /// Never reset statistics between dumps.
    #[arg(short = 'C', long = "cumulative")]
    pub cumulative: bool,

    /// Replay events from a JSON-lines file instead of reading them from
    /// standard input.
    #[arg(long = "replay", value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Pass many times for a more verbose output. Passing `-v` adds debug
    /// logs, `-vv` enables trace logging.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn parse_from_args() -> Options {
    Options::parse()
}

pub fn log_level_from_verbosity_flag_count(num: u8) -> log::LevelFilter {
    match num {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        2..=u8::MAX => log::LevelFilter::Trace,
    }
}

fn show_backtrace() -> bool {
    if log::max_level() >= log::LevelFilter::Debug {
        return true;
    }

    if let Ok(true) = std::env::var("RUST_BACKTRACE").map(|s| s == "1") {
        return true;
    }

    false
}

pub fn report_error(e: &anyhow::Error) {
    // NB: This shows one error: even for multiple causes and backtraces etc,
    // rather than one per cause, and one for the backtrace.
    if show_backtrace() {
        log::error!("{:?}", e);
    } else {
        log::error!("{:#}", e);
    }
}
