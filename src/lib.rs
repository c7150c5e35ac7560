//! evtstat observes a stream of kernel event notifications and prints
//! human-readable statistics on demand.
//!
//! Two kinds of statistics are collected by the [`evtstat_core`] engine:
//!
//! - per event kind, the number of messages received and the number
//!   inferred missing from per-kind sequence numbers;
//! - per watched executable (`--apps`), the exec/fork/exit lineage: which
//!   programs exec'd into it, which programs it exec'd into, and whether
//!   its fork/exit balance adds up.
//!
//! Events are delivered by an [event source](source::EventSource); the
//! shipped source replays JSON-lines records from a file or stdin. Sending
//! `SIGUSR1` to the process dumps the current statistics; unless
//! `--cumulative` is set, every dump starts a fresh interval.

use std::sync::Arc;

use anyhow::Result;
use evtstat_core::{Dispatcher, EventKind, StatisticsRegistry};
use tokio::signal::unix::{signal, SignalKind};

use crate::source::{EventSource, JsonlSource};

pub mod cli;
pub mod output;
pub mod source;

/// Init logger. We log from info level and above, hide timestamp
/// and module path.
/// If RUST_LOG is set, we assume the user wants to debug something
/// and use env_logger default behaviour.
pub fn init_logger(override_log_level: log::LevelFilter) {
    if std::env::var_os("RUST_LOG").is_some() {
        env_logger::init();
    } else {
        env_logger::builder()
            .filter_level(override_log_level)
            .format_timestamp(None)
            .format_target(false)
            .init();
    }
}

/// Resolve the subscription from the command line options.
///
/// Watching executables auto-subscribes the three lineage kinds; `-e`
/// names are matched ignoring case and an unknown name aborts startup.
pub fn subscription(options: &cli::Options) -> Result<Vec<EventKind>> {
    let mut kinds = Vec::new();
    if !options.apps.is_empty() {
        kinds.extend([
            EventKind::NotifyExec,
            EventKind::NotifyFork,
            EventKind::NotifyExit,
        ]);
    }
    for name in &options.events {
        let kind = EventKind::resolve(name)?;
        log::info!("Adding {kind} to observed events");
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    anyhow::ensure!(
        !kinds.is_empty(),
        "nothing to observe: pass executables via --apps or event kinds via --events"
    );
    Ok(kinds)
}

pub fn print_available_events() {
    println!("Available event kinds:");
    for (position, kind) in EventKind::all().enumerate() {
        println!("{:3}. {}", position + 1, kind.name());
    }
}

/// Run the tool: subscribe, consume events, dump statistics on SIGUSR1
/// and once more when the stream ends or SIGINT arrives.
pub async fn run(options: &cli::Options) -> Result<()> {
    let kinds = subscription(options)?;
    let registry = Arc::new(StatisticsRegistry::new(&kinds, options.apps.iter().cloned()));
    let dispatcher = Dispatcher::new(registry.clone());
    let display = output::DisplayOptions {
        children: options.child,
        parents: options.parent,
    };

    let mut events = JsonlSource::new(options.replay.clone()).subscribe(&kinds)?;

    println!(
        "Send SIGUSR1 to pid {} for event statistics. Statistics will{}be reset after each query",
        std::process::id(),
        if options.cumulative { " NOT " } else { " " }
    );

    let mut sig_usr1 = signal(SignalKind::user_defined1())?;
    let mut sig_int = signal(SignalKind::interrupt())?;
    let mut dump_number = 0;

    loop {
        tokio::select! {
            maybe_event = events.recv() => match maybe_event {
                Some(event) => dispatcher.handle(&event),
                None => {
                    log::debug!("event stream ended");
                    break;
                }
            },
            _ = sig_usr1.recv() => {
                dump_number += 1;
                output::print_statistics(&registry.dump(options.cumulative), display, dump_number);
            }
            _ = sig_int.recv() => {
                log::trace!("SIGINT received");
                break;
            }
        }
    }

    // closing dump so short runs always produce output
    dump_number += 1;
    output::print_statistics(&registry.dump(options.cumulative), display, dump_number);
    Ok(())
}
