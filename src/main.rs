use evtstat::{cli, source::SourceError};
use evtstat_core::UnknownEventKind;

/// Exit codes for startup failures, one per failure class. The statistics
/// core raises these as typed errors; this boundary maps them.
fn exit_code(e: &anyhow::Error) -> i32 {
    if e.downcast_ref::<UnknownEventKind>().is_some() {
        return 2;
    }
    match e.downcast_ref::<SourceError>() {
        Some(SourceError::PermissionDenied(_)) => 3,
        Some(SourceError::SubscriptionFailed(_)) => 4,
        None => 1,
    }
}

#[tokio::main]
async fn main() {
    // Parse cli and handle clap errors
    let options = cli::parse_from_args();

    // Override the default log_level if there is a greater verbosity flag
    evtstat::init_logger(cli::log_level_from_verbosity_flag_count(options.verbose));

    if options.events_available {
        evtstat::print_available_events();
        std::process::exit(0);
    }

    match evtstat::run(&options).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            cli::report_error(&e);
            std::process::exit(exit_code(&e));
        }
    }
}
