//! Event source boundary.
//!
//! The statistics core is driven by whatever can deliver [`RawEvent`]
//! records; [`EventSource`] is that boundary. The implementation shipped
//! here replays a JSON-lines stream (a file or standard input), which keeps
//! the kernel subscription mechanism itself out of this repository while
//! exercising the full delivery path: unordered arrival, sequence gaps and
//! malformed records included.

use std::{io, path::PathBuf};

use evtstat_core::{EventKind, RawEvent};
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("insufficient privilege to open event source {0}")]
    PermissionDenied(PathBuf),
    #[error("failed to subscribe to event source: {0}")]
    SubscriptionFailed(String),
}

/// Anything able to deliver a stream of raw events for a set of
/// subscribed kinds.
pub trait EventSource {
    /// Start delivery. Events of unsubscribed kinds are never delivered.
    fn subscribe(self, kinds: &[EventKind]) -> Result<mpsc::Receiver<RawEvent>, SourceError>;
}

const CHANNEL_SIZE: usize = 1000;

/// Replays `RawEvent` records from a JSON-lines file, or from standard
/// input when no path is given.
pub struct JsonlSource {
    path: Option<PathBuf>,
}

impl JsonlSource {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl EventSource for JsonlSource {
    fn subscribe(self, kinds: &[EventKind]) -> Result<mpsc::Receiver<RawEvent>, SourceError> {
        let (tx, rx) = mpsc::channel(CHANNEL_SIZE);
        let kinds = kinds.to_vec();
        match self.path {
            Some(path) => {
                let file = std::fs::File::open(&path).map_err(|err| match err.kind() {
                    io::ErrorKind::PermissionDenied => SourceError::PermissionDenied(path.clone()),
                    _ => SourceError::SubscriptionFailed(format!("{}: {err}", path.display())),
                })?;
                let reader = BufReader::new(tokio::fs::File::from_std(file));
                tokio::spawn(replay(reader, kinds, tx));
            }
            None => {
                let reader = BufReader::new(tokio::io::stdin());
                tokio::spawn(replay(reader, kinds, tx));
            }
        }
        Ok(rx)
    }
}

async fn replay<R>(reader: BufReader<R>, kinds: Vec<EventKind>, tx: mpsc::Sender<RawEvent>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let event: RawEvent = match serde_json::from_str(line) {
                    Ok(event) => event,
                    Err(err) => {
                        log::warn!("skipping malformed event record: {err}");
                        continue;
                    }
                };
                if !kinds.contains(&event.kind) {
                    continue;
                }
                if tx.send(event).await.is_err() {
                    // receiver dropped, stop replaying
                    return;
                }
            }
            Ok(None) => return,
            Err(err) => {
                log::warn!("error reading event stream: {err}");
                return;
            }
        }
    }
}
