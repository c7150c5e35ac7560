//! Classification of raw event records into statistics updates.

use std::{path::Path, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{kind::EventKind, registry::StatisticsRegistry};

/// One event record as delivered by an event source.
///
/// `exe_path` is the executable path of the process the event refers to;
/// exec events additionally carry the executable path of the exec target.
/// Paths may be empty or unparsable, in which case the event is still
/// counted but excluded from lineage accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub kind: EventKind,
    #[serde(default)]
    pub seq: u64,
    #[serde(default)]
    pub exe_path: String,
    #[serde(default)]
    pub target_exe_path: Option<String>,
}

/// Stateless translator from [`RawEvent`] records to registry updates.
///
/// Display names are the basenames of the executable paths; matching by
/// basename is the intended granularity of the statistics.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<StatisticsRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<StatisticsRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<StatisticsRegistry> {
        &self.registry
    }

    /// Route one event into the registry. Never fails: a record with a
    /// missing process name only loses its lineage contribution.
    pub fn handle(&self, event: &RawEvent) {
        let source = executable_name(&event.exe_path);
        if event.kind.is_lineage() && source.is_empty() {
            log::debug!(
                "{} event without executable path, skipping lineage accounting",
                event.kind
            );
        }
        let target = event.target_exe_path.as_deref().map(executable_name);
        self.registry.handle(event.kind, event.seq, source, target);
    }
}

/// Basename of an executable path, or `""` when none can be derived.
fn executable_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("")
}
