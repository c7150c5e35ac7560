//! The closed catalog of kernel notification kinds.
//!
//! Every kind has exactly one canonical `SCREAMING_SNAKE_CASE` display name
//! (e.g. [`EventKind::NotifyExec`] ↔ `NOTIFY_EXEC`); the bijection is
//! generated by the `strum` derives rather than hand-maintained tables.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use thiserror::Error;

/// A kernel event notification type.
///
/// The set is fixed at build time; membership of a statistics subscription
/// is decided at startup and never changes afterwards.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
    strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    NotifyExec,
    NotifyFork,
    NotifyExit,
    NotifyOpen,
    NotifyClose,
    NotifyCreate,
    NotifyRename,
    NotifyUnlink,
    NotifyLink,
    NotifyWrite,
    NotifyTruncate,
    NotifyMmap,
    NotifyMprotect,
    NotifySignal,
    NotifyMount,
    NotifyUnmount,
    NotifyChdir,
    NotifyChroot,
    NotifyClone,
    NotifyLookup,
    NotifyStat,
    NotifyAccess,
    NotifyReaddir,
    NotifyDup,
    NotifyUtimes,
    NotifySetmode,
    NotifySetowner,
    NotifySetextattr,
    NotifyGetTask,
    NotifyIokitOpen,
    NotifyPtyGrant,
    NotifyPtyClose,
}

/// The user asked for an event kind name which is not in the catalog.
///
/// Raised at configuration time only; the boundary maps it to a process
/// exit code and aborts startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} is not a valid event kind")]
pub struct UnknownEventKind(pub String);

impl EventKind {
    /// Canonical display name of this kind.
    pub fn name(&self) -> &'static str {
        (*self).into()
    }

    /// Look up a kind by name, ignoring ASCII case.
    pub fn resolve(name: &str) -> Result<EventKind, UnknownEventKind> {
        name.to_ascii_uppercase()
            .parse()
            .map_err(|_| UnknownEventKind(name.to_string()))
    }

    /// All catalog entries, in declaration order.
    pub fn all() -> impl Iterator<Item = EventKind> {
        EventKind::iter()
    }

    /// Whether events of this kind carry process lineage information
    /// (exec source/target, fork, exit).
    pub fn is_lineage(&self) -> bool {
        matches!(
            self,
            EventKind::NotifyExec | EventKind::NotifyFork | EventKind::NotifyExit
        )
    }
}
