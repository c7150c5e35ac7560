//! Statistics-aggregation core for kernel event notifications.
//!
//! The crate accumulates counts from a live, unordered, possibly lossy
//! event stream and answers on-demand statistics queries:
//!
//! - per event kind: how many messages were received and how many were
//!   inferred missing from per-kind sequence numbers ([`counter`]);
//! - per watched executable: who exec'd into or out of it and how its
//!   fork/exit balance looks ([`lineage`]).
//!
//! Events enter through a [`dispatch::Dispatcher`] which classifies raw
//! records and feeds the shared [`registry::StatisticsRegistry`]; an
//! external trigger (typically a signal handler) calls
//! [`registry::StatisticsRegistry::dump`] to capture and optionally reset
//! the counts. Delivery may happen concurrently from any number of tasks,
//! the registry's two lock domains keep every update and every dump
//! consistent.
//!
//! The kernel subscription mechanism itself is not part of this crate;
//! any source able to produce [`dispatch::RawEvent`] records can drive it.

pub mod counter;
pub mod dispatch;
pub mod kind;
pub mod lineage;
pub mod registry;

pub use counter::EventCounter;
pub use dispatch::{Dispatcher, RawEvent};
pub use kind::{EventKind, UnknownEventKind};
pub use lineage::{ExecutableSnapshot, ExecutableStats};
pub use registry::{KindCounts, StatisticsRegistry, StatisticsSnapshot};
