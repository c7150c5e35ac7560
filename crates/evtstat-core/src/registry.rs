//! Process-wide statistics aggregate.
//!
//! The registry owns one [`EventCounter`] per subscribed kind and one
//! [`ExecutableStats`] per watched executable. The two tables live behind
//! independent locks so counting a file event never serializes against a
//! lineage update; this matches the two-mutex discipline of the event
//! handlers feeding it. Membership of both tables is fixed at construction,
//! only the contained values mutate.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use crate::{
    counter::EventCounter,
    kind::EventKind,
    lineage::{ExecutableSnapshot, ExecutableStats},
};

pub struct StatisticsRegistry {
    /// subscribed kinds in subscription order, for stable dump output
    kinds: Vec<EventKind>,
    counters: Mutex<HashMap<EventKind, EventCounter>>,
    lineage: Mutex<HashMap<String, ExecutableStats>>,
    interval_start: Mutex<Instant>,
}

/// Message counts of one event kind at dump time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindCounts {
    pub kind: EventKind,
    pub total: u64,
    pub missing: u64,
}

/// A consistent, read-only view of all statistics, captured by
/// [`StatisticsRegistry::dump`].
#[derive(Debug, Clone)]
pub struct StatisticsSnapshot {
    /// per-kind counts in subscription order
    pub events: Vec<KindCounts>,
    /// per-executable lineage counts, sorted by name
    pub executables: Vec<ExecutableSnapshot>,
    /// time elapsed since the previous dump
    pub interval: Duration,
}

impl StatisticsRegistry {
    /// Build the registry for a fixed set of subscribed kinds and watched
    /// executable names. Duplicates are collapsed, order is preserved.
    pub fn new(kinds: &[EventKind], watched: impl IntoIterator<Item = String>) -> Self {
        let mut unique_kinds = Vec::new();
        for kind in kinds {
            if !unique_kinds.contains(kind) {
                unique_kinds.push(*kind);
            }
        }
        let counters = unique_kinds
            .iter()
            .map(|kind| (*kind, EventCounter::new()))
            .collect();
        let lineage = watched
            .into_iter()
            .map(|name| (name.clone(), ExecutableStats::new(name)))
            .collect();
        Self {
            kinds: unique_kinds,
            counters: Mutex::new(counters),
            lineage: Mutex::new(lineage),
            interval_start: Mutex::new(Instant::now()),
        }
    }

    pub fn subscribed_kinds(&self) -> &[EventKind] {
        &self.kinds
    }

    /// Route one event into the statistics.
    ///
    /// The counter for `kind` is always advanced when the kind is
    /// subscribed. Lineage accounting additionally runs for exec, fork and
    /// exit events, against whichever watched entries match the source and
    /// target names; an empty or unwatched name makes that part a no-op
    /// without affecting the message count.
    pub fn handle(&self, kind: EventKind, seq: u64, source: &str, target: Option<&str>) {
        {
            let mut counters = self.counters.lock().unwrap();
            if let Some(counter) = counters.get_mut(&kind) {
                counter.record(seq);
            }
        }

        if !kind.is_lineage() {
            return;
        }
        let mut lineage = self.lineage.lock().unwrap();
        match kind {
            EventKind::NotifyExec => {
                let target = target.unwrap_or("");
                if let Some(entry) = lineage.get_mut(target) {
                    entry.on_exec(source, target);
                }
                // on a self-exec the single entry above already counted
                // both directions
                if source != target {
                    if let Some(entry) = lineage.get_mut(source) {
                        entry.on_exec(source, target);
                    }
                }
            }
            EventKind::NotifyFork => {
                if let Some(entry) = lineage.get_mut(source) {
                    entry.on_fork(source);
                }
            }
            EventKind::NotifyExit => {
                if let Some(entry) = lineage.get_mut(source) {
                    entry.on_exit(source);
                }
            }
            _ => {}
        }
    }

    /// Capture all counters atomically with respect to [`handle`] and,
    /// unless `cumulative`, reset them for the next interval.
    ///
    /// Each table is snapshotted under its own lock, so no in-flight event
    /// can be half counted across a reset boundary.
    ///
    /// [`handle`]: StatisticsRegistry::handle
    pub fn dump(&self, cumulative: bool) -> StatisticsSnapshot {
        let events = {
            let mut counters = self.counters.lock().unwrap();
            self.kinds
                .iter()
                .filter_map(|kind| {
                    counters.get_mut(kind).map(|counter| {
                        let (total, missing) = counter.snapshot_and_maybe_reset(cumulative);
                        KindCounts {
                            kind: *kind,
                            total,
                            missing,
                        }
                    })
                })
                .collect()
        };

        let executables = {
            let mut lineage = self.lineage.lock().unwrap();
            let mut executables: Vec<_> = lineage
                .values_mut()
                .map(|stats| stats.snapshot_and_maybe_reset(cumulative))
                .collect();
            executables.sort_by(|a, b| a.name.cmp(&b.name));
            executables
        };

        let interval = {
            let mut interval_start = self.interval_start.lock().unwrap();
            let elapsed = interval_start.elapsed();
            *interval_start = Instant::now();
            elapsed
        };

        StatisticsSnapshot {
            events,
            executables,
            interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    fn registry_watching(names: &[&str]) -> StatisticsRegistry {
        StatisticsRegistry::new(
            &[
                EventKind::NotifyExec,
                EventKind::NotifyFork,
                EventKind::NotifyExit,
            ],
            names.iter().map(|n| n.to_string()),
        )
    }

    fn executable<'a>(
        snapshot: &'a StatisticsSnapshot,
        name: &str,
    ) -> Option<&'a ExecutableSnapshot> {
        snapshot.executables.iter().find(|e| e.name == name)
    }

    #[test]
    fn exec_updates_counter_and_only_the_watched_side() {
        let registry = registry_watching(&["git"]);
        registry.handle(EventKind::NotifyExec, 1, "ls", Some("git"));

        let snapshot = registry.dump(true);
        let exec_counts = snapshot
            .events
            .iter()
            .find(|c| c.kind == EventKind::NotifyExec)
            .unwrap();
        assert_eq!(exec_counts.total, 1);

        let git = executable(&snapshot, "git").unwrap();
        assert_eq!(git.exec_target, 1);
        assert_eq!(git.execs_from_parents.get("ls"), Some(&1));
        // "ls" is not watched, so no entry may appear for it
        assert!(executable(&snapshot, "ls").is_none());
    }

    #[test]
    fn exec_between_two_watched_names_updates_both_entries() {
        let registry = registry_watching(&["sshd", "bash"]);
        registry.handle(EventKind::NotifyExec, 1, "sshd", Some("bash"));

        let snapshot = registry.dump(true);
        let sshd = executable(&snapshot, "sshd").unwrap();
        let bash = executable(&snapshot, "bash").unwrap();
        assert_eq!(sshd.exec_source, 1);
        assert_eq!(sshd.execs_to_children.get("bash"), Some(&1));
        assert_eq!(bash.exec_target, 1);
        assert_eq!(bash.execs_from_parents.get("sshd"), Some(&1));
    }

    #[test]
    fn self_exec_counts_once_in_each_direction() {
        let registry = registry_watching(&["sshd"]);
        registry.handle(EventKind::NotifyExec, 1, "sshd", Some("sshd"));

        let snapshot = registry.dump(true);
        let sshd = executable(&snapshot, "sshd").unwrap();
        assert_eq!(sshd.exec_source, 1);
        assert_eq!(sshd.exec_target, 1);
        assert_eq!(sshd.execs_to_children.get("sshd"), Some(&1));
        assert_eq!(sshd.execs_from_parents.get("sshd"), Some(&1));
    }

    #[test]
    fn unsubscribed_kinds_are_not_counted() {
        let registry = StatisticsRegistry::new(&[EventKind::NotifyOpen], std::iter::empty());
        registry.handle(EventKind::NotifyClose, 1, "", None);
        registry.handle(EventKind::NotifyOpen, 1, "", None);

        let snapshot = registry.dump(true);
        assert_eq!(snapshot.events.len(), 1);
        assert_eq!(snapshot.events[0].kind, EventKind::NotifyOpen);
        assert_eq!(snapshot.events[0].total, 1);
    }

    #[test]
    fn empty_source_name_still_counts_the_message() {
        let registry = registry_watching(&["sshd"]);
        registry.handle(EventKind::NotifyFork, 1, "", None);

        let snapshot = registry.dump(true);
        let fork_counts = snapshot
            .events
            .iter()
            .find(|c| c.kind == EventKind::NotifyFork)
            .unwrap();
        assert_eq!(fork_counts.total, 1);
        assert_eq!(executable(&snapshot, "sshd").unwrap().forks, 0);
    }

    #[test]
    fn interval_dump_resets_while_cumulative_does_not() {
        let registry = registry_watching(&["sshd"]);
        registry.handle(EventKind::NotifyFork, 1, "sshd", None);

        let cumulative = registry.dump(true);
        assert_eq!(executable(&cumulative, "sshd").unwrap().forks, 1);

        let interval = registry.dump(false);
        assert_eq!(executable(&interval, "sshd").unwrap().forks, 1);

        let after_reset = registry.dump(false);
        assert_eq!(executable(&after_reset, "sshd").unwrap().forks, 0);
    }

    #[test]
    fn duplicate_subscriptions_collapse_to_one_counter() {
        let registry = StatisticsRegistry::new(
            &[EventKind::NotifyOpen, EventKind::NotifyOpen],
            std::iter::empty(),
        );
        assert_eq!(registry.subscribed_kinds(), &[EventKind::NotifyOpen]);
    }

    #[test]
    fn concurrent_fork_events_lose_no_updates() {
        const THREADS: usize = 8;
        const EVENTS_PER_THREAD: u64 = 250;

        let registry = Arc::new(registry_watching(&["sshd"]));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for _ in 0..EVENTS_PER_THREAD {
                        registry.handle(EventKind::NotifyFork, 0, "sshd", None);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.dump(true);
        let expected = THREADS as u64 * EVENTS_PER_THREAD;
        assert_eq!(executable(&snapshot, "sshd").unwrap().forks, expected);
        let fork_counts = snapshot
            .events
            .iter()
            .find(|c| c.kind == EventKind::NotifyFork)
            .unwrap();
        assert_eq!(fork_counts.total, expected);
    }

    #[test]
    fn concurrent_dumps_neither_drop_nor_double_count() {
        const THREADS: usize = 8;
        const EVENTS_PER_THREAD: u64 = 250;

        let registry = Arc::new(registry_watching(&["sshd"]));
        let producers: Vec<_> = (0..THREADS)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for _ in 0..EVENTS_PER_THREAD {
                        registry.handle(EventKind::NotifyFork, 0, "sshd", None);
                    }
                })
            })
            .collect();
        let dumper = {
            let registry = registry.clone();
            thread::spawn(move || {
                let mut seen = 0;
                for _ in 0..20 {
                    seen += executable(&registry.dump(false), "sshd").unwrap().forks;
                    thread::yield_now();
                }
                seen
            })
        };
        for producer in producers {
            producer.join().unwrap();
        }
        let seen_during = dumper.join().unwrap();
        let seen_after = executable(&registry.dump(false), "sshd").unwrap().forks;

        assert_eq!(
            seen_during + seen_after,
            THREADS as u64 * EVENTS_PER_THREAD
        );
    }
}
