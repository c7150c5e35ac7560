//! Per-executable process lineage accounting.
//!
//! One [`ExecutableStats`] exists for every executable name the user asked
//! to watch. Matching happens on executable basenames only: distinct
//! processes running the same binary are deliberately conflated, that is
//! the granularity of these statistics.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// Lineage counters for a single watched executable.
///
/// The relationship maps may reference arbitrary process names; a name
/// appearing as an exec parent or child does not have to be watched itself.
#[derive(Debug)]
pub struct ExecutableStats {
    name: String,
    exec_source: u64,
    exec_target: u64,
    forks: u64,
    exits: u64,
    /// execs this executable performed itself, keyed by child name
    execs_to_children: HashMap<String, u64>,
    /// processes which exec'd into this executable, keyed by parent name
    execs_from_parents: HashMap<String, u64>,
}

/// Read-only copy of one executable's counters, taken during a dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutableSnapshot {
    pub name: String,
    pub exec_source: u64,
    pub exec_target: u64,
    pub forks: u64,
    pub exits: u64,
    pub execs_to_children: BTreeMap<String, u64>,
    pub execs_from_parents: BTreeMap<String, u64>,
}

impl ExecutableSnapshot {
    /// Balance of processes entering this executable (exec target, fork)
    /// against processes leaving it (exec source, exit). Zero when every
    /// observed process is accounted for.
    pub fn delta(&self) -> i64 {
        self.exec_target as i64 + self.forks as i64 - self.exec_source as i64 - self.exits as i64
    }
}

impl ExecutableStats {
    pub fn new(name: String) -> Self {
        Self {
            name,
            exec_source: 0,
            exec_target: 0,
            forks: 0,
            exits: 0,
            execs_to_children: HashMap::new(),
            execs_from_parents: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Account one exec event against this executable.
    ///
    /// Both branches fire for the same call only on a self-exec, when
    /// `source` and `target` are both this executable's name.
    pub fn on_exec(&mut self, source: &str, target: &str) {
        if target == self.name {
            self.exec_target += 1;
            *self.execs_from_parents.entry(source.to_string()).or_default() += 1;
        }
        if source == self.name {
            self.exec_source += 1;
            *self.execs_to_children.entry(target.to_string()).or_default() += 1;
        }
    }

    pub fn on_fork(&mut self, name: &str) {
        if name == self.name {
            self.forks += 1;
        }
    }

    pub fn on_exit(&mut self, name: &str) {
        if name == self.name {
            self.exits += 1;
        }
    }

    /// Copy out all counters and maps; unless `cumulative`, clear them.
    /// The entry itself survives resets, only its contents are zeroed.
    pub fn snapshot_and_maybe_reset(&mut self, cumulative: bool) -> ExecutableSnapshot {
        let snapshot = ExecutableSnapshot {
            name: self.name.clone(),
            exec_source: self.exec_source,
            exec_target: self.exec_target,
            forks: self.forks,
            exits: self.exits,
            execs_to_children: self
                .execs_to_children
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            execs_from_parents: self
                .execs_from_parents
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
        };
        if !cumulative {
            self.exec_source = 0;
            self.exec_target = 0;
            self.forks = 0;
            self.exits = 0;
            self.execs_to_children.clear();
            self.execs_from_parents.clear();
        }
        snapshot
    }
}
