//! Per-kind message counting with sequence-gap detection.

/// Counts received messages of one event kind and estimates how many were
/// lost, based on the monotonic per-kind sequence number the event source
/// attaches to every message.
///
/// The gap count is a heuristic: a jump in the sequence number means the
/// messages in between were never delivered, but nothing identifies *which*
/// ones. A sequence number of 0 is treated as "first observation" and never
/// flags a gap.
#[derive(Debug, Clone, Default)]
pub struct EventCounter {
    total: u64,
    missing: u64,
    last_seq: u64,
}

impl EventCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one received message.
    ///
    /// The first observed sequence number only establishes the baseline.
    /// Afterwards, a jump from `S` to `S + k` (k > 1) adds the `k - 1`
    /// skipped messages to the missing count.
    pub fn record(&mut self, seq: u64) {
        self.total += 1;
        if seq > 0 && self.last_seq > 0 && seq > self.last_seq + 1 {
            self.missing += seq - self.last_seq - 1;
        }
        self.last_seq = seq;
    }

    /// Return `(total, missing)`; unless `cumulative`, zero both counts.
    ///
    /// The last seen sequence number is kept either way, so gap detection
    /// stays continuous across interval resets.
    pub fn snapshot_and_maybe_reset(&mut self, cumulative: bool) -> (u64, u64) {
        let counts = (self.total, self.missing);
        if !cumulative {
            self.total = 0;
            self.missing = 0;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gapless_sequences_report_no_missing_messages() {
        let mut counter = EventCounter::new();
        for seq in 1..=50 {
            counter.record(seq);
        }
        assert_eq!(counter.snapshot_and_maybe_reset(true), (50, 0));
    }

    #[test]
    fn jump_of_k_adds_k_minus_one_missing() {
        let mut counter = EventCounter::new();
        counter.record(5);
        counter.record(10); // jump of 5: seqs 6..=9 were lost
        assert_eq!(counter.snapshot_and_maybe_reset(true), (2, 4));
        counter.record(11); // contiguous again
        assert_eq!(counter.snapshot_and_maybe_reset(true), (3, 4));
    }

    #[test]
    fn first_observation_establishes_baseline_without_gap() {
        let mut counter = EventCounter::new();
        counter.record(1000);
        assert_eq!(counter.snapshot_and_maybe_reset(true), (1, 0));
    }

    #[test]
    fn gap_detection_is_continuous_across_resets() {
        let mut counter = EventCounter::new();
        counter.record(5);
        assert_eq!(counter.snapshot_and_maybe_reset(false), (1, 0));
        counter.record(7); // seq 6 lost across the dump boundary
        assert_eq!(counter.snapshot_and_maybe_reset(false), (1, 1));
    }

    #[test]
    fn cumulative_snapshots_never_reset() {
        let mut counter = EventCounter::new();
        counter.record(1);
        counter.record(2);
        let first = counter.snapshot_and_maybe_reset(true);
        counter.record(3);
        let second = counter.snapshot_and_maybe_reset(true);
        assert_eq!(first, (2, 0));
        assert_eq!(second, (3, 0));
    }

    #[test]
    fn sequence_zero_never_flags_a_gap() {
        let mut counter = EventCounter::new();
        counter.record(0);
        counter.record(0);
        counter.record(5);
        assert_eq!(counter.snapshot_and_maybe_reset(true), (3, 0));
    }
}
