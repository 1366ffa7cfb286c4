//! Per-agent replanning cadence.
//!
//! A scheduler answers one question each tick: should the agent ask for a new
//! path now? It enforces a hard limit of one replan per interval. Fresh-chase
//! and consumed-path triggers fire at the first tick the limit allows, and the
//! cooldown keeps draining while the agent wanders.
//!
//! Every replan carries a monotonically increasing sequence number so results
//! arriving out of order can be discarded.

/// Why a replan was issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ReplanReason {
    /// Agent just switched from Wander to Chase.
    EnteredChase,
    /// Current path is empty or fully consumed.
    PathExhausted,
    /// Periodic refresh while a path is still being followed.
    CooldownElapsed,
}

/// Handle for one issued replan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepathTicket {
    pub seq: u64,
    pub reason: ReplanReason,
}

#[derive(Clone, Debug)]
pub struct RepathScheduler {
    interval_ms: u32,
    cooldown_ms: u32,
    issued_seq: u64,
    applied_seq: u64,
}

impl RepathScheduler {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            cooldown_ms: 0,
            issued_seq: 0,
            applied_seq: 0,
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn cooldown_ms(&self) -> u32 {
        self.cooldown_ms
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown_ms == 0
    }

    /// Drains the cooldown by `elapsed_ms`.
    pub fn advance(&mut self, elapsed_ms: u32) {
        self.cooldown_ms = self.cooldown_ms.saturating_sub(elapsed_ms);
    }

    /// Decides whether to replan on this tick without issuing anything.
    pub fn due(&self, path_empty: bool, entered_chase: bool) -> Option<ReplanReason> {
        if !self.is_ready() {
            return None;
        }
        Some(if entered_chase {
            ReplanReason::EnteredChase
        } else if path_empty {
            ReplanReason::PathExhausted
        } else {
            ReplanReason::CooldownElapsed
        })
    }

    /// Issues a replan: restarts the cooldown and allocates a sequence number.
    pub fn issue(&mut self, reason: ReplanReason) -> RepathTicket {
        self.cooldown_ms = self.interval_ms;
        self.issued_seq += 1;
        tracing::trace!(seq = self.issued_seq, %reason, "replan issued");
        RepathTicket {
            seq: self.issued_seq,
            reason,
        }
    }

    /// Convenience wrapper around [`Self::due`] and [`Self::issue`].
    pub fn poll(&mut self, path_empty: bool, entered_chase: bool) -> Option<RepathTicket> {
        self.due(path_empty, entered_chase)
            .map(|reason| self.issue(reason))
    }

    /// Records that the result for `seq` is about to be applied.
    ///
    /// Returns `false` for results older than one already applied
    /// (last writer by request sequence wins).
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied_seq || seq > self.issued_seq {
            return false;
        }
        self.applied_seq = seq;
        true
    }

    pub fn latest_issued(&self) -> u64 {
        self.issued_seq
    }

    /// Next tick may replan immediately. Sequence numbers keep increasing so
    /// in-flight results stay orderable.
    pub fn reset_cooldown(&mut self) {
        self.cooldown_ms = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK_MS: u32 = 16;

    #[test]
    fn first_request_is_immediate() {
        let mut scheduler = RepathScheduler::new(600);
        let ticket = scheduler.poll(true, true).unwrap();
        assert_eq!(ticket.reason, ReplanReason::EnteredChase);
        assert_eq!(ticket.seq, 1);
        assert_eq!(scheduler.cooldown_ms(), 600);
    }

    #[test]
    fn never_replans_more_than_once_per_interval() {
        let mut scheduler = RepathScheduler::new(600);
        let mut issued_at = Vec::new();

        for tick in 0..1000u32 {
            // Path always empty: the most aggressive trigger.
            if scheduler.poll(true, tick % 7 == 0).is_some() {
                issued_at.push(tick * TICK_MS);
            }
            scheduler.advance(TICK_MS);
        }

        assert!(issued_at.len() > 1);
        for pair in issued_at.windows(2) {
            assert!(pair[1] - pair[0] >= 600, "replans at {pair:?}");
        }
    }

    #[test]
    fn cooldown_drains_while_not_chasing() {
        let mut scheduler = RepathScheduler::new(600);
        scheduler.poll(true, true);
        scheduler.advance(300);
        assert_eq!(scheduler.due(false, true), None);
        scheduler.advance(400);
        assert_eq!(scheduler.due(false, true), Some(ReplanReason::EnteredChase));
        assert_eq!(scheduler.due(false, false), Some(ReplanReason::CooldownElapsed));
    }

    #[test]
    fn stale_results_are_rejected() {
        let mut scheduler = RepathScheduler::new(0);
        let first = scheduler.issue(ReplanReason::EnteredChase);
        let second = scheduler.issue(ReplanReason::PathExhausted);

        assert!(scheduler.accept(second.seq));
        assert!(!scheduler.accept(first.seq));
        assert!(!scheduler.accept(second.seq));
        assert!(!scheduler.accept(99));
    }
}
