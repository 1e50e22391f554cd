//! Deferred event emissions
//!
//! Scheduled events are ordered by trigger time, then by the order they were
//! issued. A scheduled event is fired exactly once and never modified.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use ecode_sdk::EcodeEvent;

use super::Payload;

/// An emission waiting for its trigger time
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub event: EcodeEvent,
    /// Absolute clock time at which the event becomes due
    pub trigger_at: Duration,
    pub payload: Payload,
    seq: u64,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.trigger_at == other.trigger_at && self.seq == other.seq
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    // Reversed so the max-heap pops the earliest trigger first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .trigger_at
            .cmp(&self.trigger_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Queue of scheduled events
#[derive(Debug, Default)]
pub(crate) struct Schedule {
    heap: BinaryHeap<ScheduledEvent>,
    next_seq: u64,
}

impl Schedule {
    pub fn push(&mut self, event: EcodeEvent, trigger_at: Duration, payload: Payload) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(ScheduledEvent {
            event,
            trigger_at,
            payload,
            seq,
        });
    }

    /// Sequence number the next push will receive
    pub fn watermark(&self) -> u64 {
        self.next_seq
    }

    /// Pop the earliest event due at `now` that was issued before `watermark`
    ///
    /// Events issued at or after the watermark stay queued even when due.
    pub fn pop_due(&mut self, now: Duration, watermark: u64) -> Option<ScheduledEvent> {
        let mut held_back = Vec::new();
        let mut found = None;

        while let Some(top) = self.heap.peek() {
            if top.trigger_at > now {
                break;
            }
            let Some(entry) = self.heap.pop() else {
                break;
            };
            if entry.seq < watermark {
                found = Some(entry);
                break;
            }
            held_back.push(entry);
        }

        self.heap.extend(held_back);
        found
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
