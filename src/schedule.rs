use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::explosion::Secondary;

/// Work deferred to a later point on the show clock.
#[derive(Clone, Debug)]
pub enum Task {
    /// One rocket from a random spot along the bottom edge.
    Launch,
    /// Autonomous cadence; reschedules itself.
    AutoLaunch,
    Shrapnel(Secondary),
    /// Begin the countdown from this value.
    StartCountdown(u32),
    CountdownTick,
    /// Countdown hit zero a second ago: hide it and fire the salvo.
    Liftoff,
}

#[derive(Debug)]
struct Entry {
    deadline: Duration,
    seq: u64,
    task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deadline
            .cmp(&other.deadline)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Min-heap of deferred tasks; equal deadlines pop in insertion order.
#[derive(Debug, Default)]
pub struct TaskQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Duration, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry { deadline, seq, task }));
    }

    /// Next task due at or before `now`, with its deadline.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, Task)> {
        if self.heap.peek()?.0.deadline > now {
            return None;
        }
        self.heap.pop().map(|Reverse(entry)| (entry.deadline, entry.task))
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.heap.peek().map(|Reverse(entry)| entry.deadline)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
