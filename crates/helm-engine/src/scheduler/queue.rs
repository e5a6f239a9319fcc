use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct TimerEntry {
    due: DateTime<Utc>,
    generation: u64,
    task_id: String,
}

/// Min-heap of pending firings keyed by due time.
///
/// Re-arming or disarming a task bumps its generation; heap entries with an
/// older generation are stale and skipped on the way out.
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<TimerEntry>>,
    armed: HashMap<String, u64>,
    next_generation: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `task_id` to fire at `due`, replacing any earlier timer.
    pub fn arm(&mut self, task_id: &str, due: DateTime<Utc>) {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.armed.insert(task_id.to_string(), generation);
        self.heap.push(Reverse(TimerEntry {
            due,
            generation,
            task_id: task_id.to_string(),
        }));
    }

    /// Returns true when a timer was armed.
    pub fn disarm(&mut self, task_id: &str) -> bool {
        self.armed.remove(task_id).is_some()
    }

    pub fn is_armed(&self, task_id: &str) -> bool {
        self.armed.contains_key(task_id)
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Earliest live due time.
    pub fn peek_due(&mut self) -> Option<DateTime<Utc>> {
        self.discard_stale();
        self.heap.peek().map(|Reverse(entry)| entry.due)
    }

    /// Pop the earliest timer if it is due at `now`. The task is left disarmed.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<String> {
        self.discard_stale();
        match self.heap.peek() {
            Some(Reverse(entry)) if entry.due <= now => {}
            _ => return None,
        }
        let Reverse(entry) = self.heap.pop()?;
        self.armed.remove(&entry.task_id);
        Some(entry.task_id)
    }

    fn discard_stale(&mut self) {
        while let Some(Reverse(entry)) = self.heap.peek() {
            if self.armed.get(&entry.task_id) == Some(&entry.generation) {
                break;
            }
            self.heap.pop();
        }
    }
}
