use helm_common::protocol::BrowserAction;
use std::sync::{Arc, Mutex, PoisonError};

/// Append-only action history shared by command processing and task firings.
///
/// Each `append` takes the lock once, so a batch lands contiguously and in order.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    entries: Arc<Mutex<Vec<BrowserAction>>>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, actions: &[BrowserAction]) {
        if actions.is_empty() {
            return;
        }
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(actions);
    }

    pub fn snapshot(&self) -> Vec<BrowserAction> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The `n` most recent actions, oldest first.
    pub fn tail(&self, n: usize) -> Vec<BrowserAction> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let start = entries.len().saturating_sub(n);
        entries[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_concurrent_appends_keep_batches_contiguous() {
        let log = ActionLog::new();
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let now = Utc::now();
                        log.append(&[
                            BrowserAction::navigate(format!("w{} step {} a", worker, i), now),
                            BrowserAction::click(format!("w{} step {} b", worker, i), now),
                        ]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let entries = log.snapshot();
        assert_eq!(entries.len(), 400);
        for pair in entries.chunks(2) {
            let first = pair[0].description.trim_end_matches(" a");
            let second = pair[1].description.trim_end_matches(" b");
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_tail() {
        let log = ActionLog::new();
        let now = Utc::now();
        for i in 0..5 {
            log.append(&[BrowserAction::navigate(format!("step {}", i), now)]);
        }
        let tail = log.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].description, "step 3");
        assert_eq!(tail[1].description, "step 4");
    }
}
