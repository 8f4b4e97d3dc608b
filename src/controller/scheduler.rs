#[derive(Debug)]
struct Entry<T> {
    due_ms: f64,
    action: T,
}

/// Deterministic replacement for wall-clock timers: entries fire on the first
/// frame whose clock reaches their due time, in scheduling order.
#[derive(Debug)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T: PartialEq> Scheduler<T> {
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64, action: T) {
        self.entries.push(Entry { due_ms: now_ms + delay_ms, action });
    }

    pub fn is_pending(&self, action: &T) -> bool {
        self.entries.iter().any(|e| &e.action == action)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every action due at `now_ms`.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<T> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due_ms <= now_ms {
                due.push(self.entries.remove(i).action);
            } else {
                i += 1;
            }
        }
        due
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_only_when_due() {
        let mut s = Scheduler::default();
        s.schedule(1000.0, 100.0, "swap");
        assert!(s.take_due(1099.0).is_empty());
        assert!(s.is_pending(&"swap"));
        assert_eq!(s.take_due(1100.0), vec!["swap"]);
        assert!(s.is_empty());
    }

    #[test]
    fn test_keeps_scheduling_order() {
        let mut s = Scheduler::default();
        s.schedule(0.0, 50.0, 1);
        s.schedule(0.0, 10.0, 2);
        s.schedule(0.0, 500.0, 3);
        assert_eq!(s.take_due(60.0), vec![1, 2]);
    }
}
