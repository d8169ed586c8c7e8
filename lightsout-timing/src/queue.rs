/// Cancellable handle returned by [`TimerQueue::schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Entry<E> {
    deadline_ms: u64,
    id: u64,
    event: E,
}

/// Deadline-ordered queue of deferred events. Nothing fires on its own: the
/// owner pops due entries from its event loop. Entries with equal deadlines
/// pop in scheduling order.
#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    entries: Vec<Entry<E>>,
    next_id: u64,
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, event: E) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        let deadline_ms = now_ms.saturating_add(delay_ms);

        let at = self
            .entries
            .partition_point(|e| (e.deadline_ms, e.id) <= (deadline_ms, id));
        self.entries.insert(
            at,
            Entry {
                deadline_ms,
                id,
                event,
            },
        );
        TimerHandle(id)
    }

    /// Returns false if the timer already fired or was cancelled
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.entries.iter().position(|e| e.id == handle.0) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Drops every pending entry
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    /// Removes and returns the earliest entry whose deadline is `<= now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, E)> {
        match self.entries.first() {
            Some(e) if e.deadline_ms <= now_ms => {
                let e = self.entries.remove(0);
                Some((e.deadline_ms, e.event))
            }
            _ => None,
        }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.first().map(|e| e.deadline_ms)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(0, 300, "c");
        q.schedule(0, 100, "a");
        q.schedule(0, 200, "b");

        assert_eq!(q.next_deadline(), Some(100));
        assert_eq!(q.pop_due(50), None);
        assert_eq!(q.pop_due(1_000), Some((100, "a")));
        assert_eq!(q.pop_due(1_000), Some((200, "b")));
        assert_eq!(q.pop_due(1_000), Some((300, "c")));
        assert!(q.is_empty());
    }

    #[test]
    fn equal_deadlines_keep_scheduling_order() {
        let mut q = TimerQueue::new();
        for n in 0..4 {
            q.schedule(10, 5, n);
        }
        let fired: Vec<_> = std::iter::from_fn(|| q.pop_due(15)).map(|(_, n)| n).collect();
        assert_eq!(fired, vec![0, 1, 2, 3]);
    }

    #[test]
    fn cancelled_entries_never_fire() {
        let mut q = TimerQueue::new();
        let keep = q.schedule(0, 10, 1);
        let dropped = q.schedule(0, 20, 2);
        assert!(q.cancel(dropped));
        assert!(!q.cancel(dropped));
        assert_eq!(q.pop_due(100), Some((10, 1)));
        assert_eq!(q.pop_due(100), None);
        assert!(!q.cancel(keep));
    }

    #[test]
    fn clear_drops_everything() {
        let mut q = TimerQueue::new();
        q.schedule(0, 1, ());
        q.schedule(0, 2, ());
        assert_eq!(q.clear(), 2);
        assert_eq!(q.next_deadline(), None);
        assert_eq!(q.len(), 0);
    }
}
