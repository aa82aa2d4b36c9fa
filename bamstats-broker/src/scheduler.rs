///
/// A single pending-action slot.
///
/// Every trigger overwrites the slot; the owner drains it once per scheduling
/// quantum, so a burst of triggers runs as one action.
///
#[derive(Debug)]
pub struct CoalescingScheduler<A> {
    pending: Option<A>,
    coalesced: usize,
}

impl<A> Default for CoalescingScheduler<A> {
    fn default() -> Self {
        CoalescingScheduler {
            pending: None,
            coalesced: 0,
        }
    }
}

impl<A> CoalescingScheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending action with `action`.
    pub fn schedule(&mut self, action: A) {
        self.schedule_with(|_| action);
    }

    /// Replace the pending action with one derived from the previous pending action.
    pub fn schedule_with<F>(&mut self, merge: F)
    where
        F: FnOnce(Option<A>) -> A,
    {
        let previous = self.pending.take();
        if previous.is_some() {
            self.coalesced += 1;
        }
        self.pending = Some(merge(previous));
    }

    /// Drain the slot. Called once per scheduling quantum.
    pub fn take(&mut self) -> Option<A> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<&A> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// How many triggers have been folded into an already pending action.
    pub fn coalesced(&self) -> usize {
        self.coalesced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_burst_runs_once() {
        let mut scheduler = CoalescingScheduler::new();
        scheduler.schedule("first");
        scheduler.schedule("second");
        scheduler.schedule("third");

        assert_eq!(scheduler.take(), Some("third"));
        assert_eq!(scheduler.take(), None);
        assert_eq!(scheduler.coalesced(), 2);
    }

    #[rstest]
    fn test_merge_with_pending() {
        let mut scheduler = CoalescingScheduler::new();
        scheduler.schedule(1u32);
        scheduler.schedule_with(|previous| previous.map_or(5, |p| p + 10));

        assert_eq!(scheduler.pending(), Some(&11));
        assert!(scheduler.is_pending());
    }
}
