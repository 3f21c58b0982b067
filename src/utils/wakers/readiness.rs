use core::task::Waker;
use fixedbitset::FixedBitSet;

/// Tracks which slots have been woken and should be polled.
#[derive(Debug)]
pub(crate) struct Readiness {
    ready_count: usize,
    awake: FixedBitSet,
    parent_waker: Option<Waker>,
}

impl Readiness {
    /// Create a new instance with every slot marked ready, so the first poll
    /// visits all of them.
    pub(crate) fn new(len: usize) -> Self {
        let mut awake = FixedBitSet::with_capacity(len);
        awake.set_range(.., true);
        Self {
            ready_count: len,
            awake,
            parent_waker: None,
        }
    }

    /// Set the ready state to `true` for the given index.
    ///
    /// Returns the old ready state for this slot.
    pub(crate) fn set_ready(&mut self, index: usize) -> bool {
        if !self.awake[index] {
            self.ready_count += 1;
            self.awake.set(index, true);
            false
        } else {
            true
        }
    }

    /// Set the ready state to `false` for the given index.
    ///
    /// Returns whether the slot was previously ready.
    pub(crate) fn clear_ready(&mut self, index: usize) -> bool {
        if self.awake[index] {
            self.ready_count -= 1;
            self.awake.set(index, false);
            true
        } else {
            false
        }
    }

    /// Returns `true` if any slot is ready to be polled.
    pub(crate) fn any_ready(&self) -> bool {
        self.ready_count > 0
    }

    /// Access the waker of the task driving the whole operation.
    #[inline]
    pub(crate) fn parent_waker(&self) -> Option<&Waker> {
        self.parent_waker.as_ref()
    }

    /// Set the parent `Waker`. This needs to be called at the start of every
    /// `poll` function.
    pub(crate) fn set_waker(&mut self, parent_waker: &Waker) {
        match &mut self.parent_waker {
            Some(prev) => prev.clone_from(parent_waker),
            None => self.parent_waker = Some(parent_waker.clone()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn starts_all_ready() {
        let mut readiness = Readiness::new(3);
        assert!(readiness.any_ready());
        assert!(readiness.clear_ready(0));
        assert!(readiness.clear_ready(1));
        assert!(readiness.clear_ready(2));
        assert!(!readiness.any_ready());

        assert!(!readiness.set_ready(1));
        assert!(readiness.set_ready(1));
        assert!(readiness.any_ready());
    }
}
