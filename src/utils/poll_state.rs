use core::ops::{Deref, DerefMut};

/// Enumerate the poll state of a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum PollState {
    /// The slot's task has not yet settled.
    Pending,
    /// The slot's outcome has been written to the output buffer, and is now
    /// ready to be read.
    Ready,
    /// The outcome has been moved out of the output buffer.
    Consumed,
}

impl PollState {
    /// Returns `true` if the poll state is [`Pending`][Self::Pending].
    #[must_use]
    #[inline]
    pub(crate) fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns `true` if the poll state is [`Ready`][Self::Ready].
    #[must_use]
    #[inline]
    pub(crate) fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Sets the poll state to [`Ready`][Self::Ready].
    #[inline]
    pub(crate) fn set_ready(&mut self) {
        *self = PollState::Ready;
    }

    /// Sets the poll state to [`Consumed`][Self::Consumed].
    #[inline]
    pub(crate) fn set_consumed(&mut self) {
        *self = PollState::Consumed;
    }
}

/// The poll states of every slot of a settle operation.
pub(crate) struct PollVec(Box<[PollState]>);

impl PollVec {
    /// Create a new instance with every slot pending.
    pub(crate) fn new(len: usize) -> Self {
        Self(vec![PollState::Pending; len].into_boxed_slice())
    }

    /// Get an iterator of indexes of all slots which are "ready".
    pub(crate) fn ready_indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter()
            .enumerate()
            .filter(|(_, state)| state.is_ready())
            .map(|(i, _)| i)
    }
}

impl Deref for PollVec {
    type Target = [PollState];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PollVec {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod test {
    use super::{PollState, PollVec};

    #[test]
    fn starts_all_pending() {
        let states = PollVec::new(4);
        assert!(states.iter().all(|state| state.is_pending()));
        assert_eq!(states.ready_indexes().count(), 0);
    }

    #[test]
    fn ready_indexes() {
        let mut states = PollVec::new(3);
        states[1].set_ready();
        assert_eq!(states.ready_indexes().collect::<Vec<_>>(), [1]);
        states[1].set_consumed();
        assert_eq!(states[1], PollState::Consumed);
        assert_eq!(states.ready_indexes().count(), 0);
    }
}
