//! Utilities to implement the futures of this crate.

mod pin;
mod poll_state;
mod wakers;

pub(crate) use pin::iter_pin_mut_vec;
pub(crate) use poll_state::{PollState, PollVec};
pub(crate) use wakers::WakerVec;

#[cfg(test)]
pub(crate) use wakers::DummyWaker;
