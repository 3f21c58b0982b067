use std::sync::Arc;
use std::sync::Mutex;
use std::task::Waker;

use super::{Readiness, SlotWaker};

/// A collection of wakers, one per slot, which delegate to a shared readiness
/// set.
pub(crate) struct WakerVec {
    wakers: Vec<Waker>,
    readiness: Arc<Mutex<Readiness>>,
}

impl WakerVec {
    /// Create a new instance of `WakerVec`.
    pub(crate) fn new(len: usize) -> Self {
        let readiness = Arc::new(Mutex::new(Readiness::new(len)));
        let wakers = (0..len)
            .map(|index| Arc::new(SlotWaker::new(index, readiness.clone())).into())
            .collect();
        Self { wakers, readiness }
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Waker> {
        self.wakers.get(index)
    }

    /// Access the `Readiness`.
    pub(crate) fn readiness(&self) -> &Mutex<Readiness> {
        self.readiness.as_ref()
    }
}
