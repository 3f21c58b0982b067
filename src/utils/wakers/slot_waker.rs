use std::sync::{Arc, Mutex};
use std::task::Wake;

use super::Readiness;

/// An efficient waker which wakes a single slot by marking it in the shared
/// readiness set.
#[derive(Debug, Clone)]
pub(crate) struct SlotWaker {
    index: usize,
    readiness: Arc<Mutex<Readiness>>,
}

impl SlotWaker {
    /// Create a new instance of `SlotWaker`.
    pub(crate) fn new(index: usize, readiness: Arc<Mutex<Readiness>>) -> Self {
        Self { index, readiness }
    }
}

impl Wake for SlotWaker {
    fn wake(self: Arc<Self>) {
        let mut readiness = self.readiness.lock().unwrap();
        if !readiness.set_ready(self.index) {
            readiness
                .parent_waker()
                .expect("`parent_waker` not available from `Readiness`. Did you forget to call `Readiness::set_waker`?")
                .wake_by_ref()
        }
    }
}
