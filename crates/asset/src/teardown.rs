//! Session teardown signal. Every load is wrapped in an [`Abortable`]; firing
//! the signal aborts all outstanding loads and pre-aborts any started later.

use std::{cell::RefCell, collections::HashMap, future::Future, rc::Rc};

use futures::future::{AbortHandle, Abortable, Aborted};

#[derive(Clone, Debug, Default)]
pub struct Teardown {
    inner: Rc<RefCell<TeardownState>>,
}

#[derive(Debug, Default)]
struct TeardownState {
    triggered: bool,
    next_id: u64,
    pending: HashMap<u64, AbortHandle>,
}

/// Drops a load's abort handle once the load finishes or is dropped.
struct Registration {
    state: Rc<RefCell<TeardownState>>,
    id: u64,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.state.borrow_mut().pending.remove(&self.id);
    }
}

impl Teardown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tie `fut` to this session. Resolves to `Err(Aborted)` once triggered.
    pub fn guard<F: Future>(&self, fut: F) -> impl Future<Output = Result<F::Output, Aborted>> {
        let (handle, abort_registration) = AbortHandle::new_pair();
        let id = {
            let mut state = self.inner.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            if state.triggered {
                handle.abort();
            } else {
                state.pending.insert(id, handle);
            }
            id
        };
        let registration = Registration {
            state: self.inner.clone(),
            id,
        };
        async move {
            let _registration = registration;
            Abortable::new(fut, abort_registration).await
        }
    }

    pub fn trigger(&self) {
        let mut state = self.inner.borrow_mut();
        if state.triggered {
            return;
        }
        state.triggered = true;
        let pending = std::mem::take(&mut state.pending);
        log::info!("Teardown: abandoning {} outstanding load(s)", pending.len());
        for handle in pending.into_values() {
            handle.abort();
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.borrow().triggered
    }

    /// Loads currently guarded and not yet finished.
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending.len()
    }
}
