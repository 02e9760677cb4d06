//=========================================================================
// State Requests
//=========================================================================
//
// Queue of state stack changes.
//
// States and systems queue requests here while a frame is running. The
// state manager applies them at the end of the frame, once no state is
// borrowed.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;

//=== StateRequest ========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateRequest {
    /// Brings the named state to the front, creating it if needed.
    SwitchTo(String),

    /// Removes the named state from the stack.
    Remove(String),
}

//=== StateRequests =======================================================

/// FIFO queue of [`StateRequest`]s, usable through a shared reference.
#[derive(Debug, Default)]
pub struct StateRequests {
    queue: RefCell<Vec<StateRequest>>,
}

impl StateRequests {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a request to be applied at the next end-of-frame.
    pub fn push(&self, request: StateRequest) {
        self.queue.borrow_mut().push(request);
    }

    /// Queues a switch to `name`.
    pub fn switch_to(&self, name: &str) {
        self.push(StateRequest::SwitchTo(name.to_owned()));
    }

    /// Queues the removal of `name`.
    pub fn remove(&self, name: &str) {
        self.push(StateRequest::Remove(name.to_owned()));
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Returns the number of queued requests.
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Drops every queued request.
    pub fn clear(&self) {
        self.queue.borrow_mut().clear();
    }

    /// Takes all queued requests, leaving the queue empty.
    pub fn take(&self) -> Vec<StateRequest> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
