//=========================================================================
// State Manager
//=========================================================================
//
// Manages the state stack and the lifecycle of each state.
//
// States are created on first `switch_to` and kept on the stack, so a
// state brought back to the front keeps its world. The front state's
// name is the event handler's active state.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::{State, StateRequest, World};
use crate::core::context::Context;
use crate::core::error::StateError;
use crate::core::events::ALL_STATES;
use crate::core::view::RenderTarget;

//=== StateEntry ==========================================================

struct StateEntry {
    name: String,
    state: Box<dyn State>,
}

//=== StateManager ========================================================

/// Stack of named states. The last entry is the front (active) state.
pub struct StateManager {
    context: Rc<Context>,
    stack: Vec<StateEntry>,
    to_remove: Vec<String>,
}

impl StateManager {
    //--- Construction -----------------------------------------------------

    /// Creates an empty stack bound to `context`.
    pub fn new(context: Rc<Context>) -> Self {
        Self {
            context,
            stack: Vec::new(),
            to_remove: Vec::new(),
        }
    }

    //--- Stack Operations -------------------------------------------------

    /// Brings `name` to the front.
    ///
    /// A state already on the stack is moved to the front and keeps its
    /// instance. Otherwise it is constructed from the registry and gets
    /// `on_create` then `activate`. The previous front is deactivated in
    /// both cases. An unknown or reserved name leaves the stack untouched.
    pub fn switch_to(&mut self, name: &str) -> Result<(), StateError> {
        if name == ALL_STATES {
            warn!("StateManager: {:?} is reserved and cannot be a state", name);
            return Err(StateError::Reserved(name.to_owned()));
        }

        if let Some(index) = self.position(name) {
            if index + 1 == self.stack.len() {
                debug!("StateManager: {} is already the current state", name);
                return Ok(());
            }

            self.deactivate_front();
            let entry = self.stack.remove(index);
            self.stack.push(entry);
            self.context.events().set_active_state(name);
            if let Some(front) = self.stack.last_mut() {
                front.state.activate();
            }

            info!("StateManager: switched back to {}", name);
            return Ok(());
        }

        let world = World::new(name, Rc::clone(&self.context));
        let Some(mut state) = self.context.states().construct(name, world) else {
            warn!("StateManager: state {} is not registered", name);
            return Err(StateError::Unknown(name.to_owned()));
        };

        self.deactivate_front();
        self.context.events().set_active_state(name);
        state.on_create();
        state.activate();
        self.stack.push(StateEntry {
            name: name.to_owned(),
            state,
        });

        info!("StateManager: switched to new state {}", name);
        Ok(())
    }

    /// Marks `name` for removal at the next [`process_remove`](Self::process_remove).
    pub fn remove(&mut self, name: &str) {
        if !self.contains(name) {
            debug!("StateManager: {} is not on the stack, nothing to remove", name);
            return;
        }
        if !self.to_remove.iter().any(|pending| pending == name) {
            self.to_remove.push(name.to_owned());
        }
    }

    /// Applies pending removals.
    ///
    /// Each removed state gets `on_destroy` and its state-tagged listeners
    /// are disconnected. If the front was removed, the new front is
    /// activated.
    pub fn process_remove(&mut self) {
        for name in std::mem::take(&mut self.to_remove) {
            let Some(index) = self.position(&name) else {
                continue;
            };
            let was_front = index + 1 == self.stack.len();

            let mut entry = self.stack.remove(index);
            entry.state.on_destroy();
            self.context.events().clear_state(&entry.name);
            drop(entry);
            debug!("StateManager: removed {}", name);

            if was_front {
                match self.stack.last_mut() {
                    Some(front) => {
                        self.context.events().set_active_state(&front.name);
                        front.state.activate();
                    }
                    None => self.context.events().set_active_state(""),
                }
            }
        }
    }

    /// Applies the queued [`StateRequest`]s in order, then the pending
    /// removals. Called at the end of each frame.
    pub fn process_requests(&mut self) {
        for request in self.context.requests().take() {
            match request {
                StateRequest::SwitchTo(name) => {
                    if let Err(e) = self.switch_to(&name) {
                        debug!("StateManager: queued switch dropped: {}", e);
                    }
                }
                StateRequest::Remove(name) => self.remove(&name),
            }
        }
        self.process_remove();
    }

    //--- Frame ------------------------------------------------------------

    /// Updates the front state, then the states below it while the
    /// updated state is transcendant.
    pub fn update(&mut self, delta: Duration) {
        for entry in self.stack.iter_mut().rev() {
            entry.state.update(delta);
            if !entry.state.is_transcendant() {
                break;
            }
        }
    }

    /// Draws `layer` from the front down while the drawn state is
    /// transparent.
    pub fn draw(&mut self, target: &mut dyn RenderTarget, layer: u32) {
        for entry in self.stack.iter_mut().rev() {
            entry.state.draw(target, layer);
            if !entry.state.is_transparent() {
                break;
            }
        }
    }

    //--- Queries ----------------------------------------------------------

    /// Returns the name of the front state.
    pub fn current_state(&self) -> Option<&str> {
        self.stack.last().map(|entry| entry.name.as_str())
    }

    /// Returns true if `name` is the front state.
    pub fn is_current_state(&self, name: &str) -> bool {
        self.current_state() == Some(name)
    }

    /// Returns true if `name` is anywhere on the stack.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the state named `name`, if it is on the stack.
    pub fn state(&self, name: &str) -> Option<&dyn State> {
        self.stack
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &*entry.state)
    }

    /// Returns the world of the state named `name`.
    pub fn world(&self, name: &str) -> Option<Rc<World>> {
        self.state(name).map(|state| Rc::clone(state.world()))
    }

    /// State names, front first.
    pub fn state_names(&self) -> Vec<String> {
        self.stack.iter().rev().map(|entry| entry.name.clone()).collect()
    }

    /// Returns the shared engine context.
    pub fn context(&self) -> &Rc<Context> {
        &self.context
    }

    /// Returns the number of states on the stack.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    //--- Internal Helpers -------------------------------------------------

    fn position(&self, name: &str) -> Option<usize> {
        self.stack.iter().position(|entry| entry.name == name)
    }

    fn deactivate_front(&mut self) {
        if let Some(front) = self.stack.last_mut() {
            front.state.deactivate();
        }
    }
}

impl Drop for StateManager {
    fn drop(&mut self) {
        for entry in self.stack.iter_mut().rev() {
            entry.state.on_destroy();
        }
    }
}

impl fmt::Debug for StateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateManager")
            .field("stack", &self.state_names())
            .field("to_remove", &self.to_remove)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
