//=========================================================================
// Store Event Connections
//=========================================================================
//
// Owns the listener connections of a system or a state and disconnects
// them all when dropped.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use super::{Connection, Event, EventHandler, ALL_STATES};

//=== StoreEventConnections ===============================================

/// Listener connections tied to the lifetime of their owner.
///
/// Callbacks registered here are tagged with the store's default state,
/// so a state's store only hears events while that state is active.
/// Callbacks that capture their owner should hold it through a `Weak`.
pub struct StoreEventConnections {
    handler: Rc<EventHandler>,
    default_state: String,
    connections: Vec<Connection>,
}

impl StoreEventConnections {
    /// Creates a store whose callbacks hear every state.
    pub fn new(handler: Rc<EventHandler>) -> Self {
        Self::scoped(handler, ALL_STATES)
    }

    /// Creates a store whose callbacks hear only `state`.
    pub fn scoped(handler: Rc<EventHandler>, state: &str) -> Self {
        Self {
            handler,
            default_state: state.to_owned(),
            connections: Vec::new(),
        }
    }

    /// Registers a callback tagged with the default state.
    pub fn register_callback<F>(&mut self, event_type: &str, callback: F) -> Connection
    where
        F: Fn(&dyn Event) + 'static,
    {
        let connection =
            self.handler
                .register_state_callback(event_type, &self.default_state, callback);
        self.connections.push(connection.clone());
        connection
    }

    /// Registers a callback tagged with an explicit state.
    pub fn register_state_callback<F>(&mut self, event_type: &str, state: &str, callback: F) -> Connection
    where
        F: Fn(&dyn Event) + 'static,
    {
        let connection = self
            .handler
            .register_state_callback(event_type, state, callback);
        self.connections.push(connection.clone());
        connection
    }

    /// Disconnects and forgets every stored connection.
    pub fn clear(&mut self) {
        for connection in self.connections.drain(..) {
            connection.disconnect();
        }
    }

    /// Returns the state tag applied by [`register_callback`](Self::register_callback).
    pub fn default_state(&self) -> &str {
        &self.default_state
    }

    /// Returns the handler the connections belong to.
    pub fn handler(&self) -> &Rc<EventHandler> {
        &self.handler
    }

    /// Returns the number of stored connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Drop for StoreEventConnections {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for StoreEventConnections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreEventConnections")
            .field("default_state", &self.default_state)
            .field("connections", &self.connections.len())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::EventRegistry;
    use crate::core::InitData;
    use std::cell::Cell;

    fn handler() -> Rc<EventHandler> {
        Rc::new(EventHandler::new(Rc::new(EventRegistry::new("Event"))))
    }

    #[test]
    fn drop_disconnects_everything() {
        let events = handler();
        let connection = {
            let mut store = StoreEventConnections::new(Rc::clone(&events));
            store.register_callback("tick", |_| {});
            let connection = store.register_callback("tock", |_| {});
            assert_eq!(store.len(), 2);
            connection
        };

        assert!(!connection.is_connected());
        assert!(events.is_empty());
    }

    #[test]
    fn scoped_store_tags_callbacks() {
        let events = handler();
        let hits = Rc::new(Cell::new(0));
        let mut store = StoreEventConnections::scoped(Rc::clone(&events), "game");
        let counter = Rc::clone(&hits);
        store.register_callback("jump", move |_| counter.set(counter.get() + 1));

        events.set_active_state("menu");
        events.send("jump", &InitData::Null);
        events.set_active_state("game");
        events.send("jump", &InitData::Null);

        assert_eq!(hits.get(), 1);
        assert_eq!(store.default_state(), "game");
    }

    #[test]
    fn explicit_state_overrides_default() {
        let events = handler();
        let mut store = StoreEventConnections::scoped(Rc::clone(&events), "game");
        store.register_state_callback("quit", ALL_STATES, |_| {});

        events.set_active_state("menu");
        assert!(events.send("quit", &InitData::Null));
    }

    #[test]
    fn clear_keeps_store_usable() {
        let events = handler();
        let mut store = StoreEventConnections::new(Rc::clone(&events));
        let first = store.register_callback("tick", |_| {});

        store.clear();
        assert!(!first.is_connected());
        assert!(store.is_empty());

        let second = store.register_callback("tick", |_| {});
        assert!(second.is_connected());
    }
}
