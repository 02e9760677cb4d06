//=========================================================================
// Connection
//=========================================================================
//
// Handle to one listener registration.
//
// Listeners live in a generational slot table owned by the event handler.
// A connection is a key into that table plus a weak reference to it, so
// every copy of a connection names the same registration and a handle
// outliving its handler is harmless.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};

//=== Internal Dependencies ===============================================

use super::Event;

//=== Listener Table ======================================================

new_key_type! {
    /// Key of a listener in the handler's slot table.
    pub struct ListenerKey;
}

/// Listener callback.
pub type Callback = Rc<dyn Fn(&dyn Event)>;

pub(crate) struct Listener {
    pub(crate) event_type: String,
    pub(crate) state: String,
    pub(crate) callback: Callback,
}

pub(crate) type ListenerTable = Rc<RefCell<SlotMap<ListenerKey, Listener>>>;

//=== Connection ==========================================================

/// Shared handle to a listener registration.
///
/// Clones alias the same registration. Disconnecting through any clone
/// disconnects all of them, and disconnecting twice does nothing.
#[derive(Clone)]
pub struct Connection {
    key: ListenerKey,
    table: Weak<RefCell<SlotMap<ListenerKey, Listener>>>,
}

impl Connection {
    pub(crate) fn new(key: ListenerKey, table: &ListenerTable) -> Self {
        Self {
            key,
            table: Rc::downgrade(table),
        }
    }

    /// Returns true while the listener is registered.
    pub fn is_connected(&self) -> bool {
        self.table
            .upgrade()
            .map_or(false, |table| table.borrow().contains_key(self.key))
    }

    /// Removes the listener. Has no effect if it is already gone.
    pub fn disconnect(&self) {
        if let Some(table) = self.table.upgrade() {
            table.borrow_mut().remove(self.key);
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("key", &self.key)
            .field("connected", &self.is_connected())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_listener() -> (ListenerTable, Connection) {
        let table: ListenerTable = Rc::new(RefCell::new(SlotMap::with_key()));
        let key = table.borrow_mut().insert(Listener {
            event_type: "tick".to_owned(),
            state: "all".to_owned(),
            callback: Rc::new(|_: &dyn Event| {}),
        });
        let connection = Connection::new(key, &table);
        (table, connection)
    }

    #[test]
    fn double_disconnect_is_noop() {
        let (table, connection) = table_with_listener();
        assert!(connection.is_connected());

        connection.disconnect();
        assert!(!connection.is_connected());

        connection.disconnect();
        assert!(table.borrow().is_empty());
    }

    #[test]
    fn clones_share_registration() {
        let (_table, connection) = table_with_listener();
        let copy = connection.clone();

        copy.disconnect();
        assert!(!connection.is_connected());
    }

    #[test]
    fn stale_key_does_not_remove_new_listener() {
        let (table, old) = table_with_listener();
        old.disconnect();

        let key = table.borrow_mut().insert(Listener {
            event_type: "tick".to_owned(),
            state: "all".to_owned(),
            callback: Rc::new(|_: &dyn Event| {}),
        });
        let new = Connection::new(key, &table);

        old.disconnect();
        assert!(new.is_connected());
        assert!(!old.is_connected());
    }

    #[test]
    fn connection_outliving_table() {
        let (table, connection) = table_with_listener();
        drop(table);

        assert!(!connection.is_connected());
        connection.disconnect();
    }
}
