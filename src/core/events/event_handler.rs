//=========================================================================
// Event Handler
//=========================================================================
//
// Synchronous publish/subscribe bus with state-scoped delivery.
//
// Architecture:
//   register_callback(type, state, f) ──> slot table + per-type order
//   send_event(event) ──> snapshot listeners of event.type matching the
//                         active state ──> call each one still connected
//
// A listener tagged `all` hears every state. Any other tag only hears
// events sent while the state of that name is at the front of the stack.
// Callbacks run with no handler borrow held: they may send events,
// register or disconnect listeners. A panicking callback is logged and
// the dispatch goes on.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use log::{debug, error};
use slotmap::SlotMap;

//=== Internal Dependencies ===============================================

use super::connection::{Callback, Listener, ListenerKey, ListenerTable};
use super::{Connection, Event, EventRegistry, ExternEvent};
use crate::core::InitData;

//=== Constants ===========================================================

/// State tag of listeners that hear every state. Reserved as a state name.
pub const ALL_STATES: &str = "all";

//=== EventHandler ========================================================

pub struct EventHandler {
    listeners: ListenerTable,
    order: RefCell<HashMap<String, Vec<ListenerKey>>>,
    active_state: RefCell<String>,
    registry: Rc<EventRegistry>,
}

impl EventHandler {
    //--- Construction -----------------------------------------------------

    /// Creates a handler with no listeners and no active state.
    pub fn new(registry: Rc<EventRegistry>) -> Self {
        Self {
            listeners: Rc::new(RefCell::new(SlotMap::with_key())),
            order: RefCell::new(HashMap::new()),
            active_state: RefCell::new(String::new()),
            registry,
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a listener that hears `event_type` in every state.
    pub fn register_callback<F>(&self, event_type: &str, callback: F) -> Connection
    where
        F: Fn(&dyn Event) + 'static,
    {
        self.register_state_callback(event_type, ALL_STATES, callback)
    }

    /// Registers a listener that hears `event_type` only while `state` is
    /// active (or always if `state` is [`ALL_STATES`]).
    pub fn register_state_callback<F>(&self, event_type: &str, state: &str, callback: F) -> Connection
    where
        F: Fn(&dyn Event) + 'static,
    {
        let key = self.listeners.borrow_mut().insert(Listener {
            event_type: event_type.to_owned(),
            state: state.to_owned(),
            callback: Rc::new(callback),
        });
        self.order
            .borrow_mut()
            .entry(event_type.to_owned())
            .or_default()
            .push(key);

        debug!(
            "EventHandler: listener for {} registered in state {}",
            event_type, state
        );
        Connection::new(key, &self.listeners)
    }

    /// Disconnects every listener.
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
        self.order.borrow_mut().clear();
    }

    /// Disconnects every listener tagged with `state`.
    pub fn clear_state(&self, state: &str) {
        let mut listeners = self.listeners.borrow_mut();
        listeners.retain(|_, listener| listener.state != state);

        let mut order = self.order.borrow_mut();
        for keys in order.values_mut() {
            keys.retain(|key| listeners.contains_key(*key));
        }
        order.retain(|_, keys| !keys.is_empty());
    }

    //--- Active State -----------------------------------------------------

    /// Sets the state whose tagged listeners receive events.
    pub fn set_active_state(&self, state: &str) {
        *self.active_state.borrow_mut() = state.to_owned();
    }

    /// Returns the name of the active state (empty before the first switch).
    pub fn active_state(&self) -> String {
        self.active_state.borrow().clone()
    }

    //--- Events -----------------------------------------------------------

    /// Instantiates `event_type`, falling back to an [`ExternEvent`].
    pub fn create_event(&self, event_type: &str) -> Box<dyn Event> {
        self.registry
            .construct(event_type, event_type.to_owned())
            .unwrap_or_else(|| {
                debug!(
                    "EventHandler: {} is not registered, using an extern event",
                    event_type
                );
                Box::new(ExternEvent::new(event_type))
            })
    }

    /// Instantiates `event_type` and initializes it from `init`.
    pub fn create_event_with(&self, event_type: &str, init: &InitData) -> Box<dyn Event> {
        let mut event = self.create_event(event_type);
        event.create(init);
        event
    }

    /// Creates and dispatches an event in one call.
    pub fn send(&self, event_type: &str, init: &InitData) -> bool {
        let event = self.create_event_with(event_type, init);
        self.send_event(&*event)
    }

    //--- Dispatch ---------------------------------------------------------

    /// Dispatches `event` to the matching listeners in registration order.
    ///
    /// Returns true if at least one listener ran.
    pub fn send_event(&self, event: &dyn Event) -> bool {
        let event_type = event.event_type();
        let Some(callbacks) = self.matching_listeners(event_type) else {
            return false;
        };

        let mut delivered = false;
        for (key, callback) in callbacks {
            // A previous callback may have disconnected this one.
            if !self.listeners.borrow().contains_key(key) {
                continue;
            }
            delivered = true;

            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(event))) {
                error!(
                    "EventHandler: a listener of {} panicked: {}",
                    event_type,
                    panic_message(&*payload)
                );
            }
        }
        delivered
    }

    //--- Queries ----------------------------------------------------------

    /// Number of connected listeners of `event_type`, in any state.
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners
            .borrow()
            .values()
            .filter(|listener| listener.event_type == event_type)
            .count()
    }

    /// Returns true if no listener is connected.
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    //--- Internal Helpers -------------------------------------------------

    /// Collects the listeners of `event_type` that hear the active state.
    /// Returns `None` (after logging why) when there are none.
    fn matching_listeners(&self, event_type: &str) -> Option<Vec<(ListenerKey, Callback)>> {
        let mut order = self.order.borrow_mut();
        let listeners = self.listeners.borrow();

        let keys = order.get_mut(event_type);
        let keys = match keys {
            Some(keys) => {
                keys.retain(|key| listeners.contains_key(*key));
                keys
            }
            None => {
                debug!("EventHandler: no listener for {}", event_type);
                return None;
            }
        };
        if keys.is_empty() {
            order.remove(event_type);
            debug!("EventHandler: no listener for {}", event_type);
            return None;
        }

        let active = self.active_state.borrow();
        let matching: Vec<(ListenerKey, Callback)> = keys
            .iter()
            .filter_map(|key| listeners.get(*key).map(|listener| (*key, listener)))
            .filter(|(_, listener)| listener.state == ALL_STATES || listener.state == *active)
            .map(|(key, listener)| (key, Rc::clone(&listener.callback)))
            .collect();

        if matching.is_empty() {
            debug!(
                "EventHandler: {} listener(s) for {}, none in active state {:?}",
                keys.len(),
                event_type,
                *active
            );
            return None;
        }
        Some(matching)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("listeners", &self.listeners.borrow().len())
            .field("active_state", &*self.active_state.borrow())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::EventBase;
    use serde_json::json;
    use std::cell::Cell;

    fn handler() -> Rc<EventHandler> {
        Rc::new(EventHandler::new(Rc::new(EventRegistry::new("Event"))))
    }

    fn counter() -> (Rc<Cell<u32>>, impl Fn(&dyn Event) + 'static) {
        let count = Rc::new(Cell::new(0));
        let hits = Rc::clone(&count);
        (count, move |_: &dyn Event| hits.set(hits.get() + 1))
    }

    //--- Dispatch Tests ---------------------------------------------------

    #[test]
    fn send_without_listener_returns_false() {
        let events = handler();
        assert!(!events.send("tick", &InitData::Null));
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let events = handler();
        let order = Rc::new(RefCell::new(Vec::new()));
        for id in 0..3 {
            let order = Rc::clone(&order);
            events.register_callback("tick", move |_| order.borrow_mut().push(id));
        }

        assert!(events.send("tick", &InitData::Null));
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn state_scoped_listener_is_filtered() {
        let events = handler();
        let (count, callback) = counter();
        events.register_state_callback("jump", "game", callback);

        events.set_active_state("menu");
        assert!(!events.send("jump", &InitData::Null));
        assert_eq!(count.get(), 0);

        events.set_active_state("game");
        assert!(events.send("jump", &InitData::Null));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn all_listener_hears_every_state() {
        let events = handler();
        let (count, callback) = counter();
        events.register_callback("jump", callback);

        events.set_active_state("menu");
        events.send("jump", &InitData::Null);
        events.set_active_state("game");
        events.send("jump", &InitData::Null);

        assert_eq!(count.get(), 2);
    }

    #[test]
    fn callback_reads_event_attributes() {
        let events = handler();
        let seen = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&seen);
        events.register_callback("keypressed", move |event| {
            *sink.borrow_mut() = event.get::<String>("key").0;
        });

        events.send("keypressed", &json!({ "key": "space" }));

        assert_eq!(*seen.borrow(), "space");
    }

    #[test]
    fn registered_event_type_is_constructed() {
        struct Collision {
            base: EventBase,
        }

        impl Event for Collision {
            fn base(&self) -> &EventBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut EventBase {
                &mut self.base
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        let mut registry = EventRegistry::new("Event");
        registry.register("collision", |event_type| {
            Box::new(Collision {
                base: EventBase::new(event_type),
            })
        });
        let events = EventHandler::new(Rc::new(registry));

        let native = Rc::new(Cell::new(false));
        let flag = Rc::clone(&native);
        events.register_callback("collision", move |event| {
            flag.set(event.downcast_ref::<Collision>().is_some());
        });

        events.send("collision", &InitData::Null);
        assert!(native.get());
    }

    //--- Reentrancy Tests -------------------------------------------------

    #[test]
    fn callback_can_send_events() {
        let events = handler();
        let (count, callback) = counter();
        events.register_callback("pong", callback);

        let inner = Rc::downgrade(&events);
        events.register_callback("ping", move |_| {
            if let Some(events) = inner.upgrade() {
                events.send("pong", &InitData::Null);
            }
        });

        assert!(events.send("ping", &InitData::Null));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn callback_disconnecting_a_later_listener_skips_it() {
        let events = handler();
        let (count, callback) = counter();

        let victim: Rc<RefCell<Option<Connection>>> = Rc::default();
        let target = Rc::clone(&victim);
        events.register_callback("tick", move |_| {
            if let Some(connection) = target.borrow().as_ref() {
                connection.disconnect();
            }
        });
        *victim.borrow_mut() = Some(events.register_callback("tick", callback));

        assert!(events.send("tick", &InitData::Null));
        assert_eq!(count.get(), 0);
        assert_eq!(events.listener_count("tick"), 1);
    }

    #[test]
    fn panicking_callback_is_contained() {
        let events = handler();
        let (count, callback) = counter();
        events.register_callback("boom", |_| panic!("listener failure"));
        events.register_callback("boom", callback);

        assert!(events.send("boom", &InitData::Null));
        assert_eq!(count.get(), 1);
    }

    //--- Connection Tests -------------------------------------------------

    #[test]
    fn disconnected_listener_stops_firing() {
        let events = handler();
        let (count, callback) = counter();
        let connection = events.register_callback("tick", callback);

        connection.disconnect();
        connection.disconnect();

        assert!(!connection.is_connected());
        assert!(!events.send("tick", &InitData::Null));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn clear_state_only_removes_tagged_listeners() {
        let events = handler();
        let game = events.register_state_callback("tick", "game", |_| {});
        let menu = events.register_state_callback("tick", "menu", |_| {});
        let global = events.register_callback("tick", |_| {});

        events.clear_state("game");

        assert!(!game.is_connected());
        assert!(menu.is_connected());
        assert!(global.is_connected());

        events.clear();
        assert!(events.is_empty());
        assert!(!global.is_connected());
    }

    #[test]
    fn clear_state_prunes_dispatch_order() {
        let events = handler();
        for _ in 0..3 {
            events.register_state_callback("rare", "game", |_| {});
            events.clear_state("game");
        }
        events.register_state_callback("tick", "menu", |_| {});
        events.register_state_callback("tick", "game", |_| {});

        events.clear_state("game");

        let order = events.order.borrow();
        assert!(!order.contains_key("rare"));
        assert_eq!(order.get("tick").map(Vec::len), Some(1));
    }
}
