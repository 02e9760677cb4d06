//=========================================================================
// Event
//=========================================================================
//
// Event trait, its shared base data and the generic fallback used for
// event types that have no native implementation.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;

//=== Internal Dependencies ===============================================

use crate::core::entities::EntityPtr;
use crate::core::registry::RegisterClass;
use crate::core::variables::{Value, Variable, VariableStorage};
use crate::core::InitData;

//=== EventBase ===========================================================

/// Data every event carries: its type, attributes and referenced entities.
#[derive(Debug)]
pub struct EventBase {
    event_type: String,
    pub variables: VariableStorage,
    pub entities: Vec<EntityPtr>,
}

impl EventBase {
    /// Creates the base of an event of type `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        let event_type = event_type.into();
        Self {
            variables: VariableStorage::new(format!("Event {}", event_type)),
            event_type,
            entities: Vec::new(),
        }
    }

    /// Returns the event type.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }
}

//=== Event Trait =========================================================

/// A message dispatched synchronously through the
/// [`EventHandler`](super::EventHandler).
pub trait Event: Any {
    fn base(&self) -> &EventBase;

    fn base_mut(&mut self) -> &mut EventBase;

    /// Initializes the event from its description. The default loads every
    /// attribute of an object into the event's storage.
    fn create(&mut self, init: &InitData) {
        self.base_mut().variables.load_from_json(init);
    }

    fn as_any(&self) -> &dyn Any;
}

impl dyn Event {
    /// Returns the event type.
    pub fn event_type(&self) -> &str {
        self.base().event_type()
    }

    /// Returns the attributes of the event.
    pub fn variables(&self) -> &VariableStorage {
        &self.base().variables
    }

    /// Reads an attribute. See [`VariableStorage::get`].
    pub fn get<T: Variable>(&self, name: &str) -> (T, bool) {
        self.base().variables.get(name)
    }

    /// Writes an attribute. See [`VariableStorage::set`].
    pub fn set<V: Into<Value>>(&mut self, name: &str, value: V) {
        self.base_mut().variables.set(name, value);
    }

    /// Returns the entities the event refers to.
    pub fn entities(&self) -> &[EntityPtr] {
        &self.base().entities
    }

    /// Adds an entity reference.
    pub fn push_entity(&mut self, entity: EntityPtr) {
        self.base_mut().entities.push(entity);
    }

    /// Returns the concrete event, if it is a `T`.
    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Event constructors by type. Constructors receive the requested type.
pub type EventRegistry = RegisterClass<dyn Event, String>;

//=== ExternEvent =========================================================

/// Event with no native fields, used for unregistered types.
#[derive(Debug)]
pub struct ExternEvent {
    base: EventBase,
}

impl ExternEvent {
    /// Creates an extern event of type `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            base: EventBase::new(event_type),
        }
    }
}

impl Event for ExternEvent {
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

//=========================================================================
// Unit Tests
//=========================================================================
