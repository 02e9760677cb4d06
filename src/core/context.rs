//=========================================================================
// Context
//=========================================================================
//
// Engine-wide services shared by every world: the constructor registries,
// the event handler, the state request queue and the exit flag.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use log::info;

//=== Internal Dependencies ===============================================

use crate::core::entities::{ComponentRegistry, PositionComponent, POSITION};
use crate::core::events::{EventHandler, EventRegistry};
use crate::core::states::{StateRegistry, StateRequests};
use crate::core::systems::SystemRegistry;

//=== Registries ==========================================================

/// The four constructor registries, filled before the context is built.
pub struct Registries {
    pub components: ComponentRegistry,
    pub events: EventRegistry,
    pub systems: SystemRegistry,
    pub states: StateRegistry,
}

impl Registries {
    /// Creates empty registries.
    pub fn new() -> Self {
        Self {
            components: ComponentRegistry::new("Component"),
            events: EventRegistry::new("Event"),
            systems: SystemRegistry::new("System"),
            states: StateRegistry::new("State"),
        }
    }

    /// Registers the components every engine provides.
    pub fn register_builtins(&mut self) {
        if !self.components.contains(POSITION) {
            self.components
                .register(POSITION, |()| Box::new(PositionComponent::new()));
        }
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}

//=== Context =============================================================

pub struct Context {
    components: Rc<ComponentRegistry>,
    systems: SystemRegistry,
    states: StateRegistry,
    events: Rc<EventHandler>,
    requests: StateRequests,
    exit: Cell<bool>,
}

impl Context {
    /// Builds the shared context from filled registries.
    pub fn new(registries: Registries) -> Rc<Self> {
        let Registries {
            components,
            events,
            mut systems,
            states,
        } = registries;

        // System names are case-insensitive.
        systems.normalize_names(str::to_lowercase);

        Rc::new(Self {
            components: Rc::new(components),
            systems,
            states,
            events: Rc::new(EventHandler::new(Rc::new(events))),
            requests: StateRequests::new(),
            exit: Cell::new(false),
        })
    }

    //--- Services ---------------------------------------------------------

    /// Returns the component registry.
    pub fn components(&self) -> &Rc<ComponentRegistry> {
        &self.components
    }

    /// Returns the system registry. Names are lowercase.
    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    /// Returns the state registry.
    pub fn states(&self) -> &StateRegistry {
        &self.states
    }

    /// Returns the engine-wide event handler.
    pub fn events(&self) -> &Rc<EventHandler> {
        &self.events
    }

    /// Queue for stack changes requested while a frame is running.
    pub fn requests(&self) -> &StateRequests {
        &self.requests
    }

    //--- Exit -------------------------------------------------------------

    /// Asks the engine to stop after the current frame.
    pub fn request_exit(&self) {
        if !self.exit.replace(true) {
            info!("Exit requested");
        }
    }

    /// Returns true once [`request_exit`](Self::request_exit) was called.
    pub fn is_exit_requested(&self) -> bool {
        self.exit.get()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("components", &self.components)
            .field("systems", &self.systems)
            .field("states", &self.states)
            .field("exit", &self.exit.get())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
