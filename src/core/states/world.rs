//=========================================================================
// World
//=========================================================================
//
// The isolated entities and systems owned by one state.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::context::Context;
use crate::core::entities::EntityManager;
use crate::core::events::{EventHandler, StoreEventConnections};
use crate::core::systems::SystemManager;
use crate::core::view::RenderTarget;

//=== World ===============================================================

/// Entity and system managers of a single state, plus access to the
/// engine context.
pub struct World {
    name: String,
    context: Rc<Context>,
    systems: Rc<SystemManager>,
    entities: EntityManager,
}

impl World {
    /// Creates an empty world for the state `name`.
    pub fn new(name: impl Into<String>, context: Rc<Context>) -> Rc<Self> {
        let name = name.into();
        let systems = Rc::new(SystemManager::new(name.clone(), Rc::clone(&context)));
        let entities = EntityManager::new(Rc::clone(&systems), Rc::clone(context.components()));
        Rc::new(Self {
            name,
            context,
            systems,
            entities,
        })
    }

    /// Name of the owning state.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the shared engine context.
    pub fn context(&self) -> &Rc<Context> {
        &self.context
    }

    /// Returns the systems of this world.
    pub fn systems(&self) -> &Rc<SystemManager> {
        &self.systems
    }

    /// Returns the entities of this world.
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// Returns the engine-wide event handler.
    pub fn events(&self) -> &Rc<EventHandler> {
        self.context.events()
    }

    /// A connection store whose callbacks only hear this world's state.
    pub fn connections(&self) -> StoreEventConnections {
        StoreEventConnections::scoped(Rc::clone(self.events()), &self.name)
    }

    //--- Frame ------------------------------------------------------------

    /// Updates every system of this world once.
    pub fn update(&self, delta: Duration) {
        self.systems.update(delta, self);
    }

    /// Draws `layer` with the graphical systems of this world.
    pub fn draw(&self, target: &mut dyn RenderTarget, layer: u32) {
        self.systems.draw(target, layer);
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("name", &self.name)
            .field("systems", &self.systems)
            .field("entities", &self.entities)
            .finish()
    }
}
