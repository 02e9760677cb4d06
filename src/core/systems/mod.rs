//=========================================================================
// Systems
//=========================================================================
//
// Logic that processes the entities it admitted, once per frame.
//
// Architecture:
//   EntityManager ──add_entity──> SystemManager ──check_components──> System
//   World::update ──> SystemManager::update ──> System::update(frame)
//   World::draw   ──> SystemManager::draw   ──> GraphicalSystem::draw
//
// Admission is decided once, when the entity is offered. Later component
// changes do not move an entity in or out of a system.
//
//=========================================================================

//=== Module Declarations =================================================

mod system_manager;

//=== External Dependencies ===============================================

use std::rc::Rc;
use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::context::Context;
use crate::core::entities::{Entity, EntityPtr};
use crate::core::registry::RegisterClass;
use crate::core::states::World;
use crate::core::view::{RenderTarget, View};

//=== Public API ==========================================================

pub use system_manager::SystemManager;

/// Name that can never be used for a system.
pub const EXTERN_SYSTEM: &str = "extern";

//=== System Trait ========================================================

/// Per-frame logic over an admitted subset of a world's entities.
pub trait System {
    /// Admission predicate, evaluated once when an entity is offered.
    fn check_components(&self, entity: &Entity) -> bool;

    /// Runs one frame. Returning false reports a soft failure that is
    /// logged by the manager.
    fn update(&mut self, frame: &mut SystemFrame<'_>) -> bool;

    /// Returns the drawing side of this system, if it has one.
    fn as_graphical(&mut self) -> Option<&mut dyn GraphicalSystem> {
        None
    }
}

/// A system that also draws.
pub trait GraphicalSystem {
    fn draw(&mut self, target: &mut dyn RenderTarget, layer: u32, view: &View, entities: &[EntityPtr]);
}

//=== SystemFrame =========================================================

/// Everything a system sees during [`System::update`].
pub struct SystemFrame<'a> {
    pub delta: Duration,
    /// Shared camera. Changes are visible to the systems updated later in
    /// the same frame.
    pub view: &'a mut View,
    /// Entities admitted by this system.
    pub entities: &'a [EntityPtr],
    pub world: &'a World,
}

//=== SystemArgs ==========================================================

/// Constructor arguments handed to registered system constructors.
#[derive(Clone)]
pub struct SystemArgs {
    pub context: Rc<Context>,
    /// Name of the state whose world owns the system.
    pub state: String,
}

/// System constructors by name.
pub type SystemRegistry = RegisterClass<dyn System, SystemArgs>;
