//=========================================================================
// Entities
//=========================================================================
//
// Entity/component model.
//
// Components:
// - `component`: Component trait, registry alias, extern fallback
// - `position`: built-in 2D position component
// - `entity`: component bag with unique names
// - `entity_manager`: per-world entity list bridged to the systems
//
//=========================================================================

//=== Module Declarations =================================================

mod component;
mod entity;
mod entity_manager;
mod position;

//=== Public API ==========================================================

pub use component::{Component, ComponentPtr, ComponentRegistry, ExternComponent};
pub use entity::{Entity, EntityPtr};
pub use entity_manager::EntityManager;
pub use position::{PositionComponent, POSITION};
