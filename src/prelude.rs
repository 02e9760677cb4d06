//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use keystone_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine facade
pub use crate::engine::{init_logging, Engine, EngineBuilder, EngineConfig};
pub use crate::core::platform_bridge::{InputMessage, InputSender, TickControl};

// Shared services
pub use crate::core::context::{Context, Registries};
pub use crate::core::error::{ConfigError, StateError, SystemError};
pub use crate::core::InitData;

// Variables
pub use crate::core::variables::{Member, Value, ValueKind, VariableStorage};

// Entities
pub use crate::core::entities::{
    Component, Entity, EntityManager, EntityPtr, PositionComponent, POSITION,
};

// Systems
pub use crate::core::systems::{GraphicalSystem, System, SystemArgs, SystemFrame, SystemManager};

// Events
pub use crate::core::events::{Connection, Event, EventBase, EventHandler, StoreEventConnections, ALL_STATES};

// States
pub use crate::core::states::{State, StateManager, World};

// Rendering
pub use crate::core::view::{RenderTarget, View};
