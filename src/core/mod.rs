//=========================================================================
// Core
//
// Data-driven runtime spine of the engine.
//
// Responsibilities:
// - Typed attribute storage and name → constructor registries
// - Entities made of named components, systems routing them by capability
// - State-scoped event dispatch with owner-bound connections
// - A stack of states, each owning an isolated world
//
// Notes:
// Everything here runs on one thread and is driven frame by frame by the
// `Engine`. Shared managers use `Rc` plus interior mutability so that
// systems, states and event callbacks can reach them while a frame runs.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod context;
pub mod entities;
pub mod error;
pub mod events;
pub mod registry;
pub mod states;
pub mod systems;
pub mod variables;
pub mod view;

pub(crate) mod platform_bridge;

//=== Shared Types ========================================================

/// Description blob used to initialize components, events and entities.
pub type InitData = serde_json::Value;
