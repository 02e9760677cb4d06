//=========================================================================
// States
//=========================================================================
//
// Game modes (menu, play, pause...) kept on a stack.
//
// Architecture:
//   StateManager ──switch_to──> front of stack ──> EventHandler active state
//   update(): front → back while is_transcendant()
//   draw():   front → back while is_transparent()
//
// Each state owns a World, so entities and systems never leak between
// states. Stack changes requested mid-frame go through `StateRequests`.
//
//=========================================================================

//=== Module Declarations =================================================

mod requests;
mod state_manager;
mod world;

//=== External Dependencies ===============================================

use std::rc::Rc;
use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::registry::RegisterClass;
use crate::core::view::RenderTarget;

//=== Public API ==========================================================

pub use requests::{StateRequest, StateRequests};
pub use state_manager::StateManager;
pub use world::World;

//=== State Trait =========================================================

/// A game mode with its own world.
///
/// Lifecycle: `on_create` once after construction, then `activate` and
/// `deactivate` each time the state reaches or leaves the front, and
/// `on_destroy` once before it is dropped.
pub trait State {
    fn on_create(&mut self) {}

    fn on_destroy(&mut self) {}

    fn activate(&mut self) {}

    fn deactivate(&mut self) {}

    fn update(&mut self, delta: Duration);

    fn draw(&mut self, _target: &mut dyn RenderTarget, _layer: u32) {}

    /// States below a transcendant state are updated too.
    fn is_transcendant(&self) -> bool {
        false
    }

    /// States below a transparent state are drawn too.
    fn is_transparent(&self) -> bool {
        false
    }

    fn world(&self) -> &Rc<World>;
}

/// State constructors by name. Each constructor receives a fresh world.
pub type StateRegistry = RegisterClass<dyn State, Rc<World>>;
