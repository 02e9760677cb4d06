//=========================================================================
// Events
//=========================================================================
//
// Typed publish/subscribe between gameplay code, scripts and the input
// bridge.
//
// Components:
// - `event`: Event trait, base data, extern fallback
// - `connection`: shared listener handles
// - `event_handler`: registration and state-scoped dispatch
// - `store_connections`: owner-scoped connection lifetime
//
//=========================================================================

//=== Module Declarations =================================================

mod connection;
mod event;
mod event_handler;
mod store_connections;

//=== Public API ==========================================================

pub use connection::{Callback, Connection, ListenerKey};
pub use event::{Event, EventBase, EventRegistry, ExternEvent};
pub use event_handler::{EventHandler, ALL_STATES};
pub use store_connections::StoreEventConnections;
