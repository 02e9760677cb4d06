//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges the external input-translation layer with the event handler.
//
// The input layer (window backend, terminal, network, test harness) only
// sees `InputSender`. The engine drains the other end once per frame and
// dispatches each message as an event.
//
// Components:
// - `interface`: message type and sending handle (the contract)
// - `event_collector`: engine-side bounded collection
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Internal API ========================================================

pub(crate) use event_collector::InputCollector;
pub use event_collector::TickControl;
pub use interface::{InputMessage, InputSender};
