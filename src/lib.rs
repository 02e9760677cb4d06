//=========================================================================
// Keystone Engine — Library Root
//
// This crate defines the public API surface of the Keystone Engine.
//
// Responsibilities:
// - Expose the engine facade (`EngineBuilder`, `Engine`)
// - Expose the data-driven core (variables, entities, systems, events,
//   states) for games that describe their content by name
// - Keep the input collection machinery internal; the input layer only
//   sees `InputSender`
//
// Typical usage:
// ```ignore
// use keystone_engine::prelude::*;
//
// fn main() {
//     init_logging("info");
//     let mut engine = EngineBuilder::new()
//         .with_initial_state("menu")
//         .register_state("menu", |world| Box::new(Menu::new(world)))
//         .build();
//     engine.run(&mut screen);
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the engine runtime: typed variables, registries,
// entities, systems, events and the state stack. Games implement its
// traits and register constructors for them.
//
// `prelude` re-exports the commonly used types.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `engine` defines the builder, the frame loop, configuration and logging
// setup.
//
mod engine;

//--- Public Exports ------------------------------------------------------

pub use crate::core::platform_bridge::{InputMessage, InputSender, TickControl};
pub use engine::{init_logging, Engine, EngineBuilder, EngineConfig};
