//=========================================================================
// Keystone Engine
//
// Main entry point: registry setup, frame loop and input bridge.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run(target)──>  [frame loop]
//         │                          │
//         ├─ with_config()           ├─ frame(): input → events
//         ├─ with_tps()              │           → states.update
//         ├─ register_system()       │           → states.draw (per layer)
//         └─ register_state()        │           → state requests
//                                    └─ input_sender() for the input layer
// ```
//
//=========================================================================

//=== Module Declarations =================================================

mod config;
mod logging;

//=== External Dependencies ===============================================

use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use log::{debug, error, info};

//=== Internal Dependencies ===============================================

use crate::core::context::{Context, Registries};
use crate::core::entities::Component;
use crate::core::error::ConfigError;
use crate::core::events::{Event, EventHandler};
use crate::core::platform_bridge::{InputCollector, InputSender, TickControl};
use crate::core::states::{State, StateManager, World};
use crate::core::systems::{System, SystemArgs};
use crate::core::view::RenderTarget;

//=== Public API ==========================================================

pub use config::EngineConfig;
pub use logging::init_logging;

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// Collects the engine settings and the constructors of every component,
/// event, system and state the game describes by name.
///
/// # Default Values
///
/// - **TPS**: 60.0 (frames per second)
/// - **Input capacity**: 128 messages
/// - **Draw layers**: 1
///
/// # Examples
///
/// ```no_run
/// use std::rc::Rc;
/// use std::time::Duration;
/// use keystone_engine::prelude::*;
///
/// struct Menu {
///     world: Rc<World>,
/// }
///
/// impl State for Menu {
///     fn update(&mut self, delta: Duration) {
///         self.world.update(delta);
///     }
///
///     fn world(&self) -> &Rc<World> {
///         &self.world
///     }
/// }
///
/// struct Screen;
///
/// impl RenderTarget for Screen {
///     fn set_view(&mut self, _view: &View) {}
///
///     fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
///         self
///     }
/// }
///
/// let mut engine = EngineBuilder::new()
///     .with_tps(120.0)
///     .with_initial_state("menu")
///     .register_state("menu", |world| Box::new(Menu { world }))
///     .build();
///
/// engine.run(&mut Screen);
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    registries: Registries,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            registries: Registries::new(),
        }
    }

    //--- Settings ---------------------------------------------------------

    /// Replaces every setting with `config` once it passes
    /// [`EngineConfig::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a non-positive TPS or input
    /// capacity. The builder is consumed in that case.
    pub fn with_config(mut self, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Sets the target frames per second of [`Engine::run`].
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.config.tps = tps;
        self
    }

    /// Sets the capacity of the input channel.
    ///
    /// Messages sent while the channel is full are dropped.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_input_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Input capacity must be positive");
        self.config.input_capacity = capacity;
        self
    }

    /// Sets how many layers are drawn each frame.
    pub fn with_draw_layers(mut self, layers: u32) -> Self {
        self.config.draw_layers = layers;
        self
    }

    /// Sets the state switched to by [`build`](Self::build).
    pub fn with_initial_state(mut self, name: &str) -> Self {
        self.config.initial_state = Some(name.to_owned());
        self
    }

    //--- Registration -----------------------------------------------------

    /// Registers a component type.
    pub fn register_component<F>(mut self, name: &str, constructor: F) -> Self
    where
        F: Fn() -> Box<dyn Component> + 'static,
    {
        self.registries
            .components
            .register(name, move |()| constructor());
        self
    }

    /// Registers an event type. The constructor receives the type name.
    pub fn register_event<F>(mut self, name: &str, constructor: F) -> Self
    where
        F: Fn(String) -> Box<dyn Event> + 'static,
    {
        self.registries.events.register(name, constructor);
        self
    }

    /// Registers a system. Names are case-insensitive and are lowercased
    /// when the engine is built.
    pub fn register_system<F>(mut self, name: &str, constructor: F) -> Self
    where
        F: Fn(SystemArgs) -> Box<dyn System> + 'static,
    {
        self.registries.systems.register(name, constructor);
        self
    }

    /// Registers a state. The constructor receives the state's fresh world.
    pub fn register_state<F>(mut self, name: &str, constructor: F) -> Self
    where
        F: Fn(Rc<World>) -> Box<dyn State> + 'static,
    {
        self.registries.states.register(name, constructor);
        self
    }

    /// Direct access to the registries, for bulk registration.
    pub fn registries_mut(&mut self) -> &mut Registries {
        &mut self.registries
    }

    //--- Build ------------------------------------------------------------

    /// Builds the engine.
    ///
    /// Registers the built-in components, creates the input channel and
    /// switches to the initial state when one is configured. A failing
    /// initial switch is logged and leaves the stack empty.
    pub fn build(self) -> Engine {
        let Self {
            config,
            mut registries,
        } = self;

        info!(
            "Building engine (TPS: {}, input capacity: {})",
            config.tps, config.input_capacity
        );

        registries.register_builtins();
        let context = Context::new(registries);
        let mut states = StateManager::new(Rc::clone(&context));

        let (tx, rx) = bounded(config.input_capacity);

        if let Some(initial) = &config.initial_state {
            if let Err(e) = states.switch_to(initial) {
                error!("Initial state could not be entered: {}", e);
            }
        }

        Engine {
            context,
            states,
            collector: InputCollector::new(rx),
            sender: InputSender::new(tx),
            config,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Keystone Engine runtime.
///
/// Drives the state stack one frame at a time. Create via
/// [`EngineBuilder`].
///
/// # Frame Order
///
/// ```text
/// 1. Drain the input channel, dispatch each message as an event
/// 2. Update states (front to back while transcendant)
/// 3. Draw each layer (front to back while transparent)
/// 4. Apply queued state requests and removals
/// ```
///
/// The engine keeps one input sender itself, so the input channel never
/// disconnects while the engine is alive. The input layer stops the loop
/// with [`InputSender::quit`].
pub struct Engine {
    context: Rc<Context>,
    states: StateManager,
    collector: InputCollector,
    sender: InputSender,
    config: EngineConfig,
}

impl Engine {
    //--- Execution --------------------------------------------------------

    /// Runs one frame.
    ///
    /// Returns `Exit` when the input layer quit, a state requested exit,
    /// or the state stack is empty.
    pub fn frame(&mut self, delta: Duration, target: &mut dyn RenderTarget) -> TickControl {
        //--- 1. Input ---------------------------------------------------
        let control = self.collector.collect_frame();
        if !self.collector.events().is_empty() {
            debug!("Dispatching {} input event(s)", self.collector.events().len());
        }
        for (event_type, data) in self.collector.take_events() {
            self.context.events().send(&event_type, &data);
        }
        if control == TickControl::Exit {
            return TickControl::Exit;
        }

        //--- 2. Update --------------------------------------------------
        self.states.update(delta);

        //--- 3. Draw ----------------------------------------------------
        for layer in 0..self.config.draw_layers {
            self.states.draw(target, layer);
        }

        //--- 4. End of frame --------------------------------------------
        self.states.process_requests();

        if self.context.is_exit_requested() || self.states.is_empty() {
            TickControl::Exit
        } else {
            TickControl::Continue
        }
    }

    /// Runs frames at the configured TPS until [`frame`](Self::frame)
    /// returns `Exit`.
    ///
    /// Each frame receives the fixed frame duration as its delta.
    pub fn run(&mut self, target: &mut dyn RenderTarget) {
        let frame_duration = Duration::from_secs_f64(1.0 / self.config.tps);
        info!("Starting frame loop (TPS: {})", self.config.tps);

        let mut frames: u64 = 0;
        loop {
            let frame_start = Instant::now();
            frames += 1;

            if self.frame(frame_duration, target) == TickControl::Exit {
                break;
            }

            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                thread::sleep(frame_duration - elapsed);
            }
        }

        info!("Frame loop exited after {} frame(s)", frames);
    }

    //--- Accessors --------------------------------------------------------

    /// Handle for the input layer. May be cloned freely.
    pub fn input_sender(&self) -> InputSender {
        self.sender.clone()
    }

    /// Returns the shared engine context.
    pub fn context(&self) -> &Rc<Context> {
        &self.context
    }

    /// Returns the engine-wide event handler.
    pub fn events(&self) -> &Rc<EventHandler> {
        self.context.events()
    }

    /// Returns the state stack.
    pub fn states(&self) -> &StateManager {
        &self.states
    }

    /// Returns the state stack for direct manipulation between frames.
    pub fn states_mut(&mut self) -> &mut StateManager {
        &mut self.states
    }

    /// Returns the settings the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entities::{Entity, PositionComponent, POSITION};
    use crate::core::events::StoreEventConnections;
    use crate::core::systems::SystemFrame;
    use crate::core::view::View;
    use serde_json::json;
    use std::any::Any;
    use std::cell::Cell;

    //--- Test Doubles -----------------------------------------------------

    /// Moves every positioned entity one unit right per frame.
    struct Mover;

    impl System for Mover {
        fn check_components(&self, entity: &Entity) -> bool {
            entity.has_component(POSITION)
        }

        fn update(&mut self, frame: &mut SystemFrame<'_>) -> bool {
            for entity in frame.entities {
                if let Some(component) = entity.get_component(POSITION) {
                    let mut component = component.borrow_mut();
                    if let Some(position) = component.downcast_mut::<PositionComponent>() {
                        position.move_by(1.0, 0.0);
                    }
                }
            }
            true
        }
    }

    #[derive(Default, Clone)]
    struct Counters {
        jumps: Rc<Cell<u32>>,
        frames: Rc<Cell<u32>>,
    }

    struct Game {
        world: Rc<World>,
        counters: Counters,
        exit_after: u32,
        connections: Option<StoreEventConnections>,
    }

    impl State for Game {
        fn on_create(&mut self) {
            self.world.systems().load_systems(&["mover"]).unwrap();
            self.world
                .entities()
                .add_entity_with("player", &json!({ "position": [0, 0] }));

            let mut connections = self.world.connections();
            let jumps = Rc::clone(&self.counters.jumps);
            connections.register_callback("jump", move |_| jumps.set(jumps.get() + 1));
            self.connections = Some(connections);
        }

        fn update(&mut self, delta: Duration) {
            self.world.update(delta);
            let frames = self.counters.frames.get() + 1;
            self.counters.frames.set(frames);
            if frames == self.exit_after {
                self.world.context().request_exit();
            }
        }

        fn draw(&mut self, target: &mut dyn RenderTarget, layer: u32) {
            self.world.draw(target, layer);
        }

        fn world(&self) -> &Rc<World> {
            &self.world
        }
    }

    #[derive(Default)]
    struct RecordingTarget {
        views: Vec<View>,
    }

    impl RenderTarget for RecordingTarget {
        fn set_view(&mut self, view: &View) {
            self.views.push(*view);
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn game_engine(counters: &Counters, exit_after: u32) -> EngineBuilder {
        let counters = counters.clone();
        EngineBuilder::new()
            .with_initial_state("game")
            .register_system("Mover", |_| Box::new(Mover))
            .register_state("game", move |world| {
                Box::new(Game {
                    world,
                    counters: counters.clone(),
                    exit_after,
                    connections: None,
                })
            })
    }

    fn player_x(engine: &Engine) -> f64 {
        let world = engine.states().world("game").unwrap();
        let player = world.entities().get_entity("player").unwrap();
        let component = player.get_component(POSITION).unwrap();
        let component = component.borrow();
        component.downcast_ref::<PositionComponent>().unwrap().x()
    }

    const DELTA: Duration = Duration::from_millis(16);

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = EngineBuilder::new();
        assert_eq!(builder.config, EngineConfig::default());
    }

    #[test]
    fn builder_with_config_applies_valid_settings() {
        let config = EngineConfig {
            tps: 30.0,
            draw_layers: 3,
            ..EngineConfig::default()
        };

        let builder = EngineBuilder::new().with_config(config.clone()).unwrap();
        assert_eq!(builder.config, config);
    }

    #[test]
    fn builder_with_config_rejects_zero_tps() {
        let config = EngineConfig {
            tps: 0.0,
            ..EngineConfig::default()
        };

        let result = EngineBuilder::new().with_config(config);
        assert!(matches!(result, Err(ConfigError::Invalid { field: "tps", .. })));
    }

    #[test]
    fn builder_with_config_rejects_zero_input_capacity() {
        let config = EngineConfig {
            input_capacity: 0,
            ..EngineConfig::default()
        };

        let result = EngineBuilder::new().with_config(config);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "input_capacity", .. })
        ));
    }

    #[test]
    fn builder_with_tps() {
        let builder = EngineBuilder::new().with_tps(120.0);
        assert_eq!(builder.config.tps, 120.0);
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn builder_with_tps_panics_on_zero() {
        EngineBuilder::new().with_tps(0.0);
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn builder_with_tps_panics_on_negative() {
        EngineBuilder::new().with_tps(-60.0);
    }

    #[test]
    #[should_panic(expected = "Input capacity must be positive")]
    fn builder_with_input_capacity_panics_on_zero() {
        EngineBuilder::new().with_input_capacity(0);
    }

    #[test]
    fn builder_registers_builtins_and_normalizes_systems() {
        let engine = EngineBuilder::new()
            .register_system("Mover", |_| Box::new(Mover))
            .build();

        assert!(engine.context().components().contains(POSITION));
        assert!(engine.context().systems().contains("mover"));
    }

    #[test]
    fn build_enters_initial_state() {
        let counters = Counters::default();
        let engine = game_engine(&counters, 0).build();

        assert_eq!(engine.states().current_state(), Some("game"));
        assert_eq!(engine.events().active_state(), "game");
    }

    #[test]
    fn unknown_initial_state_leaves_stack_empty() {
        let mut engine = EngineBuilder::new().with_initial_state("missing").build();

        assert!(engine.states().is_empty());
        assert_eq!(
            engine.frame(DELTA, &mut RecordingTarget::default()),
            TickControl::Exit
        );
    }

    //=====================================================================
    // Frame Tests
    //=====================================================================

    #[test]
    fn frame_updates_and_draws_each_layer() {
        let counters = Counters::default();
        let mut engine = game_engine(&counters, 0).with_draw_layers(2).build();
        let mut target = RecordingTarget::default();

        assert_eq!(engine.frame(DELTA, &mut target), TickControl::Continue);
        assert_eq!(engine.frame(DELTA, &mut target), TickControl::Continue);

        assert_eq!(counters.frames.get(), 2);
        assert_eq!(player_x(&engine), 2.0);
        assert_eq!(target.views.len(), 4);
    }

    #[test]
    fn input_events_reach_state_listeners() {
        let counters = Counters::default();
        let mut engine = game_engine(&counters, 0).build();
        let sender = engine.input_sender();

        sender.send("jump", json!(null));
        sender.send("jump", json!({ "height": 2 }));
        engine.frame(DELTA, &mut RecordingTarget::default());

        assert_eq!(counters.jumps.get(), 2);
    }

    #[test]
    fn quit_message_stops_after_dispatch() {
        let counters = Counters::default();
        let mut engine = game_engine(&counters, 0).build();
        let sender = engine.input_sender();

        sender.send("jump", json!(null));
        sender.quit();

        assert_eq!(
            engine.frame(DELTA, &mut RecordingTarget::default()),
            TickControl::Exit
        );
        assert_eq!(counters.jumps.get(), 1);
        assert_eq!(counters.frames.get(), 0);
    }

    #[test]
    fn state_requests_apply_at_end_of_frame() {
        let counters = Counters::default();
        let mut engine = game_engine(&counters, 0).build();

        engine.context().requests().remove("game");
        assert_eq!(
            engine.frame(DELTA, &mut RecordingTarget::default()),
            TickControl::Exit
        );
        assert!(engine.states().is_empty());
        assert_eq!(counters.frames.get(), 1);
    }

    #[test]
    fn run_stops_when_a_state_requests_exit() {
        let counters = Counters::default();
        let mut engine = game_engine(&counters, 3).with_tps(1000.0).build();

        engine.run(&mut RecordingTarget::default());

        assert_eq!(counters.frames.get(), 3);
        assert_eq!(player_x(&engine), 3.0);
        assert!(engine.context().is_exit_requested());
    }
}
