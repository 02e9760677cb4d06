//=========================================================================
// System Manager
//=========================================================================
//
// Ordered set of named systems of one world, with their admitted entities.
//
// Architecture:
//   slots: [SystemSlot] in registration order
//   update(): snapshot slots → for each: borrow system → update(frame)
//   draw():   snapshot slots → for each graphical system: draw(layer)
//
// Every operation takes `&self`. A system can add or remove entities and
// systems of its own world while it is being updated. An entity offered
// to the system that is currently running is admitted once that system's
// update returns.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::{System, SystemArgs, SystemFrame, EXTERN_SYSTEM};
use crate::core::context::Context;
use crate::core::entities::EntityPtr;
use crate::core::error::SystemError;
use crate::core::states::World;
use crate::core::view::{RenderTarget, View};

//=== SystemSlot ==========================================================

struct SystemSlot {
    name: String,
    system: RefCell<Box<dyn System>>,
    entities: RefCell<Vec<EntityPtr>>,
    /// Entities offered while the system was running.
    pending: RefCell<Vec<EntityPtr>>,
}

impl SystemSlot {
    fn admit(&self, system: &dyn System, entity: &EntityPtr) -> bool {
        if !system.check_components(entity) {
            return false;
        }
        let mut entities = self.entities.borrow_mut();
        if !entities.iter().any(|e| Rc::ptr_eq(e, entity)) {
            entities.push(Rc::clone(entity));
        }
        true
    }

    fn admit_pending(&self) {
        let pending = self.pending.take();
        if pending.is_empty() {
            return;
        }
        let system = self.system.borrow();
        for entity in &pending {
            self.admit(&**system, entity);
        }
    }

    fn release(&self, entity: &EntityPtr) -> bool {
        let mut removed = false;
        for list in [&self.entities, &self.pending] {
            let mut list = list.borrow_mut();
            let before = list.len();
            list.retain(|e| !Rc::ptr_eq(e, entity));
            removed |= list.len() != before;
        }
        removed
    }
}

//=== SystemManager =======================================================

pub struct SystemManager {
    state: String,
    context: Rc<Context>,
    slots: RefCell<Vec<Rc<SystemSlot>>>,
    view: Cell<View>,
}

impl SystemManager {
    //--- Construction -----------------------------------------------------

    /// Creates an empty manager for the world of `state`.
    pub fn new(state: impl Into<String>, context: Rc<Context>) -> Self {
        Self {
            state: state.into(),
            context,
            slots: RefCell::new(Vec::new()),
            view: Cell::new(View::default()),
        }
    }

    //--- System Set -------------------------------------------------------

    /// Constructs and appends the system registered as `name`.
    ///
    /// Names are case-insensitive. Adding a name already present fails, as
    /// does the reserved name `extern`.
    pub fn add_system(&self, name: &str) -> Result<(), SystemError> {
        let name = name.to_lowercase();

        let result = if name == EXTERN_SYSTEM {
            Err(SystemError::Reserved(name))
        } else if self.has_system(&name) {
            Err(SystemError::Duplicate(name))
        } else {
            let args = SystemArgs {
                context: Rc::clone(&self.context),
                state: self.state.clone(),
            };
            match self.context.systems().construct(&name, args) {
                Some(system) => {
                    debug!("SystemManager {}: added system {}", self.state, name);
                    self.slots.borrow_mut().push(Rc::new(SystemSlot {
                        name,
                        system: RefCell::new(system),
                        entities: RefCell::new(Vec::new()),
                        pending: RefCell::new(Vec::new()),
                    }));
                    Ok(())
                }
                None => Err(SystemError::Unknown(name)),
            }
        };

        if let Err(e) = &result {
            warn!("SystemManager {}: add_system failed: {}", self.state, e);
        }
        result
    }

    /// Replaces the system set with `names`, in order.
    ///
    /// All or nothing: if any system cannot be added, the set is left
    /// empty and the error is returned.
    pub fn load_systems<S: AsRef<str>>(&self, names: &[S]) -> Result<(), SystemError> {
        self.clear();
        for name in names {
            if let Err(e) = self.add_system(name.as_ref()) {
                self.clear();
                return Err(e);
            }
        }
        info!(
            "SystemManager {}: loaded {} system(s)",
            self.state,
            names.len()
        );
        Ok(())
    }

    /// Removes the system `name`. Returns false if it was not loaded.
    pub fn remove_system(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        let mut slots = self.slots.borrow_mut();
        match slots.iter().position(|slot| slot.name == name) {
            Some(index) => {
                slots.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes every system.
    pub fn clear(&self) {
        self.slots.borrow_mut().clear();
    }

    //--- Entity Routing ---------------------------------------------------

    /// Offers `entity` to every system. Returns true if at least one
    /// system admitted it.
    ///
    /// A system that is running defers its decision until its update
    /// returns. Such a deferred offer does not count as an admission here.
    pub fn add_entity(&self, entity: &EntityPtr) -> bool {
        let mut admitted = false;
        for slot in self.snapshot() {
            match slot.system.try_borrow() {
                Ok(system) => admitted |= slot.admit(&**system, entity),
                Err(_) => {
                    debug!(
                        "SystemManager {}: {} is running, admission of {} is deferred",
                        self.state,
                        slot.name,
                        entity.type_name()
                    );
                    slot.pending.borrow_mut().push(Rc::clone(entity));
                }
            }
        }
        admitted
    }

    /// Removes `entity` from every system. Returns true if any system held
    /// it.
    pub fn remove_entity(&self, entity: &EntityPtr) -> bool {
        self.snapshot()
            .iter()
            .fold(false, |removed, slot| slot.release(entity) | removed)
    }

    //--- Frame ------------------------------------------------------------

    /// Updates every system once, in registration order.
    ///
    /// Each system starts from the current shared view. A view changed
    /// through [`SystemFrame::view`] or [`set_view`](Self::set_view) is
    /// seen by every later system.
    pub fn update(&self, delta: Duration, world: &World) {
        for slot in self.snapshot() {
            let succeeded = {
                let Ok(mut system) = slot.system.try_borrow_mut() else {
                    warn!(
                        "SystemManager {}: {} is already running, skipped",
                        self.state, slot.name
                    );
                    continue;
                };
                let entities = slot.entities.borrow().clone();
                let start = self.view.get();
                let mut view = start;
                let mut frame = SystemFrame {
                    delta,
                    view: &mut view,
                    entities: &entities,
                    world,
                };
                let succeeded = system.update(&mut frame);
                // An untouched frame view must not undo a set_view made
                // during the update.
                if view != start {
                    self.view.set(view);
                }
                succeeded
            };

            if !succeeded {
                warn!(
                    "SystemManager {}: update of {} reported a failure",
                    self.state, slot.name
                );
            }
            slot.admit_pending();
        }
    }

    /// Draws `layer` with every graphical system.
    pub fn draw(&self, target: &mut dyn RenderTarget, layer: u32) {
        let view = self.view.get();
        target.set_view(&view);

        for slot in self.snapshot() {
            let Ok(mut system) = slot.system.try_borrow_mut() else {
                continue;
            };
            if let Some(graphical) = system.as_graphical() {
                let entities = slot.entities.borrow().clone();
                graphical.draw(target, layer, &view, &entities);
            }
        }
    }

    //--- View -------------------------------------------------------------

    /// Returns the shared view.
    pub fn view(&self) -> View {
        self.view.get()
    }

    /// Replaces the shared view.
    pub fn set_view(&self, view: View) {
        self.view.set(view);
    }

    //--- Queries ----------------------------------------------------------

    /// Returns true if the system `name` is loaded.
    pub fn has_system(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.slots.borrow().iter().any(|slot| slot.name == name)
    }

    /// Runs `f` on the system `name`. Returns `None` if it does not exist
    /// or is currently running.
    pub fn with_system<R>(&self, name: &str, f: impl FnOnce(&mut dyn System) -> R) -> Option<R> {
        let slot = self.find(name)?;
        let mut system = slot.system.try_borrow_mut().ok()?;
        Some(f(&mut **system))
    }

    /// Entities admitted by the system `name`.
    pub fn entities_of(&self, name: &str) -> Option<Vec<EntityPtr>> {
        self.find(name).map(|slot| slot.entities.borrow().clone())
    }

    /// System names in registration order.
    pub fn system_names(&self) -> Vec<String> {
        self.slots.borrow().iter().map(|slot| slot.name.clone()).collect()
    }

    /// Returns the number of loaded systems.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    //--- Internal Helpers -------------------------------------------------

    fn snapshot(&self) -> Vec<Rc<SystemSlot>> {
        self.slots.borrow().clone()
    }

    fn find(&self, name: &str) -> Option<Rc<SystemSlot>> {
        let name = name.to_lowercase();
        self.slots.borrow().iter().find(|slot| slot.name == name).cloned()
    }
}

impl fmt::Debug for SystemManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemManager")
            .field("state", &self.state)
            .field("systems", &self.system_names())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::Registries;
    use crate::core::entities::Entity;
    use crate::core::systems::GraphicalSystem;
    use serde_json::json;
    use std::any::Any;

    type Log = Rc<RefCell<Vec<String>>>;

    //--- Test Doubles -----------------------------------------------------

    /// Requires one component and records each update.
    struct Recorder {
        name: &'static str,
        requires: &'static str,
        log: Log,
        succeed: bool,
    }

    impl System for Recorder {
        fn check_components(&self, entity: &Entity) -> bool {
            entity.has_component(self.requires)
        }

        fn update(&mut self, frame: &mut SystemFrame<'_>) -> bool {
            self.log.borrow_mut().push(format!(
                "{}:{}:{}",
                self.name,
                frame.entities.len(),
                frame.view.center.0
            ));
            self.succeed
        }
    }

    /// Pans the view and spawns one bullet per frame.
    struct Spawner;

    impl System for Spawner {
        fn check_components(&self, entity: &Entity) -> bool {
            entity.has_component("position")
        }

        fn update(&mut self, frame: &mut SystemFrame<'_>) -> bool {
            frame.view.move_by(10.0, 0.0);
            frame
                .world
                .entities()
                .add_entity_with("bullet", &json!({ "position": [0, 0] }));
            true
        }
    }

    /// Moves the camera through the manager instead of the frame.
    struct Camera;

    impl System for Camera {
        fn check_components(&self, _entity: &Entity) -> bool {
            false
        }

        fn update(&mut self, frame: &mut SystemFrame<'_>) -> bool {
            frame
                .world
                .systems()
                .set_view(View::new((1.0, 1.0), (10.0, 10.0)));
            true
        }
    }

    struct Painter {
        log: Log,
    }

    impl System for Painter {
        fn check_components(&self, _entity: &Entity) -> bool {
            true
        }

        fn update(&mut self, _frame: &mut SystemFrame<'_>) -> bool {
            true
        }

        fn as_graphical(&mut self) -> Option<&mut dyn GraphicalSystem> {
            Some(self)
        }
    }

    impl GraphicalSystem for Painter {
        fn draw(&mut self, _target: &mut dyn RenderTarget, layer: u32, _view: &View, entities: &[EntityPtr]) {
            self.log
                .borrow_mut()
                .push(format!("draw:{}:{}", layer, entities.len()));
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

    fn world(log: &Log) -> Rc<World> {
        let mut registries = Registries::new();
        for (name, requires, succeed) in [
            ("physics", "position", true),
            ("render", "sprite", true),
            ("broken", "position", false),
        ] {
            let log = Rc::clone(log);
            registries.systems.register(name, move |_| {
                Box::new(Recorder {
                    name,
                    requires,
                    log: Rc::clone(&log),
                    succeed,
                })
            });
        }
        registries.systems.register("spawner", |_| Box::new(Spawner));
        registries.systems.register("camera", |_| Box::new(Camera));
        let painter_log = Rc::clone(log);
        registries.systems.register("painter", move |_| {
            Box::new(Painter {
                log: Rc::clone(&painter_log),
            })
        });

        World::new("game", Context::new(registries))
    }

    //--- System Set Tests -------------------------------------------------

    #[test]
    fn add_system_normalizes_and_rejects_duplicates() {
        let log = Log::default();
        let world = world(&log);
        let systems = world.systems();

        assert_eq!(systems.add_system("Physics"), Ok(()));
        assert_eq!(
            systems.add_system("PHYSICS"),
            Err(SystemError::Duplicate("physics".to_owned()))
        );
        assert!(systems.has_system("physics"));
        assert_eq!(systems.len(), 1);
    }

    #[test]
    fn mixed_case_registration_can_be_added() {
        let log = Log::default();
        let mut registries = Registries::new();
        let recorder_log = Rc::clone(&log);
        registries.systems.register("Physics", move |_| {
            Box::new(Recorder {
                name: "physics",
                requires: "position",
                log: Rc::clone(&recorder_log),
                succeed: true,
            })
        });
        let world = World::new("game", Context::new(registries));

        assert_eq!(world.systems().add_system("Physics"), Ok(()));
        assert_eq!(
            world.systems().add_system("physics"),
            Err(SystemError::Duplicate("physics".to_owned()))
        );
        assert_eq!(world.systems().system_names(), vec!["physics"]);
    }

    #[test]
    fn add_system_rejects_unknown_and_extern() {
        let log = Log::default();
        let world = world(&log);

        assert_eq!(
            world.systems().add_system("audio"),
            Err(SystemError::Unknown("audio".to_owned()))
        );
        assert_eq!(
            world.systems().add_system("Extern"),
            Err(SystemError::Reserved("extern".to_owned()))
        );
        assert!(world.systems().is_empty());
    }

    #[test]
    fn load_systems_is_all_or_nothing() {
        let log = Log::default();
        let world = world(&log);
        let systems = world.systems();
        systems.add_system("render").unwrap();

        let result = systems.load_systems(&["physics", "invalid"]);

        assert_eq!(result, Err(SystemError::Unknown("invalid".to_owned())));
        assert!(systems.is_empty());
    }

    #[test]
    fn load_systems_replaces_set_in_order() {
        let log = Log::default();
        let world = world(&log);
        let systems = world.systems();
        systems.add_system("spawner").unwrap();

        systems.load_systems(&["render", "physics"]).unwrap();

        assert_eq!(systems.system_names(), vec!["render", "physics"]);
    }

    #[test]
    fn remove_system() {
        let log = Log::default();
        let world = world(&log);
        world.systems().load_systems(&["render", "physics"]).unwrap();

        assert!(world.systems().remove_system("Render"));
        assert!(!world.systems().remove_system("render"));
        assert_eq!(world.systems().system_names(), vec!["physics"]);
    }

    //--- Routing Tests ----------------------------------------------------

    #[test]
    fn entity_is_admitted_by_capability() {
        let log = Log::default();
        let world = world(&log);
        world.systems().load_systems(&["physics", "render"]).unwrap();

        let both = world.entities().add_entity_with("player", &json!({
            "position": [0, 0],
            "sprite": {},
        }));
        let ghost = world.entities().add_entity("ghost");

        assert_eq!(world.systems().entities_of("physics").unwrap().len(), 1);
        assert_eq!(world.systems().entities_of("render").unwrap().len(), 1);
        assert!(!world.systems().add_entity(&ghost));

        assert!(world.systems().remove_entity(&both));
        assert!(!world.systems().remove_entity(&both));
    }

    //--- Frame Tests ------------------------------------------------------

    #[test]
    fn update_runs_in_registration_order() {
        let log = Log::default();
        let world = world(&log);
        world.systems().load_systems(&["render", "physics"]).unwrap();
        world.entities().add_entity_with("rock", &json!({ "position": [0, 0] }));

        world.update(Duration::from_millis(16));

        assert_eq!(*log.borrow(), vec!["render:0:400", "physics:1:400"]);
    }

    #[test]
    fn view_changes_reach_later_systems() {
        let log = Log::default();
        let world = world(&log);
        world.systems().load_systems(&["spawner", "physics"]).unwrap();

        world.update(Duration::from_millis(16));

        assert_eq!(log.borrow()[0], "physics:1:410");
        assert_eq!(world.systems().view().center.0, 410.0);
    }

    #[test]
    fn set_view_during_update_is_kept() {
        let log = Log::default();
        let world = world(&log);
        world.systems().load_systems(&["camera", "physics"]).unwrap();

        world.update(Duration::from_millis(16));

        assert_eq!(log.borrow()[0], "physics:0:1");
        assert_eq!(world.systems().view(), View::new((1.0, 1.0), (10.0, 10.0)));
    }

    #[test]
    fn frame_view_change_overrides_earlier_set_view() {
        let log = Log::default();
        let world = world(&log);
        world.systems().load_systems(&["camera", "spawner", "physics"]).unwrap();

        world.update(Duration::from_millis(16));

        assert_eq!(log.borrow()[0], "physics:1:11");
        assert_eq!(world.systems().view().center, (11.0, 1.0));
    }

    #[test]
    fn running_system_admits_spawned_entity_after_update() {
        let log = Log::default();
        let world = world(&log);
        world.systems().load_systems(&["spawner", "physics"]).unwrap();

        world.update(Duration::from_millis(16));
        assert_eq!(world.systems().entities_of("spawner").unwrap().len(), 1);

        world.update(Duration::from_millis(16));
        assert_eq!(world.systems().entities_of("spawner").unwrap().len(), 2);
        assert_eq!(world.entities().len(), 2);
    }

    #[test]
    fn failed_update_does_not_stop_the_frame() {
        let log = Log::default();
        let world = world(&log);
        world.systems().load_systems(&["broken", "render"]).unwrap();

        world.update(Duration::from_millis(16));

        assert_eq!(*log.borrow(), vec!["broken:0:400", "render:0:400"]);
    }

    #[test]
    fn draw_reaches_graphical_systems_only() {
        let log = Log::default();
        let world = world(&log);
        world.systems().load_systems(&["physics", "painter"]).unwrap();
        world.entities().add_entity_with("rock", &json!({ "position": [0, 0] }));

        let mut target = RecordingTarget::default();
        world.systems().draw(&mut target, 0);
        world.systems().draw(&mut target, 1);

        assert_eq!(*log.borrow(), vec!["draw:0:1", "draw:1:1"]);
        assert_eq!(target.views, vec![View::default(), View::default()]);
    }

    #[test]
    fn with_system_gives_access() {
        let log = Log::default();
        let world = world(&log);
        world.systems().add_system("physics").unwrap();

        let rock = world.entities().add_entity("rock");
        let admits = world
            .systems()
            .with_system("physics", |system| system.check_components(&rock));

        assert_eq!(admits, Some(false));
        assert!(world.systems().with_system("render", |_| ()).is_none());
    }
}
