//=========================================================================
// Entity Manager
//=========================================================================
//
// Owns the entities of one world and keeps the world's systems informed
// of entity creation and removal.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::{ComponentRegistry, Entity, EntityPtr};
use crate::core::systems::SystemManager;
use crate::core::InitData;

//=== EntityManager =======================================================

/// Entity list of a single world.
///
/// Every operation takes `&self` so systems and event callbacks can spawn
/// or remove entities while the world is running.
pub struct EntityManager {
    entities: RefCell<Vec<EntityPtr>>,
    systems: Rc<SystemManager>,
    components: Rc<ComponentRegistry>,
}

impl EntityManager {
    /// Creates an empty manager feeding `systems`.
    pub fn new(systems: Rc<SystemManager>, components: Rc<ComponentRegistry>) -> Self {
        Self {
            entities: RefCell::new(Vec::new()),
            systems,
            components,
        }
    }

    //--- Creation ---------------------------------------------------------

    /// Creates an empty entity. It is not offered to systems until
    /// [`register_entity`](Self::register_entity) is called.
    pub fn add_entity(&self, type_name: &str) -> EntityPtr {
        let entity = Rc::new(Entity::new(type_name, Rc::clone(&self.components)));
        self.entities.borrow_mut().push(Rc::clone(&entity));
        debug!("EntityManager: added entity {}", type_name);
        entity
    }

    /// Creates an entity from a `{ component: description }` object and
    /// registers it with the systems.
    pub fn add_entity_with(&self, type_name: &str, description: &InitData) -> EntityPtr {
        let entity = self.add_entity(type_name);

        match description {
            InitData::Object(components) => {
                for (component_type, init) in components {
                    entity.add_component_with(component_type, init);
                }
            }
            InitData::Null => {}
            other => warn!(
                "EntityManager: entity {} expects an object of components, got {}",
                type_name, other
            ),
        }

        self.register_entity(&entity);
        entity
    }

    /// Offers an entity to every system. Returns true if at least one
    /// system admitted it.
    pub fn register_entity(&self, entity: &EntityPtr) -> bool {
        let admitted = self.systems.add_entity(entity);
        if !admitted {
            debug!(
                "EntityManager: no system admitted entity {}",
                entity.type_name()
            );
        }
        admitted
    }

    //--- Removal ----------------------------------------------------------

    /// Removes an entity from every system, then from this manager.
    pub fn remove_entity(&self, entity: &EntityPtr) -> bool {
        self.systems.remove_entity(entity);

        let mut entities = self.entities.borrow_mut();
        match entities.iter().position(|e| Rc::ptr_eq(e, entity)) {
            Some(index) => {
                entities.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes every entity, from the systems first.
    pub fn clear(&self) {
        for entity in self.entities() {
            self.remove_entity(&entity);
        }
    }

    //--- Queries ----------------------------------------------------------

    /// First entity of `type_name`, in insertion order.
    pub fn get_entity(&self, type_name: &str) -> Option<EntityPtr> {
        self.get_entity_with(type_name, &[])
    }

    /// First entity of `type_name` that has every `required` component.
    pub fn get_entity_with(&self, type_name: &str, required: &[&str]) -> Option<EntityPtr> {
        self.entities
            .borrow()
            .iter()
            .find(|entity| {
                entity.type_name() == type_name
                    && required.iter().all(|c| entity.has_component(c))
            })
            .cloned()
    }

    /// Snapshot of the entity list.
    pub fn entities(&self) -> Vec<EntityPtr> {
        self.entities.borrow().clone()
    }

    /// Returns the number of entities.
    pub fn len(&self) -> usize {
        self.entities.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.borrow().is_empty()
    }
}

impl fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityManager")
            .field("entities", &self.entities.borrow().len())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
