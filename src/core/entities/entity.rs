//=========================================================================
// Entity
//=========================================================================
//
// A typed bag of uniquely named components.
//
// Entities are shared (`Rc`) between the entity manager, the systems that
// admitted them and events that reference them. Identity is pointer
// identity of that shared handle.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use log::warn;

//=== Internal Dependencies ===============================================

use super::component::{instantiate, ComponentPtr, ComponentRegistry};
use crate::core::InitData;

//=== Entity ==============================================================

/// Shared entity handle.
pub type EntityPtr = Rc<Entity>;

pub struct Entity {
    type_name: String,
    components: RefCell<BTreeMap<String, ComponentPtr>>,
    registry: Rc<ComponentRegistry>,
}

impl Entity {
    //--- Construction -----------------------------------------------------

    /// Creates an entity with no components.
    pub fn new(type_name: impl Into<String>, registry: Rc<ComponentRegistry>) -> Self {
        Self {
            type_name: type_name.into(),
            components: RefCell::new(BTreeMap::new()),
            registry,
        }
    }

    /// Returns the entity type given at creation.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    //--- Components -------------------------------------------------------

    /// Adds a component created with no description.
    pub fn add_component(&self, component_type: &str) -> Option<ComponentPtr> {
        self.add_component_with(component_type, &InitData::Null)
    }

    /// Adds a component and initializes it from `init`.
    ///
    /// Returns `None` if the entity already has a component of this type.
    /// The existing component is left untouched.
    pub fn add_component_with(&self, component_type: &str, init: &InitData) -> Option<ComponentPtr> {
        if self.has_component(component_type) {
            warn!(
                "Entity {}: a {} component is already present",
                self.type_name, component_type
            );
            return None;
        }

        let mut component = instantiate(&self.registry, component_type);
        component.create(init);

        let component = Rc::new(RefCell::new(component));
        self.components
            .borrow_mut()
            .insert(component_type.to_owned(), Rc::clone(&component));
        Some(component)
    }

    /// Returns true if a component of this type is present.
    pub fn has_component(&self, component_type: &str) -> bool {
        self.components.borrow().contains_key(component_type)
    }

    /// Returns the component of this type, if present.
    pub fn get_component(&self, component_type: &str) -> Option<ComponentPtr> {
        self.components.borrow().get(component_type).cloned()
    }

    /// Removes a component. Systems that already admitted the entity keep
    /// it.
    pub fn remove_component(&self, component_type: &str) -> Option<ComponentPtr> {
        self.components.borrow_mut().remove(component_type)
    }

    /// Component type names, sorted.
    pub fn component_names(&self) -> Vec<String> {
        self.components.borrow().keys().cloned().collect()
    }

    /// Returns the number of components.
    pub fn len(&self) -> usize {
        self.components.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.borrow().is_empty()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("type_name", &self.type_name)
            .field("components", &self.component_names())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entities::{PositionComponent, POSITION};
    use serde_json::json;

    fn registry() -> Rc<ComponentRegistry> {
        let mut registry = ComponentRegistry::new("Component");
        registry.register(POSITION, |()| Box::new(PositionComponent::new()));
        Rc::new(registry)
    }

    #[test]
    fn duplicate_component_is_refused() {
        let entity = Entity::new("player", registry());

        assert!(entity.add_component(POSITION).is_some());
        assert!(entity.add_component(POSITION).is_none());
        assert_eq!(entity.len(), 1);
    }

    #[test]
    fn duplicate_does_not_overwrite_data() {
        let entity = Entity::new("player", registry());
        entity.add_component_with(POSITION, &json!([1, 2]));
        entity.add_component_with(POSITION, &json!([9, 9]));

        let component = entity.get_component(POSITION).unwrap();
        let component = component.borrow();
        let position = component.downcast_ref::<PositionComponent>().unwrap();
        assert_eq!((position.x(), position.y()), (1.0, 2.0));
    }

    #[test]
    fn unknown_type_becomes_extern_component() {
        let entity = Entity::new("player", registry());
        entity.add_component_with("health", &json!({ "hp": 10 }));

        let component = entity.get_component("health").unwrap();
        assert_eq!(component.borrow().get::<i64>("hp"), (10, true));
    }

    #[test]
    fn component_names_are_sorted() {
        let entity = Entity::new("player", registry());
        entity.add_component("sprite");
        entity.add_component(POSITION);
        entity.add_component("health");

        assert_eq!(entity.component_names(), vec!["health", "position", "sprite"]);
    }

    #[test]
    fn remove_component() {
        let entity = Entity::new("player", registry());
        entity.add_component(POSITION);

        assert!(entity.remove_component(POSITION).is_some());
        assert!(!entity.has_component(POSITION));
        assert!(entity.is_empty());
    }
}
