//=========================================================================
// Component
//=========================================================================
//
// Component trait, the component registry alias and the generic
// description-backed fallback used for unregistered component types.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::registry::RegisterClass;
use crate::core::variables::{Value, Variable, VariableStorage};
use crate::core::InitData;

//=== Component Trait =====================================================

/// A named piece of entity data.
///
/// Implementations bind their fields as members of the storage returned
/// by [`Component::variables`] so scripts and descriptions can address
/// them by name.
pub trait Component: Any {
    /// Initializes the component from its description. Called exactly once,
    /// with `InitData::Null` when no description was given.
    fn create(&mut self, init: &InitData);

    fn variables(&self) -> &VariableStorage;

    fn variables_mut(&mut self) -> &mut VariableStorage;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Component {
    /// Returns the concrete component, if it is a `T`.
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutable variant of [`downcast_ref`](Self::downcast_ref).
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Reads a variable of this component. See [`VariableStorage::get`].
    pub fn get<T: Variable>(&self, name: &str) -> (T, bool) {
        self.variables().get(name)
    }

    /// Writes a variable of this component. See [`VariableStorage::set`].
    pub fn set<V: Into<Value>>(&mut self, name: &str, value: V) {
        self.variables_mut().set(name, value);
    }
}

/// Shared handle to a component stored on an entity.
pub type ComponentPtr = Rc<RefCell<Box<dyn Component>>>;

/// Component constructors by type name.
pub type ComponentRegistry = RegisterClass<dyn Component>;

/// Builds `component_type`, falling back to an [`ExternComponent`].
pub(crate) fn instantiate(registry: &ComponentRegistry, component_type: &str) -> Box<dyn Component> {
    registry.construct(component_type, ()).unwrap_or_else(|| {
        debug!(
            "Component {} is not registered, using an extern component",
            component_type
        );
        Box::new(ExternComponent::new(component_type))
    })
}

//=== ExternComponent =====================================================

/// Component with no native fields. Every attribute of its description
/// lands in a free slot.
#[derive(Debug)]
pub struct ExternComponent {
    variables: VariableStorage,
}

impl ExternComponent {
    /// Creates an empty extern component of type `component_type`.
    pub fn new(component_type: &str) -> Self {
        Self {
            variables: VariableStorage::new(format!("Component {}", component_type)),
        }
    }
}

impl Component for ExternComponent {
    fn create(&mut self, init: &InitData) {
        match init {
            InitData::Object(_) | InitData::Null => self.variables.load_from_json(init),
            other => self.variables.set("value", Value::from_json(other)),
        }
    }

    fn variables(&self) -> &VariableStorage {
        &self.variables
    }

    fn variables_mut(&mut self) -> &mut VariableStorage {
        &mut self.variables
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
