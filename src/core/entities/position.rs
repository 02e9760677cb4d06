//=========================================================================
// Position Component
//=========================================================================
//
// Built-in `position` component: a 2D point with `x` and `y` members.
//
// Accepts `[x, y]` or `{ "x": .., "y": .. }` as description.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;

use log::warn;

//=== Internal Dependencies ===============================================

use super::Component;
use crate::core::variables::{Member, VariableStorage};
use crate::core::InitData;

//=== PositionComponent ===================================================

/// Registry name of [`PositionComponent`].
pub const POSITION: &str = "position";

#[derive(Debug)]
pub struct PositionComponent {
    x: Member<f64>,
    y: Member<f64>,
    variables: VariableStorage,
}

impl PositionComponent {
    /// Creates a position at the origin.
    pub fn new() -> Self {
        let x = Member::default();
        let y = Member::default();
        let mut variables = VariableStorage::new(format!("Component {}", POSITION));
        variables.register_member("x", &x);
        variables.register_member("y", &y);
        Self { x, y, variables }
    }

    /// Returns the horizontal coordinate.
    pub fn x(&self) -> f64 {
        self.x.get()
    }

    /// Returns the vertical coordinate.
    pub fn y(&self) -> f64 {
        self.y.get()
    }

    /// Moves to an absolute position.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x.replace(x);
        self.y.replace(y);
    }

    /// Moves by a relative offset.
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        *self.x.borrow_mut() += dx;
        *self.y.borrow_mut() += dy;
    }
}

impl Default for PositionComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for PositionComponent {
    fn create(&mut self, init: &InitData) {
        let coordinates = match init {
            InitData::Null => return,
            InitData::Array(items) if items.len() == 2 => (items[0].as_f64(), items[1].as_f64()),
            InitData::Object(map) => (
                map.get("x").and_then(InitData::as_f64),
                map.get("y").and_then(InitData::as_f64),
            ),
            _ => (None, None),
        };

        match coordinates {
            (Some(x), Some(y)) => self.set_position(x, y),
            _ => warn!(
                "Component {}: expected [x, y] or {{\"x\", \"y\"}}, got {}",
                POSITION, init
            ),
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
