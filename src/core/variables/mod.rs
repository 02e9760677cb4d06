//=========================================================================
// Variable Storage
//=========================================================================
//
// Named, type-checked attribute bag shared by components and events.
//
// A name is either a registered member (bound to a caller-owned
// `Member<T>`) or a free slot holding whatever was last set. Writes to a
// member go through the widening table, and incompatible writes are
// logged and ignored.
//
//=========================================================================

//=== Module Declarations =================================================

mod value;

//=== External Dependencies ===============================================

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, warn};
use serde_json::Value as Json;

//=== Internal Dependencies ===============================================

use value::MemberBinding;

//=== Public API ==========================================================

pub use value::{Member, Value, ValueKind, Variable};

//=== VariableStorage =====================================================

/// Named attribute registry with runtime type compatibility checks.
///
/// # Examples
///
/// ```
/// use keystone_engine::core::variables::{Member, VariableStorage};
///
/// let hp = Member::new(0i64);
/// let mut vars = VariableStorage::new("Component health");
/// vars.register_member("hp", &hp);
///
/// vars.set("hp", 18i64);
/// assert_eq!(hp.get(), 18);
///
/// vars.set("hp", 4.5f32); // rejected, floats never narrow
/// assert_eq!(vars.get::<i64>("hp"), (18, true));
/// ```
pub struct VariableStorage {
    owner: String,
    members: BTreeMap<String, Box<dyn MemberBinding>>,
    free: BTreeMap<String, Value>,
}

impl VariableStorage {
    //--- Construction -----------------------------------------------------

    /// Creates an empty storage. `owner` prefixes every log line.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            members: BTreeMap::new(),
            free: BTreeMap::new(),
        }
    }

    /// Returns the owner prefix used in log lines.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    //--- Registration -----------------------------------------------------

    /// Binds `name` to a caller-owned member.
    ///
    /// A previous binding under the same name is replaced with a warning.
    /// A free slot with the same name is erased.
    pub fn register_member<T: Variable>(&mut self, name: &str, member: &Member<T>) {
        if self.members.contains_key(name) {
            warn!(
                "{}: register_member: {} is already used, the previous binding is replaced",
                self.owner, name
            );
        }
        self.free.remove(name);
        self.members.insert(name.to_owned(), Box::new(member.clone()));
    }

    //--- Writes -----------------------------------------------------------

    /// Sets `name` from any value convertible into a [`Value`].
    pub fn set<V: Into<Value>>(&mut self, name: &str, value: V) {
        self.set_value(name, value.into());
    }

    /// Sets `name` from an already tagged value.
    pub fn set_value(&mut self, name: &str, value: Value) {
        let Some(binding) = self.members.get(name) else {
            self.free.insert(name.to_owned(), value);
            return;
        };

        let target = binding.kind();
        match value.widen_to(target) {
            Some(widened) => {
                if !binding.store(widened) {
                    warn!(
                        "{}: set {}: the member is borrowed by its owner, the write is dropped",
                        self.owner, name
                    );
                }
            }
            None => warn!(
                "{}: set {}: a {} value is not compatible with a {} member",
                self.owner,
                name,
                value.kind(),
                target
            ),
        }
    }

    /// Bulk `set` from a JSON object.
    ///
    /// `null` is accepted as an empty description. Any other non-object
    /// input is logged and ignored.
    pub fn load_from_json(&mut self, json: &Json) {
        match json {
            Json::Object(map) => {
                for (name, value) in map {
                    self.set_value(name, Value::from_json(value));
                }
            }
            Json::Null => {}
            other => warn!(
                "{}: load_from_json: expected an object, got {}",
                self.owner, other
            ),
        }
    }

    /// Resets a member to its type's default, or removes a free slot.
    pub fn reset(&mut self, name: &str) {
        if let Some(binding) = self.members.get(name) {
            if !binding.reset() {
                warn!(
                    "{}: reset {}: the member is borrowed by its owner",
                    self.owner, name
                );
            }
        } else if self.free.remove(name).is_none() {
            debug!("{}: reset {}: unknown variable", self.owner, name);
        }
    }

    //--- Reads ------------------------------------------------------------

    /// Returns `(value, true)` or `(T::default(), false)`.
    pub fn get<T: Variable>(&self, name: &str) -> (T, bool) {
        self.get_or(name, T::default())
    }

    /// Returns `(value, true)` or `(default, false)` on absence or type
    /// mismatch.
    pub fn get_or<T: Variable>(&self, name: &str, default: T) -> (T, bool) {
        match self.try_get(name) {
            Some(value) => (value, true),
            None => (default, false),
        }
    }

    /// Returns the value of `name` read as `T`, logging a type mismatch.
    pub fn try_get<T: Variable>(&self, name: &str) -> Option<T> {
        let value = self.get_value(name)?;
        let typed = T::read(&value);
        if typed.is_none() {
            warn!(
                "{}: get {}: a stored {} cannot be read as {}",
                self.owner,
                name,
                value.kind(),
                T::KIND
            );
        }
        typed
    }

    /// Untyped read of the stored value.
    pub fn get_value(&self, name: &str) -> Option<Value> {
        let value = match self.members.get(name) {
            Some(binding) => Some(binding.load()),
            None => self.free.get(name).cloned(),
        };
        if value.is_none() {
            debug!("{}: get {}: unknown variable", self.owner, name);
        }
        value
    }

    //--- Queries ----------------------------------------------------------

    /// Returns true if `name` is a member or a free slot.
    pub fn has(&self, name: &str) -> bool {
        self.members.contains_key(name) || self.free.contains_key(name)
    }

    /// Returns true if `name` is bound to a member rather than a free slot.
    pub fn is_member(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Returns every known name, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .members
            .keys()
            .chain(self.free.keys())
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Returns the number of members and free slots.
    pub fn len(&self) -> usize {
        self.members.len() + self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.free.is_empty()
    }
}

impl fmt::Debug for VariableStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableStorage")
            .field("owner", &self.owner)
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .field("free", &self.free)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
