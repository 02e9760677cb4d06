//=========================================================================
// Variable Values
//=========================================================================
//
// Tagged values stored by a VariableStorage and the typed bridge into them.
//
// Architecture:
//   Rust type ──Variable::into_value──> Value ──widen_to──> member kind
//   stored Value ──Variable::read──> Rust type
//
// Writes and reads follow two different compatibility tables. Writes
// widen (a char fits into a double member), reads accept a narrower stored
// kind only for the wide integer and double targets.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use serde_json::Value as Json;

//=== ValueKind ===========================================================

/// Runtime tag of a stored [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Char,
    UChar,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Bool,
    Str,
    Json,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Char => "char",
            Self::UChar => "unsigned char",
            Self::Int => "int",
            Self::UInt => "unsigned int",
            Self::Long => "long",
            Self::ULong => "unsigned long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::Str => "string",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

//=== Value ===============================================================

/// A type-erased attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Char(i8),
    UChar(u8),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Str(String),
    Json(Json),
}

impl Value {
    /// Returns the runtime tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Char(_) => ValueKind::Char,
            Self::UChar(_) => ValueKind::UChar,
            Self::Int(_) => ValueKind::Int,
            Self::UInt(_) => ValueKind::UInt,
            Self::Long(_) => ValueKind::Long,
            Self::ULong(_) => ValueKind::ULong,
            Self::Float(_) => ValueKind::Float,
            Self::Double(_) => ValueKind::Double,
            Self::Bool(_) => ValueKind::Bool,
            Self::Str(_) => ValueKind::Str,
            Self::Json(_) => ValueKind::Json,
        }
    }

    /// Converts this value into `target` when a write of this value into a
    /// member of kind `target` is allowed.
    ///
    /// Signed sources only widen into signed or floating kinds, unsigned
    /// sources only into unsigned or floating kinds. Bool, string and json
    /// need an exact match.
    pub fn widen_to(&self, target: ValueKind) -> Option<Value> {
        use ValueKind as K;

        let widened = match (self, target) {
            (Self::Char(v), K::Char) => Self::Char(*v),
            (Self::Char(v), K::Int) => Self::Int(i32::from(*v)),
            (Self::Char(v), K::Long) => Self::Long(i64::from(*v)),
            (Self::Char(v), K::Float) => Self::Float(f32::from(*v)),
            (Self::Char(v), K::Double) => Self::Double(f64::from(*v)),

            (Self::UChar(v), K::UChar) => Self::UChar(*v),
            (Self::UChar(v), K::UInt) => Self::UInt(u32::from(*v)),
            (Self::UChar(v), K::ULong) => Self::ULong(u64::from(*v)),
            (Self::UChar(v), K::Float) => Self::Float(f32::from(*v)),
            (Self::UChar(v), K::Double) => Self::Double(f64::from(*v)),

            (Self::Int(v), K::Int) => Self::Int(*v),
            (Self::Int(v), K::Long) => Self::Long(i64::from(*v)),
            (Self::Int(v), K::Float) => Self::Float(*v as f32),
            (Self::Int(v), K::Double) => Self::Double(f64::from(*v)),

            (Self::UInt(v), K::UInt) => Self::UInt(*v),
            (Self::UInt(v), K::ULong) => Self::ULong(u64::from(*v)),
            (Self::UInt(v), K::Float) => Self::Float(*v as f32),
            (Self::UInt(v), K::Double) => Self::Double(f64::from(*v)),

            (Self::Long(v), K::Long) => Self::Long(*v),
            (Self::Long(v), K::Double) => Self::Double(*v as f64),

            (Self::ULong(v), K::ULong) => Self::ULong(*v),
            (Self::ULong(v), K::Double) => Self::Double(*v as f64),

            (Self::Float(v), K::Float) => Self::Float(*v),
            (Self::Float(v), K::Double) => Self::Double(f64::from(*v)),

            (Self::Double(v), K::Double) => Self::Double(*v),

            (Self::Bool(v), K::Bool) => Self::Bool(*v),
            (Self::Str(v), K::Str) => Self::Str(v.clone()),
            (Self::Json(v), K::Json) => Self::Json(v.clone()),

            _ => return None,
        };

        Some(widened)
    }

    /// Builds a value from a JSON scalar the way descriptions are loaded.
    ///
    /// Booleans become `Bool`, integers `Long` (or `ULong` past `i64::MAX`),
    /// other numbers `Double`, strings `Str`. Anything else is kept as raw
    /// json.
    pub fn from_json(json: &Json) -> Value {
        match json {
            Json::Bool(b) => Self::Bool(*b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Long(i)
                } else if let Some(u) = n.as_u64() {
                    Self::ULong(u)
                } else {
                    Self::Double(n.as_f64().unwrap_or_default())
                }
            }
            Json::String(s) => Self::Str(s.clone()),
            other => Self::Json(other.clone()),
        }
    }
}

//--- Conversions -----------------------------------------------------------

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

value_from! {
    i8 => Char,
    u8 => UChar,
    i32 => Int,
    u32 => UInt,
    i64 => Long,
    u64 => ULong,
    f32 => Float,
    f64 => Double,
    bool => Bool,
    String => Str,
    Json => Json,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

//=== Variable Trait ======================================================

/// A Rust type that can live in a [`VariableStorage`](super::VariableStorage).
///
/// `read` implements the read compatibility table: most types only read
/// their own kind, while `i32`, `u32`, `i64`, `u64` and `f64` also accept
/// narrower stored kinds of the same signedness.
pub trait Variable: Clone + Default + 'static {
    /// Kind used when a member of this type is registered.
    const KIND: ValueKind;

    fn into_value(self) -> Value;

    fn read(value: &Value) -> Option<Self>;
}

macro_rules! exact_variable {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Variable for $ty {
                const KIND: ValueKind = ValueKind::$variant;

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn read(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

exact_variable! {
    i8 => Char,
    u8 => UChar,
    f32 => Float,
    bool => Bool,
    String => Str,
    Json => Json,
}

impl Variable for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn read(value: &Value) -> Option<Self> {
        match value {
            Value::Char(v) => Some(i32::from(*v)),
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl Variable for u32 {
    const KIND: ValueKind = ValueKind::UInt;

    fn into_value(self) -> Value {
        Value::UInt(self)
    }

    fn read(value: &Value) -> Option<Self> {
        match value {
            Value::UChar(v) => Some(u32::from(*v)),
            Value::UInt(v) => Some(*v),
            _ => None,
        }
    }
}

impl Variable for i64 {
    const KIND: ValueKind = ValueKind::Long;

    fn into_value(self) -> Value {
        Value::Long(self)
    }

    fn read(value: &Value) -> Option<Self> {
        match value {
            Value::Char(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }
}

impl Variable for u64 {
    const KIND: ValueKind = ValueKind::ULong;

    fn into_value(self) -> Value {
        Value::ULong(self)
    }

    fn read(value: &Value) -> Option<Self> {
        match value {
            Value::UChar(v) => Some(u64::from(*v)),
            Value::UInt(v) => Some(u64::from(*v)),
            Value::ULong(v) => Some(*v),
            _ => None,
        }
    }
}

impl Variable for f64 {
    const KIND: ValueKind = ValueKind::Double;

    fn into_value(self) -> Value {
        Value::Double(self)
    }

    fn read(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }
}

//=== Member ==============================================================

/// A caller-owned storage location that a `VariableStorage` can be bound to.
///
/// The owner keeps one handle and reads it directly, the storage keeps a
/// clone and writes through it on `set`. Both see the same cell.
pub struct Member<T>(Rc<RefCell<T>>);

impl<T> Member<T> {
    /// Creates a member holding `value`.
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Borrows the value. Storage writes to it fail while the borrow is held.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Mutably borrows the value.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Replaces the stored value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        self.0.replace(value)
    }
}

impl<T: Clone> Member<T> {
    /// Returns a copy of the value.
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T> Clone for Member<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Default> Default for Member<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(value) => f.debug_tuple("Member").field(&*value).finish(),
            Err(_) => f.write_str("Member(<borrowed>)"),
        }
    }
}

//--- Storage Binding -------------------------------------------------------

/// Type-erased view of a [`Member`] held by a storage.
pub(crate) trait MemberBinding {
    fn kind(&self) -> ValueKind;

    fn load(&self) -> Value;

    /// Writes an already widened value. Returns false when the cell is
    /// currently borrowed by its owner.
    fn store(&self, value: Value) -> bool;

    fn reset(&self) -> bool;
}

impl<T: Variable> MemberBinding for Member<T> {
    fn kind(&self) -> ValueKind {
        T::KIND
    }

    fn load(&self) -> Value {
        self.get().into_value()
    }

    fn store(&self, value: Value) -> bool {
        let Some(typed) = T::read(&value) else {
            return false;
        };
        match self.0.try_borrow_mut() {
            Ok(mut slot) => {
                *slot = typed;
                true
            }
            Err(_) => false,
        }
    }

    fn reset(&self) -> bool {
        match self.0.try_borrow_mut() {
            Ok(mut slot) => {
                *slot = T::default();
                true
            }
            Err(_) => false,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
