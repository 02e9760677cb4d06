//=========================================================================
// Register Class
//=========================================================================
//
// Name → constructor registry used to build components, events, systems
// and states from strings found in descriptions.
//
// Registries are plain values filled once at engine construction and
// handed to the engine context. There are no global instances.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;

use log::warn;

//=== RegisterClass =======================================================

type Constructor<B, A> = Box<dyn Fn(A) -> Box<B>>;

/// Maps names to constructor closures producing `Box<B>` from `A`.
///
/// # Examples
///
/// ```
/// use keystone_engine::core::registry::RegisterClass;
///
/// trait Shape {
///     fn sides(&self) -> u32;
/// }
/// struct Square;
/// impl Shape for Square {
///     fn sides(&self) -> u32 { 4 }
/// }
///
/// let mut shapes: RegisterClass<dyn Shape> = RegisterClass::new("Shape");
/// shapes.register("square", |()| Box::new(Square));
///
/// assert_eq!(shapes.construct("square", ()).map(|s| s.sides()), Some(4));
/// assert!(shapes.construct("circle", ()).is_none());
/// ```
pub struct RegisterClass<B: ?Sized, A = ()> {
    label: &'static str,
    constructors: HashMap<String, Constructor<B, A>>,
}

impl<B: ?Sized, A> RegisterClass<B, A> {
    /// Creates an empty registry. `label` names it in log lines.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            constructors: HashMap::new(),
        }
    }

    /// Registers a constructor. A second registration under the same name
    /// overwrites the first one.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(A) -> Box<B> + 'static,
    {
        let name = name.into();
        if self
            .constructors
            .insert(name.clone(), Box::new(constructor))
            .is_some()
        {
            warn!(
                "{} {:?} was already registered and has been replaced",
                self.label, name
            );
        }
    }

    /// Re-keys every constructor under `normalize(name)`.
    ///
    /// Names are processed in sorted order. When two names normalize to the
    /// same key, the later one replaces the earlier with a warning.
    pub fn normalize_names(&mut self, normalize: impl Fn(&str) -> String) {
        let mut names: Vec<String> = self.constructors.keys().cloned().collect();
        names.sort();

        let mut normalized = HashMap::with_capacity(names.len());
        for name in names {
            let Some(constructor) = self.constructors.remove(&name) else {
                continue;
            };
            let key = normalize(&name);
            if normalized.insert(key.clone(), constructor).is_some() {
                warn!(
                    "{} {:?} normalizes to the already used name {:?} and replaces it",
                    self.label, name, key
                );
            }
        }
        self.constructors = normalized;
    }

    /// Builds an instance, or returns `None` for an unknown name.
    pub fn construct(&self, name: &str, args: A) -> Option<Box<B>> {
        self.constructors.get(name).map(|constructor| constructor(args))
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered names.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl<B: ?Sized, A> fmt::Debug for RegisterClass<B, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterClass")
            .field("label", &self.label)
            .field("names", &self.names())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
