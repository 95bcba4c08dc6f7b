//! Mixin definitions.
//!
//! A [`Mixin`] is a reusable bundle of properties plus two optional lifecycle
//! hooks. Mixins are plain values: building a factory only reads them, so the
//! same mixin can feed any number of factories.
//!
//! ```ignore
//! let sized = Mixin::new()
//!     .with("width", 5)
//!     .with_method("area", |this, _| { /* ... */ })
//!     .on_initialize(|this, spec| Ok(()));
//! ```

use crate::error::Result;
use crate::object::{Link, Object, Property};
use crate::value::{Function, Map, Value};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Property names that are chained by composition instead of copied.
pub const RESERVED: [&str; 2] = ["initialize", "destroy"];

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

type InitFn = dyn Fn(&mut Object, &Map) -> Result<()> + Send + Sync;
type DestroyFn = dyn Fn(&mut Object) -> Result<()> + Send + Sync;

/// An `initialize(spec)` hook.
#[derive(Clone)]
pub struct Initializer(Arc<InitFn>);

impl Initializer {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&mut Object, &Map) -> Result<()> + Send + Sync + 'static,
    {
        Initializer(Arc::new(hook))
    }

    pub fn noop() -> Self {
        Self::new(|_, _| Ok(()))
    }

    pub fn run(&self, target: &mut Object, spec: &Map) -> Result<()> {
        (self.0)(target, spec)
    }
}

impl fmt::Debug for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Initializer")
    }
}

/// A `destroy()` hook.
#[derive(Clone)]
pub struct Destroyer(Arc<DestroyFn>);

impl Destroyer {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&mut Object) -> Result<()> + Send + Sync + 'static,
    {
        Destroyer(Arc::new(hook))
    }

    pub fn noop() -> Self {
        Self::new(|_| Ok(()))
    }

    pub fn run(&self, target: &mut Object) -> Result<()> {
        (self.0)(target)
    }
}

impl fmt::Debug for Destroyer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Destroyer")
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mixin {
    properties: IndexMap<String, Property>,
    initialize: Option<Initializer>,
    destroy: Option<Destroyer>,
    tag: Option<String>,
    type_constructor: bool,
    ownerless: bool,
}

impl Mixin {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mixin standing in for a named type.
    ///
    /// Instances of a factory built on it answer `is_instance_of(name)`, and
    /// when it is the base of a composition the prototype gets a
    /// `constructor` entry.
    pub fn type_constructor(name: impl Into<String>) -> Self {
        Self {
            tag: Some(name.into()),
            type_constructor: true,
            ..Self::default()
        }
    }

    /// Use an existing object's own properties (flags included) as the
    /// property source. An ownerless object yields an ownerless mixin.
    pub fn from_object(object: &Object) -> Self {
        Self {
            properties: object
                .properties()
                .map(|(key, prop)| (key.to_string(), prop.clone()))
                .collect(),
            ownerless: matches!(object.link(), Link::Null),
            ..Self::default()
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), Property::new(value));
        self
    }

    /// Add a non-enumerable property; it is never copied by composition.
    pub fn with_hidden(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), Property::hidden(value));
        self
    }

    pub fn with_method<F>(self, key: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.with(key, Function::new(body))
    }

    pub fn on_initialize<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Object, &Map) -> Result<()> + Send + Sync + 'static,
    {
        self.initialize = Some(Initializer::new(hook));
        self
    }

    pub fn on_destroy<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Object) -> Result<()> + Send + Sync + 'static,
    {
        self.destroy = Some(Destroyer::new(hook));
        self
    }

    /// Attach a type tag without making this a type constructor.
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.properties.iter().map(|(key, prop)| (key.as_str(), prop))
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The `initialize` hook, or a no-op when none was given.
    pub fn initializer(&self) -> Initializer {
        self.initialize.clone().unwrap_or_else(Initializer::noop)
    }

    /// The `destroy` hook, or a no-op when none was given.
    pub fn destroyer(&self) -> Destroyer {
        self.destroy.clone().unwrap_or_else(Destroyer::noop)
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn is_type_constructor(&self) -> bool {
        self.type_constructor
    }

    pub fn is_ownerless(&self) -> bool {
        self.ownerless
    }
}
