//! Objects and their properties.
//!
//! An [`Object`] is an ordered table of [`Property`] entries linked to a
//! prototype. Reads fall through from the object's own properties to its
//! composed [`Prototype`]; writes always land on the object itself, so
//! prototype values are never shared mutably between instances.
//!
//! Two per-property flags control behavior:
//!
//! | Flag | Effect when `false` |
//! |------|---------------------|
//! | `enumerable` | hidden from [`Object::keys`], JSON projection and mixin composition |
//! | `writable` | [`Object::set`] fails with [`Error::Immutability`] |
//!
//! A frozen object rejects every write with [`Error::Frozen`].

use crate::compose::{Ancestor, Prototype};
use crate::error::{Error, Result};
use crate::model::Shape;
use crate::value::{Map, Value};
use indexmap::IndexMap;
use std::sync::Arc;

/// A single property slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub value: Value,
    pub enumerable: bool,
    pub writable: bool,
}

impl Property {
    /// An enumerable, writable property.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            enumerable: true,
            writable: true,
        }
    }

    /// A writable property that does not show up in keys or composition.
    pub fn hidden(value: impl Into<Value>) -> Self {
        Self {
            enumerable: false,
            ..Self::new(value)
        }
    }

    /// An enumerable property that rejects assignment.
    pub fn read_only(value: impl Into<Value>) -> Self {
        Self {
            writable: false,
            ..Self::new(value)
        }
    }
}

/// What an object inherits from.
#[derive(Debug, Clone)]
pub enum Link {
    /// The ambient root: no inherited properties, but not ownerless.
    Root,
    /// No ancestor at all.
    Null,
    /// A composed prototype built by a factory.
    Prototype(Arc<Prototype>),
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Link::Root, Link::Root) | (Link::Null, Link::Null) => true,
            (Link::Prototype(a), Link::Prototype(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Object {
    link: Link,
    properties: IndexMap<String, Property>,
    frozen: bool,
    shape: Option<Arc<Shape>>,
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.link == other.link && self.properties == other.properties
    }
}

impl Object {
    /// An empty object linked to the ambient root.
    pub fn new() -> Self {
        Self::with_link(Link::Root)
    }

    /// An empty object with no ancestor.
    pub fn ownerless() -> Self {
        Self::with_link(Link::Null)
    }

    pub(crate) fn with_link(link: Link) -> Self {
        Self {
            link,
            properties: IndexMap::new(),
            frozen: false,
            shape: None,
        }
    }

    /// A root-linked object holding `map`'s entries as enumerable, writable properties.
    pub fn from_map(map: Map) -> Self {
        let mut object = Self::new();
        object.properties = map
            .into_iter()
            .map(|(key, value)| (key, Property::new(value)))
            .collect();
        object
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    /// The composed prototype, if this object was built by a factory.
    pub fn prototype(&self) -> Option<&Arc<Prototype>> {
        match &self.link {
            Link::Prototype(proto) => Some(proto),
            _ => None,
        }
    }

    /// Whether this object ultimately has no ancestor.
    pub fn is_ownerless(&self) -> bool {
        match &self.link {
            Link::Root => false,
            Link::Null => true,
            Link::Prototype(proto) => proto.ancestor() == Ancestor::Null,
        }
    }

    /// Look up `key` on the object, then on its prototype.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.get_own(key)
            .or_else(|| self.prototype().and_then(|proto| proto.get(key)))
    }

    pub fn get_own(&self, key: &str) -> Option<&Value> {
        self.properties.get(key).map(|prop| &prop.value)
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Own enumerable property names, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|(_, prop)| prop.enumerable)
            .map(|(key, _)| key.as_str())
    }

    /// All own property names, enumerable or not.
    pub fn own_property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.properties.iter().map(|(key, prop)| (key.as_str(), prop))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Assign `key`, creating an enumerable, writable property if absent.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        self.check_writable(&key)?;
        match self.properties.get_mut(&key) {
            Some(prop) => prop.value = value.into(),
            None => {
                self.properties.insert(key, Property::new(value));
            }
        }
        Ok(())
    }

    /// Install a property with explicit flags, replacing any writable one.
    pub fn define(&mut self, key: impl Into<String>, property: Property) -> Result<()> {
        let key = key.into();
        self.check_writable(&key)?;
        self.properties.insert(key, property);
        Ok(())
    }

    fn check_writable(&self, key: &str) -> Result<()> {
        if self.frozen {
            return Err(Error::Frozen {
                key: key.to_string(),
            });
        }
        match self.properties.get(key) {
            Some(prop) if !prop.writable => Err(Error::Immutability {
                key: key.to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freeze this object only; see [`deep_freeze`](crate::helpers::deep_freeze)
    /// for the recursive version.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.properties.values_mut().map(|prop| &mut prop.value)
    }

    /// Call the method stored under `name`, with this object as receiver.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let method = self
            .get(name)
            .and_then(Value::as_function)
            .cloned()
            .ok_or_else(|| Error::NotCallable(name.to_string()))?;
        method.call(self, args)
    }

    /// Run the prototype's destroyer chain. Never called implicitly.
    pub fn destroy(&mut self) -> Result<()> {
        match self.prototype().cloned() {
            Some(proto) => proto.destroy(self),
            None => Ok(()),
        }
    }

    /// Whether one of the mixins this object was composed from carries `tag`.
    pub fn is_instance_of(&self, tag: &str) -> bool {
        self.prototype()
            .is_some_and(|proto| proto.is_instance_of(tag))
    }

    pub(crate) fn shape(&self) -> Option<&Arc<Shape>> {
        self.shape.as_ref()
    }

    pub(crate) fn set_shape(&mut self, shape: Arc<Shape>) {
        self.shape = Some(shape);
    }

    /// Own enumerable entries as a plain map.
    pub fn to_map(&self) -> Map {
        self.properties
            .iter()
            .filter(|(_, prop)| prop.enumerable)
            .map(|(key, prop)| (key.clone(), prop.value.clone()))
            .collect()
    }

    /// JSON projection of own enumerable, non-function properties.
    pub fn to_json(&self) -> serde_json::Value {
        let entries = self
            .properties
            .iter()
            .filter(|(_, prop)| prop.enumerable && !matches!(prop.value, Value::Function(_)))
            .map(|(key, prop)| (key.clone(), prop.value.to_json()))
            .collect();
        serde_json::Value::Object(entries)
    }
}
