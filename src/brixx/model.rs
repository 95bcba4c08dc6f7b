//! # Immutable Records
//!
//! [`Model`] is a mixin that turns factory instances into immutable records.
//! The composed prototype supplies the record's configuration:
//!
//! | Property | Required | Meaning |
//! |----------|----------|---------|
//! | `name` | yes | The record's type name, stored in the discriminator field |
//! | `defaults` | yes | Non-empty mapping of field name to default value |
//! | `idAttribute` | no | Which field is the id (falls back to [`Settings::id_attribute`]) |
//!
//! At construction the record's [`Shape`] is fixed: the discriminator field
//! followed by the keys of `defaults`, in order. Each field becomes a read-only
//! own property holding the spec's value when the spec has that key and the
//! default otherwise. Spec keys outside the shape are ignored.
//!
//! A record never changes after construction. [`Record::set`] validates its
//! input against the shape and builds a new record through the same factory
//! path, so every initializer runs again.
//!
//! ```ignore
//! let create_widget = factory([Model::mixin()], Some(
//!     Mixin::new()
//!         .with("name", "Widget")
//!         .with("idAttribute", "_id")
//!         .with("defaults", Value::from(json!({"_id": null, "width": 5, "height": 2}))),
//! ));
//! let widget = create_widget.create_default()?;
//! let record = Record::view(&widget).unwrap();
//! assert_eq!(record.to_string(), r#"Widget { name: "Widget", _id: null, width: 5, height: 2 }"#);
//! ```
//!
//! The record operations are also installed as overridable methods on the
//! prototype (`toString`, `has`, `hasId`, `set`, `diff`, `toJSON`), reachable
//! through [`Object::call`].

use crate::config::{Settings, DEFAULT_SETTINGS};
use crate::error::{Error, Result};
use crate::mixin::Mixin;
use crate::object::{Object, Property};
use crate::value::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// The fixed key table of a record, built once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    type_name: String,
    id_attribute: String,
    keys: Vec<String>,
}

impl Shape {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    /// Field names, discriminator first.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn discriminator(&self) -> &str {
        &self.keys[0]
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

/// The immutable record mixin.
pub struct Model;

impl Model {
    /// Type tag carried by every record.
    pub const TAG: &'static str = "Model";

    /// The record mixin configured with [`DEFAULT_SETTINGS`].
    pub fn mixin() -> Mixin {
        Self::with_settings(&DEFAULT_SETTINGS)
    }

    pub fn with_settings(settings: &Settings) -> Mixin {
        let id_fallback = settings.id_attribute.clone();
        let discriminator = settings.discriminator.clone();

        Mixin::new()
            .tagged(Self::TAG)
            .on_initialize(move |this, spec| install(this, spec, &id_fallback, &discriminator))
            .with_method("toString", |this, _| {
                Ok(Value::from(Record::require(this)?.to_string()))
            })
            .with_method("has", |this, args| {
                let record = Record::require(this)?;
                let key = args.first().and_then(Value::as_str);
                Ok(Value::Bool(key.is_some_and(|k| record.has(k))))
            })
            .with_method("hasId", |this, _| {
                Ok(Value::Bool(Record::require(this)?.has_id()))
            })
            .with_method("set", |this, args| {
                let undefined = Value::Undefined;
                let values = args.first().unwrap_or(&undefined);
                Ok(Value::Object(Record::require(this)?.set_value(values)?))
            })
            .with_method("diff", |this, args| {
                let other = match args.first() {
                    Some(Value::Object(other)) => other,
                    Some(other) => {
                        return Err(Error::InvalidArgument(format!(
                            "diff() expects an object, got {}",
                            other.kind()
                        )))
                    }
                    None => return Err(Error::InvalidArgument("diff() expects an object".into())),
                };
                let changes = Record::require(this)?.diff(other);
                Ok(changes.map_or(Value::Null, |changes| {
                    Value::Array(changes.into_iter().map(Change::into_value).collect())
                }))
            })
            .with_method("toJSON", |this, _| {
                Ok(Value::from(Record::require(this)?.to_map()))
            })
    }
}

fn install(this: &mut Object, spec: &Map, id_fallback: &str, discriminator: &str) -> Result<()> {
    let defaults = match this.get("defaults") {
        Some(Value::Object(defaults)) => defaults.to_map(),
        _ => {
            return Err(Error::Configuration(
                "defaults must be a non-empty mapping".into(),
            ))
        }
    };
    if defaults.is_empty() {
        return Err(Error::Configuration(
            "defaults must be a non-empty mapping".into(),
        ));
    }

    let id_attribute = match this.get("idAttribute") {
        None | Some(Value::Undefined) => id_fallback.to_string(),
        Some(Value::String(id)) => id.clone(),
        Some(other) => {
            return Err(Error::Configuration(format!(
                "idAttribute must be a string, got {}",
                other.kind()
            )))
        }
    };
    if !defaults.contains_key(&id_attribute) {
        return Err(Error::Configuration(format!(
            "defaults must contain idAttribute \"{}\"",
            id_attribute
        )));
    }
    if defaults.contains_key(discriminator) {
        return Err(Error::Configuration(format!(
            "defaults must not redefine the \"{}\" field",
            discriminator
        )));
    }

    let type_name = match this.get(discriminator) {
        Some(Value::String(name)) => name.clone(),
        _ => {
            return Err(Error::Configuration(format!(
                "records need a string \"{}\"",
                discriminator
            )))
        }
    };

    let mut keys = Vec::with_capacity(defaults.len() + 1);
    keys.push(discriminator.to_string());
    this.define(discriminator, Property::read_only(type_name.clone()))?;

    for (key, default) in defaults {
        let value = spec.get(&key).cloned().unwrap_or(default);
        this.define(key.clone(), Property::read_only(value))?;
        keys.push(key);
    }

    debug!(record = %type_name, fields = keys.len(), "constructed record");
    this.set_shape(Arc::new(Shape {
        type_name,
        id_attribute,
        keys,
    }));
    Ok(())
}

/// One differing field: `[key, ours, theirs]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub key: String,
    pub ours: Value,
    pub theirs: Value,
}

impl Change {
    pub fn into_value(self) -> Value {
        Value::Array(vec![Value::String(self.key), self.ours, self.theirs])
    }
}

/// A typed view over an object built with the [`Model`] mixin.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    object: &'a Object,
    shape: &'a Shape,
}

impl<'a> Record<'a> {
    /// `None` unless `object` was constructed as a record.
    pub fn view(object: &'a Object) -> Option<Self> {
        object.shape().map(|shape| Record {
            object,
            shape: shape.as_ref(),
        })
    }

    fn require(object: &'a Object) -> Result<Self> {
        Self::view(object).ok_or_else(|| {
            Error::InvalidArgument("receiver is not an immutable record".into())
        })
    }

    pub fn object(&self) -> &'a Object {
        self.object
    }

    pub fn shape(&self) -> &'a Shape {
        self.shape
    }

    pub fn name(&self) -> &'a str {
        self.shape.type_name()
    }

    pub fn keys(&self) -> &'a [String] {
        self.shape.keys()
    }

    pub fn id_attribute(&self) -> &'a str {
        self.shape.id_attribute()
    }

    pub fn has(&self, key: &str) -> bool {
        self.shape.contains(key)
    }

    /// The value of a declared field; `None` for undeclared keys.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        if self.has(key) {
            self.object.get_own(key)
        } else {
            None
        }
    }

    pub fn id(&self) -> Option<&'a Value> {
        self.get(self.id_attribute())
    }

    /// Whether the id is set. Zero is a valid id even though it is falsy.
    pub fn has_id(&self) -> bool {
        match self.id() {
            Some(Value::Number(n)) if *n == 0.0 => true,
            Some(id) => id.is_truthy(),
            None => false,
        }
    }

    /// Flat field mapping in key order.
    pub fn to_map(&self) -> Map {
        self.keys()
            .iter()
            .map(|key| {
                let value = self.object.get_own(key).cloned().unwrap_or_default();
                (key.clone(), value)
            })
            .collect()
    }

    /// JSON projection containing exactly the declared keys, in order.
    pub fn to_json(&self) -> serde_json::Value {
        let entries = self
            .keys()
            .iter()
            .map(|key| {
                let value = self.object.get_own(key).map(Value::to_json);
                (key.clone(), value.unwrap_or(serde_json::Value::Null))
            })
            .collect();
        serde_json::Value::Object(entries)
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    /// Build a new record with `values` applied over this one.
    pub fn set(&self, values: &Map) -> Result<Object> {
        if let Some(key) = values.keys().find(|key| !self.has(key)) {
            return Err(Error::UndefinedKey {
                key: key.clone(),
                type_name: self.name().to_string(),
            });
        }

        let prototype = self.object.prototype().ok_or_else(|| {
            Error::Configuration(format!("{} was not built by a factory", self.name()))
        })?;

        let mut spec = self.to_map();
        for (key, value) in values {
            spec.insert(key.clone(), value.clone());
        }
        trace!(record = %self.name(), changed = values.len(), "rebuilding record");
        prototype.instantiate(&spec)
    }

    /// Like [`set`](Self::set), for a loosely typed argument that must be a
    /// plain mapping.
    pub fn set_value(&self, values: &Value) -> Result<Object> {
        match values {
            Value::Object(object) if object.prototype().is_none() => self.set(&object.to_map()),
            other => Err(Error::InvalidArgument(format!(
                "set() expects a plain mapping, got {}",
                describe(other)
            ))),
        }
    }

    /// Fields whose values differ from `other`'s, in key order.
    ///
    /// `None` when `other` is this very object or every field compares equal.
    /// Fields missing from `other` read as `Undefined`.
    pub fn diff(&self, other: &Object) -> Option<Vec<Change>> {
        if std::ptr::eq(self.object, other) {
            return None;
        }

        let changes: Vec<Change> = self
            .keys()
            .iter()
            .filter_map(|key| {
                let ours = self.object.get_own(key).cloned().unwrap_or_default();
                let theirs = other.get(key).cloned().unwrap_or_default();
                (ours != theirs).then(|| Change {
                    key: key.clone(),
                    ours,
                    theirs,
                })
            })
            .collect();

        if changes.is_empty() {
            None
        } else {
            Some(changes)
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "a record instance",
        other => other.kind(),
    }
}

impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ ", self.name())?;
        for (i, key) in self.keys().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match self.object.get_own(key) {
                Some(Value::String(s)) => {
                    write!(f, "{}: {}", key, serde_json::Value::String(s.clone()))?
                }
                Some(value) => write!(f, "{}: {}", key, value)?,
                None => write!(f, "{}: undefined", key)?,
            }
        }
        f.write_str(" }")
    }
}
