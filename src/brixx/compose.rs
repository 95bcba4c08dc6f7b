//! # Mixin Composition
//!
//! [`compose`] merges an ordered list of mixins into one [`Prototype`]:
//!
//! 1. Every mixin contributes its `initialize` and `destroy` hooks (a no-op when
//!    absent) to two ordered chains.
//! 2. Every mixin's own *enumerable* properties are copied onto the prototype.
//!    When several mixins define the same name, the one applied last wins.
//! 3. The reserved names `initialize` and `destroy` are never copied. They are
//!    served by the chains instead, which run every hook in application order
//!    with the same argument.
//!
//! The base decides what the prototype itself inherits from: the ambient root,
//! or nothing at all (see [`Ancestor`]). A type-constructor base also gives the
//! prototype a `constructor`. An explicit base ([`Base::Mixin`]) is also the
//! starting layer: its enumerable properties are copied first, so every listed
//! mixin overrides them.

use crate::error::Result;
use crate::mixin::{is_reserved, Destroyer, Initializer, Mixin};
use crate::object::{Link, Object, Property};
use crate::value::{Map, Value};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// What a composed prototype inherits from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ancestor {
    Root,
    Null,
}

/// Where composition starts from.
#[derive(Debug, Clone, Copy)]
pub enum Base<'a> {
    /// The last mixin, or a fresh root-linked object when there are none.
    Inferred,
    /// No ancestor at all.
    Null,
    /// An explicit base mixin.
    Mixin(&'a Mixin),
}

/// The merged template shared by every instance of a factory.
#[derive(Debug)]
pub struct Prototype {
    properties: IndexMap<String, Property>,
    initializers: Vec<Initializer>,
    destroyers: Vec<Destroyer>,
    ancestor: Ancestor,
    constructor: Option<String>,
    type_tags: Vec<String>,
}

impl Prototype {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key).map(|prop| &prop.value)
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    /// Own property names: `constructor` (if any), the lifecycle hooks, then
    /// merged properties in first-insertion order.
    pub fn own_property_names(&self) -> Vec<&str> {
        let mut names = Vec::with_capacity(self.properties.len() + 3);
        if self.constructor.is_some() {
            names.push("constructor");
        }
        names.extend(["initialize", "destroy"]);
        names.extend(self.properties.keys().map(String::as_str));
        names
    }

    pub fn ancestor(&self) -> Ancestor {
        self.ancestor
    }

    pub fn constructor(&self) -> Option<&str> {
        self.constructor.as_deref()
    }

    pub fn type_tags(&self) -> &[String] {
        &self.type_tags
    }

    pub fn is_instance_of(&self, tag: &str) -> bool {
        self.type_tags.iter().any(|t| t == tag)
    }

    /// Run every initializer in mixin order with the same spec.
    pub fn initialize(&self, target: &mut Object, spec: &Map) -> Result<()> {
        trace!(hooks = self.initializers.len(), "running initializer chain");
        for hook in &self.initializers {
            hook.run(target, spec)?;
        }
        Ok(())
    }

    /// Run every destroyer in mixin order.
    pub fn destroy(&self, target: &mut Object) -> Result<()> {
        trace!(hooks = self.destroyers.len(), "running destroyer chain");
        for hook in &self.destroyers {
            hook.run(target)?;
        }
        Ok(())
    }

    /// Allocate a fresh object linked to this prototype and initialize it.
    pub fn instantiate(self: &Arc<Self>, spec: &Map) -> Result<Object> {
        let mut object = Object::with_link(Link::Prototype(Arc::clone(self)));
        self.initialize(&mut object, spec)?;
        Ok(object)
    }
}

/// Merge `mixins` (in order) into a new prototype. The mixins are only read.
pub fn compose(base: Base<'_>, mixins: &[Mixin]) -> Prototype {
    let base_mixin = match base {
        Base::Inferred => mixins.last(),
        Base::Null => None,
        Base::Mixin(mixin) => Some(mixin),
    };
    let ancestor = match (base, base_mixin) {
        (Base::Null, _) => Ancestor::Null,
        (_, Some(mixin)) if mixin.is_ownerless() => Ancestor::Null,
        _ => Ancestor::Root,
    };
    let constructor = base_mixin
        .filter(|mixin| mixin.is_type_constructor())
        .and_then(|mixin| mixin.tag())
        .map(str::to_string);

    let mut properties = IndexMap::new();
    let mut initializers = Vec::with_capacity(mixins.len());
    let mut destroyers = Vec::with_capacity(mixins.len());
    let mut type_tags = Vec::new();

    if let Base::Mixin(base) = base {
        if let Some(tag) = base.tag() {
            type_tags.push(tag.to_string());
        }
        copy_enumerable(base, &mut properties);
    }

    for mixin in mixins {
        initializers.push(mixin.initializer());
        destroyers.push(mixin.destroyer());
        if let Some(tag) = mixin.tag() {
            if !type_tags.iter().any(|t| t == tag) {
                type_tags.push(tag.to_string());
            }
        }
        copy_enumerable(mixin, &mut properties);
    }

    debug!(
        mixins = mixins.len(),
        properties = properties.len(),
        ?ancestor,
        "composed prototype"
    );

    Prototype {
        properties,
        initializers,
        destroyers,
        ancestor,
        constructor,
        type_tags,
    }
}

fn copy_enumerable(mixin: &Mixin, properties: &mut IndexMap<String, Property>) {
    for (key, prop) in mixin.properties() {
        if !prop.enumerable {
            continue;
        }
        if is_reserved(key) {
            trace!(key, "skipping reserved lifecycle name");
            continue;
        }
        properties.insert(key.to_string(), prop.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Mutex;

    #[test]
    fn test_zero_mixins_only_have_lifecycle_hooks() {
        let proto = compose(Base::Inferred, &[]);
        assert_eq!(proto.own_property_names(), vec!["initialize", "destroy"]);
        assert_eq!(proto.ancestor(), Ancestor::Root);
        assert_eq!(compose(Base::Null, &[]).ancestor(), Ancestor::Null);
    }

    #[test]
    fn test_later_mixins_win() {
        let base = Mixin::new().with("x", 1).with("foo", "baz");
        let sub = Mixin::new().with("y", 2).with("foo", "bar");
        let proto = compose(Base::Inferred, &[base, sub]);

        assert_eq!(proto.get("foo"), Some(&Value::from("bar")));
        assert_eq!(proto.get("x"), Some(&Value::from(1)));
        assert_eq!(proto.get("y"), Some(&Value::from(2)));
        assert_eq!(proto.own_property_names().len(), 5);
    }

    #[test]
    fn test_non_enumerable_properties_are_not_copied() {
        let mixin = Mixin::new().with("shown", 1).with_hidden("secret", 2);
        let proto = compose(Base::Inferred, &[mixin]);
        assert!(proto.get("secret").is_none());
        assert!(proto.get("shown").is_some());
    }

    #[test]
    fn test_reserved_names_are_not_copied() {
        let mixin = Mixin::new().with("initialize", "oops").with("destroy", 0);
        let proto = compose(Base::Inferred, &[mixin]);
        assert!(proto.get("initialize").is_none());
        assert!(proto.get("destroy").is_none());
        assert_eq!(proto.own_property_names(), vec!["initialize", "destroy"]);
    }

    #[test]
    fn test_hooks_run_in_application_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mixins: Vec<Mixin> = ["a", "b", "c"]
            .into_iter()
            .map(|name| {
                let init_log = Arc::clone(&log);
                let destroy_log = Arc::clone(&log);
                Mixin::new()
                    .on_initialize(move |_, _| {
                        init_log.lock().unwrap().push(format!("init {}", name));
                        Ok(())
                    })
                    .on_destroy(move |_| {
                        destroy_log.lock().unwrap().push(format!("destroy {}", name));
                        Ok(())
                    })
            })
            .collect();
        let proto = Arc::new(compose(Base::Inferred, &mixins));

        let mut object = proto.instantiate(&Map::new()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["init a", "init b", "init c"]);

        object.destroy().unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["init a", "init b", "init c", "destroy a", "destroy b", "destroy c"]
        );
    }

    #[test]
    fn test_failing_initializer_stops_the_chain() {
        let ran = Arc::new(Mutex::new(false));
        let ran_hook = Arc::clone(&ran);
        let mixins = [
            Mixin::new().on_initialize(|_, _| Err(Error::Configuration("broken".into()))),
            Mixin::new().on_initialize(move |_, _| {
                *ran_hook.lock().unwrap() = true;
                Ok(())
            }),
        ];
        let proto = Arc::new(compose(Base::Inferred, &mixins));

        assert!(matches!(
            proto.instantiate(&Map::new()),
            Err(Error::Configuration(_))
        ));
        assert!(!*ran.lock().unwrap());
    }

    #[test]
    fn test_type_constructor_base_adds_constructor() {
        let ctor = Mixin::type_constructor("C").with("foo", "bar");
        let proto = compose(Base::Inferred, &[ctor]);

        assert_eq!(proto.constructor(), Some("C"));
        assert_eq!(
            proto.own_property_names(),
            vec!["constructor", "initialize", "destroy", "foo"]
        );
        assert!(proto.is_instance_of("C"));
    }

    #[test]
    fn test_ownerless_base_has_null_ancestor() {
        let mut source = Object::ownerless();
        source.set("foo", "bar").unwrap();
        let proto = compose(Base::Inferred, &[Mixin::from_object(&source)]);
        assert_eq!(proto.ancestor(), Ancestor::Null);
    }

    #[test]
    fn test_explicit_base_is_the_starting_layer() {
        let base = Mixin::new()
            .with("foo", "bar")
            .with("shared", "base")
            .with_hidden("secret", 1)
            .with("initialize", "oops");
        let mixins = [Mixin::new().with("x", 1).with("shared", "mixin")];
        let proto = compose(Base::Mixin(&base), &mixins);

        assert_eq!(proto.get("foo"), Some(&Value::from("bar")));
        assert_eq!(proto.get("shared"), Some(&Value::from("mixin")));
        assert_eq!(proto.get("x"), Some(&Value::from(1)));
        assert!(proto.get("secret").is_none());
        assert_eq!(
            proto.own_property_names(),
            vec!["initialize", "destroy", "foo", "shared", "x"]
        );
        assert_eq!(proto.ancestor(), Ancestor::Root);
        assert_eq!(base.len(), 4);
    }

    #[test]
    fn test_explicit_type_constructor_base() {
        let base = Mixin::type_constructor("Shape").with("sides", 0);
        let proto = Arc::new(compose(Base::Mixin(&base), &[Mixin::new().with("sides", 4)]));

        assert_eq!(proto.constructor(), Some("Shape"));
        assert!(proto.is_instance_of("Shape"));
        let object = proto.instantiate(&Map::new()).unwrap();
        assert!(object.is_instance_of("Shape"));
        assert_eq!(object.get("sides"), Some(&Value::from(4)));
    }
}
