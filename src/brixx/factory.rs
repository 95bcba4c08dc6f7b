//! # Factories
//!
//! A [`Factory`] wraps a composed [`Prototype`] and turns specs into
//! initialized objects.
//!
//! ## Call Shapes
//!
//! | Call | Prototype ancestor | Precedence |
//! |------|--------------------|------------|
//! | `Factory::empty()` | none | - |
//! | `factory([m], None)` | root | `m` |
//! | `factory([a, b], None)` | root | `b` over `a` |
//! | `factory([a, b], Some(ext))` | root | `ext` over `b` over `a` |
//! | builder with `.null_base()` | none | unchanged |
//!
//! A single mixin is treated as the extension: with nothing to layer it on,
//! it is both the base and the last word.

use crate::compose::{compose, Base, Prototype};
use crate::error::Result;
use crate::mixin::Mixin;
use crate::object::Object;
use crate::value::Map;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct Factory {
    prototype: Arc<Prototype>,
}

impl Factory {
    pub fn builder() -> FactoryBuilder {
        FactoryBuilder::default()
    }

    /// A factory with no mixins and no ancestor: it produces blank objects.
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// Create an instance. A missing spec is a fresh empty map.
    pub fn create(&self, spec: Option<&Map>) -> Result<Object> {
        trace!("creating instance");
        match spec {
            Some(spec) => self.prototype.instantiate(spec),
            None => self.prototype.instantiate(&Map::new()),
        }
    }

    /// Shorthand for `create(None)`.
    pub fn create_default(&self) -> Result<Object> {
        self.create(None)
    }

    pub fn prototype(&self) -> &Arc<Prototype> {
        &self.prototype
    }
}

/// Build a factory from ordered mixins and an optional extension layered last.
pub fn factory<I>(mixins: I, extension: Option<Mixin>) -> Factory
where
    I: IntoIterator<Item = Mixin>,
{
    let builder = Factory::builder().mixins(mixins);
    match extension {
        Some(extension) => builder.extend(extension).build(),
        None => builder.build(),
    }
}

#[derive(Debug, Default)]
pub struct FactoryBuilder {
    mixins: Vec<Mixin>,
    extension: Option<Mixin>,
    null_base: bool,
}

impl FactoryBuilder {
    pub fn mixin(mut self, mixin: Mixin) -> Self {
        self.mixins.push(mixin);
        self
    }

    pub fn mixins<I>(mut self, mixins: I) -> Self
    where
        I: IntoIterator<Item = Mixin>,
    {
        self.mixins.extend(mixins);
        self
    }

    /// Set the final, highest-precedence layer.
    pub fn extend(mut self, extension: Mixin) -> Self {
        self.extension = Some(extension);
        self
    }

    /// Force a prototype without any ancestor.
    pub fn null_base(mut self) -> Self {
        self.null_base = true;
        self
    }

    pub fn build(self) -> Factory {
        let FactoryBuilder {
            mut mixins,
            extension,
            null_base,
        } = self;

        // The extension goes last, so it is also the inferred base.
        mixins.extend(extension);

        let base = if null_base || mixins.is_empty() {
            Base::Null
        } else {
            Base::Inferred
        };

        Factory {
            prototype: Arc::new(compose(base, &mixins)),
        }
    }
}
