//! # Brixx Architecture
//!
//! Brixx is a small toolkit for building loosely typed objects safely: helpers
//! that never trip over absent values, factories that compose behavior from
//! mixins, immutable records built on top of those factories, and a pattern
//! matcher for attribute-based lookups.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Records (model.rs)                                         │
//! │  - Model mixin: fixed shape, read-only fields               │
//! │  - Record view: has / has_id / set / diff / to_json         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Factories (factory.rs, compose.rs, mixin.rs)               │
//! │  - Mixins merged into one Prototype, last applied wins      │
//! │  - Chained initialize / destroy hooks                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Values (value.rs, object.rs, helpers.rs)                   │
//! │  - Value / Object / Property                                │
//! │  - ensure, exists, stringify, deep_freeze                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`matcher`] module stands on its own and only uses [`Value`] for
//! patterns.
//!
//! ## Composition Rules
//!
//! A factory's prototype is built once, when the factory is built:
//!
//! - Mixins are applied in order, the extension last. For a name defined by
//!   several mixins, the last one wins.
//! - Only enumerable properties are copied.
//! - `initialize` and `destroy` are never copied; every mixin's hooks run in
//!   application order instead.
//! - Mixins are only read. The same mixin can back any number of factories.
//!
//! ## Records
//!
//! A record's key set is fixed at construction and its fields cannot be
//! assigned. Changing a record means building a new one with
//! [`Record::set`], which runs the factory's full construction path again.
//!
//! ## Module Overview
//!
//! - [`value`]: Dynamic values and JSON conversion
//! - [`object`]: Objects, properties and prototype links
//! - [`helpers`]: `ensure`, `exists`, `stringify`, `deep_freeze`
//! - [`mixin`]: Mixin definitions and lifecycle hooks
//! - [`compose`]: Merging mixins into a prototype
//! - [`factory`]: Factories and their builder
//! - [`model`]: The immutable record mixin
//! - [`matcher`]: Attribute pattern matcher
//! - [`config`]: Settings
//! - [`error`]: Error types

pub mod compose;
pub mod config;
pub mod error;
pub mod factory;
pub mod helpers;
pub mod matcher;
pub mod mixin;
pub mod model;
pub mod object;
pub mod value;

pub use compose::{compose, Ancestor, Base, Prototype};
pub use config::Settings;
pub use error::{Error, Result};
pub use factory::{factory, Factory, FactoryBuilder};
pub use helpers::{deep_freeze, ensure, exists, stringify};
pub use matcher::PatternMatcher;
pub use mixin::Mixin;
pub use model::{Change, Model, Record, Shape};
pub use object::{Link, Object, Property};
pub use value::{json_map, Function, Map, Value};
