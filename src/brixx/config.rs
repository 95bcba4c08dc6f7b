//! # Settings
//!
//! Library-wide defaults are managed by [`confique`], which layers environment
//! variables over an optional TOML file over compiled defaults.
//!
//! ## Available Settings
//!
//! | Key | Default | Env | Description |
//! |-----|---------|-----|-------------|
//! | `id_attribute` | `id` | `BRIXX_ID_ATTRIBUTE` | Id field used by records that declare no `idAttribute` |
//! | `discriminator` | `name` | `BRIXX_DISCRIMINATOR` | Field prepended to every record's key list |
//! | `pattern_delimiter` | `,` | `BRIXX_PATTERN_DELIMITER` | Separates tokens of a canonical pattern |
//! | `pattern_pair_separator` | `:` | `BRIXX_PATTERN_PAIR_SEPARATOR` | Separates key and value inside a token |
//!
//! Most callers never touch this module: [`Model::mixin`](crate::model::Model::mixin)
//! and [`PatternMatcher::new`](crate::matcher::PatternMatcher::new) use
//! [`DEFAULT_SETTINGS`].

use crate::error::Result;
use confique::Config;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Compiled defaults, shared by every component that is not given explicit settings.
pub static DEFAULT_SETTINGS: Lazy<Settings> = Lazy::new(Settings::default);

/// Configuration for brixx, optionally stored in `brixx.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Id field used by records whose prototype declares no `idAttribute`
    #[config(default = "id", env = "BRIXX_ID_ATTRIBUTE")]
    pub id_attribute: String,

    /// Name of the synthetic type field prepended to every record
    #[config(default = "name", env = "BRIXX_DISCRIMINATOR")]
    pub discriminator: String,

    #[config(default = ",", env = "BRIXX_PATTERN_DELIMITER")]
    pub pattern_delimiter: String,

    #[config(default = ":", env = "BRIXX_PATTERN_PAIR_SEPARATOR")]
    pub pattern_pair_separator: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id_attribute: "id".to_string(),
            discriminator: "name".to_string(),
            pattern_delimiter: ",".to_string(),
            pattern_pair_separator: ":".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the environment, falling back to compiled defaults.
    pub fn load() -> Result<Self> {
        Self::layered(None, true)
    }

    /// Load settings from a TOML file (environment still takes priority).
    ///
    /// A missing file is not an error; the defaults are used instead.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::layered(Some(path.as_ref()), true)
    }

    fn layered(path: Option<&Path>, with_env: bool) -> Result<Self> {
        let mut builder = Self::builder();
        if with_env {
            builder = builder.env();
        }
        if let Some(path) = path {
            builder = builder.file(path);
        }
        Ok(builder.load()?)
    }
}
