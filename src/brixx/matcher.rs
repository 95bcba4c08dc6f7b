//! Attribute pattern matching.
//!
//! A [`PatternMatcher`] files values under flat key/value patterns and answers
//! "which values apply to this set of attributes?".
//!
//! Patterns are reduced to a canonical string: each `key:value` pair becomes a
//! token, tokens are sorted by key and joined with `,`. A scalar pattern is a
//! single token.
//!
//! | Pattern | Canonical form |
//! |---------|----------------|
//! | `{foo: "bar"}` | `foo:bar` |
//! | `{foo: "bar", baz: "zee"}` | `baz:zee,foo:bar` |
//! | `"cmd"` | `cmd` |
//!
//! A registered pattern matches a query when every one of its tokens occurs
//! *as a substring* of the query's canonical form. This is looser than
//! comparing pairs: `{o: "b"}` is found by a `{foo: "bar"}` query because
//! `o:b` occurs inside `foo:bar`.

use crate::config::{Settings, DEFAULT_SETTINGS};
use crate::value::Value;
use indexmap::IndexMap;
use tracing::trace;

#[derive(Debug, Clone)]
struct Bucket<T> {
    tokens: Vec<String>,
    values: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct PatternMatcher<T> {
    buckets: IndexMap<String, Bucket<T>>,
    delimiter: String,
    separator: String,
}

impl<T> Default for PatternMatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PatternMatcher<T> {
    pub fn new() -> Self {
        Self::with_settings(&DEFAULT_SETTINGS)
    }

    /// A matcher using the settings' token delimiter and pair separator.
    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            buckets: IndexMap::new(),
            delimiter: settings.pattern_delimiter.clone(),
            separator: settings.pattern_pair_separator.clone(),
        }
    }

    fn tokens(&self, pattern: &Value) -> Vec<String> {
        match pattern {
            Value::Object(object) => {
                let mut pairs: Vec<(&str, &Value)> = object
                    .keys()
                    .filter_map(|key| object.get_own(key).map(|value| (key, value)))
                    .collect();
                pairs.sort_by(|a, b| a.0.cmp(b.0));
                pairs
                    .into_iter()
                    .map(|(key, value)| format!("{}{}{}", key, self.separator, value))
                    .collect()
            }
            scalar => vec![scalar.to_string()],
        }
    }

    /// The canonical string a pattern is filed under.
    pub fn canonical(&self, pattern: &Value) -> String {
        self.tokens(pattern).join(&self.delimiter)
    }

    /// File `value` under `pattern`. Several values may share a pattern.
    pub fn add(&mut self, pattern: &Value, value: T) {
        let tokens = self.tokens(pattern);
        let key = tokens.join(&self.delimiter);
        trace!(pattern = %key, "adding matcher entry");
        self.buckets
            .entry(key)
            .or_insert_with(|| Bucket {
                tokens,
                values: Vec::new(),
            })
            .values
            .push(value);
    }

    /// Every value whose pattern is covered by `query`, most specific first.
    pub fn find(&self, query: &Value) -> Vec<&T> {
        let query = self.canonical(query);
        let mut matched: Vec<&Bucket<T>> = self
            .buckets
            .values()
            .filter(|bucket| bucket.tokens.iter().all(|token| query.contains(token.as_str())))
            .collect();
        // Stable sort keeps registration order among equally specific patterns.
        matched.sort_by(|a, b| b.tokens.len().cmp(&a.tokens.len()));
        matched
            .into_iter()
            .flat_map(|bucket| bucket.values.iter())
            .collect()
    }

    /// Whether exactly this pattern has been registered.
    pub fn exists(&self, pattern: &Value) -> bool {
        self.buckets.contains_key(&self.canonical(pattern))
    }

    /// Canonical forms of every registered pattern, in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Total number of filed values.
    pub fn len(&self) -> usize {
        self.buckets.values().map(|bucket| bucket.values.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl<T: PartialEq> PatternMatcher<T> {
    /// Remove a whole pattern, or one occurrence of `value` under it.
    ///
    /// Returns whether anything was removed. A pattern left without values is
    /// dropped.
    pub fn remove(&mut self, pattern: &Value, value: Option<&T>) -> bool {
        let key = self.canonical(pattern);
        let Some(value) = value else {
            trace!(pattern = %key, "removing matcher pattern");
            return self.buckets.shift_remove(&key).is_some();
        };

        let Some(bucket) = self.buckets.get_mut(&key) else {
            return false;
        };
        let Some(position) = bucket.values.iter().position(|v| v == value) else {
            return false;
        };
        bucket.values.remove(position);
        if bucket.values.is_empty() {
            self.buckets.shift_remove(&key);
        }
        trace!(pattern = %key, "removed matcher entry");
        true
    }
}
