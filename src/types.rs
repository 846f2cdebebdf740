//! Core types for query parameter synchronization.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::form_urlencoded;

/// Ordered mapping of query parameter key to its ordered values.
///
/// Keys enumerate in first-appearance order, mirroring the query string.
/// A key that is absent has zero values; [`ParamMap::get`] returns an empty
/// slice for it rather than `None`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamMap(IndexMap<String, Vec<String>>);

impl ParamMap {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Parse a search string, with or without the leading `?`.
    ///
    /// Decoding follows `application/x-www-form-urlencoded`: `+` is a space,
    /// percent escapes are decoded, and a bare `key` has one empty value.
    pub fn from_query(search: &str) -> Self {
        let search = search.strip_prefix('?').unwrap_or(search);
        form_urlencoded::parse(search.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Mapping of the query portion of `url`.
    pub fn from_url(url: &url::Url) -> Self {
        Self::from_query(url.query().unwrap_or(""))
    }

    /// Serialize back to a search string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.pairs() {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    /// Values for `key`, empty when the key is absent.
    pub fn get(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value for `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).first().map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Flattened `(key, value)` pairs in query-string order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set the values of `key`, replacing any previous values in place.
    pub fn insert(&mut self, key: impl Into<String>, values: impl Into<ParamValues>) {
        self.0.insert(key.into(), values.into().0);
    }

    /// Builder form of [`ParamMap::insert`].
    pub fn with(mut self, key: impl Into<String>, values: impl Into<ParamValues>) -> Self {
        self.insert(key, values);
        self
    }

    /// Remove `key`, keeping the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.0.shift_remove(key)
    }

    /// Append one value for `key`, adding the key at the end if new.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }
}

impl fmt::Debug for ParamMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for ParamMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ParamMap::new();
        for (k, v) in iter {
            map.append(k, v);
        }
        map
    }
}

/// An ordered value list for one key.
///
/// Lets mappings be written with a single string where a one-element list
/// is meant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamValues(pub Vec<String>);

impl From<&str> for ParamValues {
    fn from(value: &str) -> Self {
        ParamValues(vec![value.to_string()])
    }
}

impl From<String> for ParamValues {
    fn from(value: String) -> Self {
        ParamValues(vec![value])
    }
}

impl From<&String> for ParamValues {
    fn from(value: &String) -> Self {
        ParamValues(vec![value.clone()])
    }
}

impl From<Vec<String>> for ParamValues {
    fn from(values: Vec<String>) -> Self {
        ParamValues(values)
    }
}

impl From<Vec<&str>> for ParamValues {
    fn from(values: Vec<&str>) -> Self {
        values.as_slice().into()
    }
}

impl From<&[&str]> for ParamValues {
    fn from(values: &[&str]) -> Self {
        ParamValues(values.iter().map(|v| v.to_string()).collect())
    }
}

impl From<&[String]> for ParamValues {
    fn from(values: &[String]) -> Self {
        ParamValues(values.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for ParamValues {
    fn from(values: [&str; N]) -> Self {
        values.as_slice().into()
    }
}

/// Which history primitive a write goes through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    /// Add a new history entry.
    #[default]
    Push,
    /// Rewrite the current history entry.
    Replace,
}

impl NavigationMode {
    /// Mode for a `replace` flag.
    pub fn from_replace(replace: bool) -> Self {
        if replace {
            NavigationMode::Replace
        } else {
            NavigationMode::Push
        }
    }
}

/// Configuration supplied when history interception is installed.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Navigation used by [`SetParams::set`](crate::SetParams::set).
    /// Default: `Push`
    pub default_mode: NavigationMode,

    /// Whether writes delete keys absent from the supplied mapping.
    /// Default: true (full replace)
    pub remove_extras: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_mode: NavigationMode::Push,
            remove_extras: true,
        }
    }
}
