//! Redirect rules and the immutable lookup table built from them.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// One routing rule as it appears in a redirect document.
///
/// Missing and null fields decode as empty strings; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectEntry {
    /// Request path to match, including any query string.
    #[serde(deserialize_with = "null_as_empty")]
    pub path: String,

    /// Target URL issued in the `Location` header.
    #[serde(deserialize_with = "null_as_empty")]
    pub url: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl RedirectEntry {
    pub fn new(path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
        }
    }
}

/// Path-to-URL mapping consulted on every request.
///
/// Built once from an ordered sequence of pairs. When a path appears more
/// than once, the last occurrence wins. Lookups are exact string matches:
/// no trailing-slash, case or percent-encoding normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectTable {
    targets: HashMap<String, String>,
}

impl RedirectTable {
    /// Build a table from `(path, url)` pairs, inserting in iteration order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut targets = HashMap::new();
        for (path, url) in pairs {
            targets.insert(path.into(), url.into());
        }
        Self { targets }
    }

    /// Build a table from parsed document entries.
    pub fn from_entries(entries: Vec<RedirectEntry>) -> Self {
        Self::from_pairs(entries.into_iter().map(|e| (e.path, e.url)))
    }

    /// Target URL for an exact request path, if mapped.
    pub fn lookup(&self, path: &str) -> Option<&str> {
        self.targets.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// All rules, sorted by path.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut rules: Vec<_> = self
            .targets
            .iter()
            .map(|(p, u)| (p.as_str(), u.as_str()))
            .collect();
        rules.sort_unstable();
        rules
    }
}

impl<K, V> FromIterator<(K, V)> for RedirectTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}
