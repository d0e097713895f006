use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use super::PruneFilter;
use crate::error::Result;

/// Matches field names that still hold an unresolved `%{...}` reference.
/// Add it to `blacklist_names` to drop such fields.
pub const UNRESOLVED_REFERENCE: &str = r"%\{[^}]+\}";

/// Declarative prune rules. Every part is optional; the default keeps
/// every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PruneConfig {
    pub whitelist_names: Vec<String>,
    pub blacklist_names: Vec<String>,
    pub whitelist_values: ValuePatternMap,
    pub blacklist_values: ValuePatternMap,
    pub interpolate: bool,
}

impl PruneConfig {
    /// Compiles the rules into a reusable filter.
    pub fn build(&self) -> Result<PruneFilter> {
        PruneFilter::new(self)
    }
}

/// Name pattern → value pattern pairs, kept in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValuePatternMap(Vec<(String, String)>);

impl ValuePatternMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pair. A repeated name pattern replaces the earlier value pattern.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ValuePatternMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ValuePatternMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl Serialize for ValuePatternMap {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ValuePatternMap {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValuePatternMapVisitor;

        impl<'de> Visitor<'de> for ValuePatternMapVisitor {
            type Value = ValuePatternMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of name patterns to value patterns")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<ValuePatternMap, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = ValuePatternMap::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    map.insert(name, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ValuePatternMapVisitor)
    }
}
