use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

/// Value of a single event field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    Sequence(Vec<String>),
}

impl FieldValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            FieldValue::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[String]> {
        match self {
            FieldValue::Scalar(_) => None,
            FieldValue::Sequence(items) => Some(items),
        }
    }

    /// Text substituted for a `%{name}` reference to this value.
    /// Sequences are joined with a comma.
    pub fn interpolated(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Scalar(s) => Cow::Borrowed(s),
            FieldValue::Sequence(items) => Cow::Owned(items.join(",")),
        }
    }

    /// Keeps the scalar, or the sequence elements, for which `keep` holds.
    /// Returns false when nothing is left and the field should go.
    pub(crate) fn retain<F>(&mut self, mut keep: F) -> bool
    where
        F: FnMut(&str) -> bool,
    {
        match self {
            FieldValue::Scalar(s) => keep(s.as_str()),
            FieldValue::Sequence(items) => {
                items.retain(|item| keep(item.as_str()));
                !items.is_empty()
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Scalar(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Scalar(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::Sequence(items)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(items: Vec<&str>) -> Self {
        FieldValue::Sequence(items.into_iter().map(str::to_string).collect())
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldValueVisitor;

        impl<'de> Visitor<'de> for FieldValueVisitor {
            type Value = FieldValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string, number, boolean or array of those")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<FieldValue, E> {
                Ok(FieldValue::Scalar(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<FieldValue, E> {
                Ok(FieldValue::Scalar(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<FieldValue, E> {
                Ok(FieldValue::Scalar(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<FieldValue, E> {
                Ok(FieldValue::Scalar(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<FieldValue, E> {
                Ok(FieldValue::Scalar(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<FieldValue, E> {
                Ok(FieldValue::Scalar(v.to_string()))
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<FieldValue, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(Element(item)) = seq.next_element()? {
                    items.push(item);
                }
                Ok(FieldValue::Sequence(items))
            }
        }

        deserializer.deserialize_any(FieldValueVisitor)
    }
}

/// One element of a sequence value; only flat scalars are accepted.
struct Element(String);

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ElementVisitor;

        impl<'de> Visitor<'de> for ElementVisitor {
            type Value = Element;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string, number or boolean")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Element, E> {
                Ok(Element(v.to_string()))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Element, E> {
                Ok(Element(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Element, E> {
                Ok(Element(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Element, E> {
                Ok(Element(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Element, E> {
                Ok(Element(v.to_string()))
            }
        }

        deserializer.deserialize_any(ElementVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// `None` for a field whose key is absent.
    pub name: Option<String>,
    pub value: FieldValue,
}

/// An ordered set of fields. Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    fields: Vec<Field>,
    /// Position in `fields` of each named field.
    index: HashMap<String, usize>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name`, replacing an existing value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        let name = name.into();
        let value = value.into();

        match self.index.get(&name) {
            Some(&idx) => Some(std::mem::replace(&mut self.fields[idx].value, value)),
            None => {
                self.index.insert(name.clone(), self.fields.len());
                self.fields.push(Field { name: Some(name), value });
                None
            }
        }
    }

    pub fn insert_unnamed(&mut self, value: impl Into<FieldValue>) {
        self.fields.push(Field { name: None, value: value.into() });
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.index.get(name).map(|&idx| &self.fields[idx].value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|f| f.name.as_deref())
    }

    /// Retains named fields for which `keep` holds. Unnamed fields are left alone.
    pub(crate) fn retain_named<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &mut FieldValue) -> bool,
    {
        self.fields.retain_mut(|field| match field.name.as_deref() {
            Some(name) => keep(name, &mut field.value),
            None => true,
        });
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (idx, field) in self.fields.iter().enumerate() {
            if let Some(name) = &field.name {
                self.index.insert(name.clone(), idx);
            }
        }
    }

    pub fn from_json(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(AppError::InvalidEvent("expected a JSON object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| AppError::InvalidEvent(e.to_string()))
    }
}

impl<K, V> FromIterator<(K, V)> for Event
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut event = Event::new();
        for (name, value) in iter {
            event.insert(name, value);
        }
        event
    }
}

impl Serialize for Event {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        for field in &self.fields {
            if let Some(name) = &field.name {
                map.serialize_entry(name, &field.value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EventVisitor;

        impl<'de> Visitor<'de> for EventVisitor {
            type Value = Event;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field names to values")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Event, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut event = Event::new();
                while let Some((name, value)) = access.next_entry::<String, FieldValue>()? {
                    event.insert(name, value);
                }
                Ok(event)
            }
        }

        deserializer.deserialize_map(EventVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut event: Event = vec![("a", "1"), ("b", "2")].into_iter().collect();
        let previous = event.insert("a", "3");

        assert_eq!(previous, Some(FieldValue::from("1")));
        assert_eq!(event.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(event.get("a"), Some(&FieldValue::from("3")));
    }

    #[test]
    fn test_from_json_keeps_document_order() {
        let event = Event::from_json(json!({
            "zeta": "z",
            "alpha": ["1", "2"],
            "count": 42,
            "enabled": true
        }))
        .unwrap();

        assert_eq!(event.names().collect::<Vec<_>>(), vec!["zeta", "alpha", "count", "enabled"]);
        assert_eq!(event.get("alpha"), Some(&FieldValue::from(vec!["1", "2"])));
        assert_eq!(event.get("count"), Some(&FieldValue::from("42")));
        assert_eq!(event.get("enabled"), Some(&FieldValue::from("true")));
    }

    #[test]
    fn test_from_json_rejects_nested_values() {
        assert!(Event::from_json(json!({"a": {"b": "c"}})).is_err());
        assert!(Event::from_json(json!({"a": [["b"]]})).is_err());
        assert!(Event::from_json(json!({"a": null})).is_err());
        assert!(Event::from_json(json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn test_serialize_skips_unnamed_fields() {
        let mut event = Event::new();
        event.insert("status", vec!["200", "404"]);
        event.insert_unnamed("orphan");

        assert_eq!(event.len(), 2);
        assert_eq!(serde_json::to_value(&event).unwrap(), json!({"status": ["200", "404"]}));
    }

    #[test]
    fn test_lookup_follows_retain() {
        let mut event: Event = vec![("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        event.retain_named(|name, _| name != "a");
        event.insert("a", "4");

        assert_eq!(event.names().collect::<Vec<_>>(), vec!["b", "c", "a"]);
        assert_eq!(event.get("c"), Some(&FieldValue::from("3")));
        assert_eq!(event.get("a"), Some(&FieldValue::from("4")));
    }

    #[test]
    fn test_from_json_with_many_fields() {
        let n = 50_000;
        let body: serde_json::Map<String, Value> = (0..n)
            .map(|i| (format!("f{:06}", i), Value::String(i.to_string())))
            .collect();

        let started = std::time::Instant::now();
        let event = Event::from_json(Value::Object(body)).unwrap();

        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert_eq!(event.len(), n);
        assert_eq!(event.get("f049999"), Some(&FieldValue::from("49999")));
        assert_eq!(event.names().next(), Some("f000000"));
    }

    #[test]
    fn test_sequence_interpolation_joins_with_comma() {
        let value = FieldValue::from(vec!["a", "b", "c"]);
        assert_eq!(value.interpolated(), "a,b,c");
        assert_eq!(FieldValue::from("x").interpolated(), "x");
    }

    #[test]
    fn test_retain_on_sequence_reports_emptiness() {
        let mut value = FieldValue::from(vec!["1", "2", "3"]);
        assert!(value.retain(|s| s != "2"));
        assert_eq!(value, FieldValue::from(vec!["1", "3"]));
        assert!(!value.retain(|_| false));
    }
}
