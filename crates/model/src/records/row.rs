use crate::core::value::Value;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};
use std::fmt;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
}

/// One entity returned by the list endpoint.
///
/// Fields keep the order the JSON object listed them in; rows are
/// heterogeneous, so two rows may carry different field sets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub field_values: Vec<FieldValue>,
}

impl Row {
    pub fn new(field_values: Vec<FieldValue>) -> Self {
        Row { field_values }
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut row = Row::default();
        for (name, value) in pairs {
            row.insert(name, value);
        }
        row
    }

    /// Sets a field, replacing an existing one with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.field_values.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.field_values.push(FieldValue { name, value }),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.field_values
            .iter()
            .find(|f| f.name == field)
            .map(|f| &f.value)
    }

    /// Value at `field`, with absent fields read as null.
    pub fn get_value(&self, field: &str) -> &Value {
        self.get(field).unwrap_or(&NULL)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.field_values.iter().map(|f| f.name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.field_values.iter().map(|f| &f.value)
    }

    pub fn len(&self) -> usize {
        self.field_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_values.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.field_values.len()))?;
        for field in &self.field_values {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object of column names to scalar values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
        let mut row = Row::new(Vec::with_capacity(access.size_hint().unwrap_or(0)));
        while let Some((name, value)) = access.next_entry::<String, Value>()? {
            row.insert(name, value);
        }
        Ok(row)
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RowVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_keeps_key_order() {
        let row: Row = serde_json::from_str(r#"{"B":1,"A":"x","C":null}"#).unwrap();
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["B", "A", "C"]);
        assert_eq!(row.get("B"), Some(&Value::Number(1.0)));
        assert_eq!(row.get("C"), Some(&Value::Null));
    }

    #[test]
    fn test_absent_field_reads_as_null() {
        let row = Row::from_pairs([("Name", "Ada")]);
        assert!(row.get("Age").is_none());
        assert!(row.get_value("Age").is_null());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut row = Row::from_pairs([("a", 1i64), ("b", 2i64)]);
        row.insert("a", 3i64);
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(row.get_value("a"), &Value::Number(3.0));
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(serde_json::from_str::<Row>("[1,2]").is_err());
        assert!(serde_json::from_str::<Row>("null").is_err());
    }
}
