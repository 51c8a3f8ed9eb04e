//! The contract the adapter requires from host records.

use serde_json::{Map, Value};

/// A record the adapter can persist.
///
/// This is the collaborator contract a host framework's live objects must
/// satisfy: an identity attribute (named by [`Model::id_attribute`], `id`
/// by convention), a setter the store uses to copy a generated identifier
/// back onto the record, and a plain-value serializer.
pub trait Model {
    /// The record's identifier, if one has been assigned.
    fn id(&self) -> Option<String>;

    /// Name of the identity attribute.
    fn id_attribute(&self) -> &str {
        "id"
    }

    /// Writes a generated identifier onto the identity attribute.
    fn set_id(&mut self, id: String);

    /// The JSON-serializable form of the record, independent of the live
    /// object.
    fn to_value(&self) -> Value;
}

/// A plain JSON-object record, usable without a host framework.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    attributes: Map<String, Value>,
    id_attribute: String,
}

impl Record {
    pub fn new() -> Self {
        Self::with_id_attribute("id")
    }

    /// A record whose identity lives under a non-default attribute name.
    pub fn with_id_attribute(id_attribute: impl Into<String>) -> Self {
        Self {
            attributes: Map::new(),
            id_attribute: id_attribute.into(),
        }
    }

    /// Builds a record from a JSON value. Anything but an object becomes
    /// an empty record.
    pub fn from_value(value: Value) -> Self {
        let attributes = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            attributes,
            id_attribute: "id".to_owned(),
        }
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

/// Records serialize as their plain value.
impl serde::Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}

/// Records deserialize from a JSON object, with the default identity
/// attribute.
impl<'de> serde::Deserialize<'de> for Record {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let attributes: Map<String, Value> = serde::Deserialize::deserialize(deserializer)?;
        Ok(Self {
            attributes,
            id_attribute: "id".to_owned(),
        })
    }
}

impl Model for Record {
    fn id(&self) -> Option<String> {
        match self.attributes.get(&self.id_attribute)? {
            Value::String(id) => Some(id.clone()),
            Value::Null => None,
            // Non-string identifiers participate in the index by their
            // string form.
            other => Some(other.to_string()),
        }
    }

    fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    fn set_id(&mut self, id: String) {
        let attribute = self.id_attribute.clone();
        self.attributes.insert(attribute, Value::String(id));
    }

    fn to_value(&self) -> Value {
        Value::Object(self.attributes.clone())
    }
}
