//! Resource document encoding.
//!
//! Capstan endpoints exchange resources inside a document envelope: the
//! payload lives under a top-level `data` member carrying the resource
//! `type`, an optional `id`, an `attributes` object, and typed linkage under
//! `relationships`. Implement [`Resource`] for a plain serde struct and the
//! client encodes and decodes the envelope around it.
//!
//! A struct field named `id` becomes the envelope `id` member, fields listed
//! in [`Resource::RELATIONSHIPS`] become relationship entries, and everything
//! else lands in `attributes`. Decoding reverses the mapping.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Media type for resource documents.
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// A type that travels inside a resource document envelope.
pub trait Resource: Serialize + DeserializeOwned {
    /// Wire name of this resource type (the envelope `type` member).
    const KIND: &'static str;

    /// Field names that hold linkage to other resources instead of plain
    /// attributes. Defaults to none.
    const RELATIONSHIPS: &'static [&'static str] = &[];
}

// ---------------------------------------------------------------------------
// Typed linkage
// ---------------------------------------------------------------------------

/// Linkage to another resource, carrying only its identifier.
///
/// On the wire this is a resource identifier object. The linked type's
/// [`Resource::KIND`] supplies the `type` member on encode and is checked
/// against it on decode.
pub struct Related<T> {
    /// Identifier of the linked resource.
    pub id: String,
    marker: PhantomData<fn() -> T>,
}

impl<T> Related<T> {
    /// Link to the resource with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            marker: PhantomData,
        }
    }
}

impl<T> Clone for Related<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Related<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Related<T> {}

impl<T: Resource> fmt::Debug for Related<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Related")
            .field("kind", &T::KIND)
            .field("id", &self.id)
            .finish()
    }
}

impl<T: Resource> Serialize for Related<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Related", 2)?;
        state.serialize_field("type", T::KIND)?;
        state.serialize_field("id", &self.id)?;
        state.end()
    }
}

impl<'de, T: Resource> Deserialize<'de> for Related<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let identifier = IdentifierRepr::deserialize(deserializer)?;
        if identifier.kind != T::KIND {
            return Err(serde::de::Error::custom(format!(
                "expected a `{}` identifier, found `{}`",
                T::KIND,
                identifier.kind
            )));
        }
        Ok(Related::new(identifier.id))
    }
}

/// Resource identifier object as it appears on the wire.
#[derive(Deserialize)]
struct IdentifierRepr {
    #[serde(rename = "type")]
    kind: String,
    id: String,
}

// ---------------------------------------------------------------------------
// Wire representation
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct DocumentRepr {
    data: PrimaryData,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PrimaryData {
    Many(Vec<ResourceRepr>),
    One(ResourceRepr),
    Null,
}

#[derive(Serialize, Deserialize)]
struct ResourceRepr {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    relationships: BTreeMap<String, RelationshipRepr>,
}

#[derive(Serialize, Deserialize)]
struct RelationshipRepr {
    data: Value,
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a resource as a single-resource document.
pub fn marshal<T: Resource>(value: &T) -> Result<Vec<u8>> {
    let document = DocumentRepr {
        data: PrimaryData::One(to_resource_repr(value)?),
    };
    serde_json::to_vec(&document).map_err(|e| Error::Encode(e.to_string()))
}

/// Decode a single-resource document.
pub fn unmarshal<T: Resource>(bytes: &[u8]) -> Result<T> {
    let document: DocumentRepr =
        serde_json::from_slice(bytes).map_err(|e| Error::Decode(e.to_string()))?;
    match document.data {
        PrimaryData::One(repr) => from_resource_repr(repr),
        PrimaryData::Many(_) => Err(Error::Decode(format!(
            "expected a single `{}` resource, found a list document",
            T::KIND
        ))),
        PrimaryData::Null => Err(Error::Decode(format!(
            "expected a single `{}` resource, found null primary data",
            T::KIND
        ))),
    }
}

/// Decode a list document, preserving server order.
pub fn unmarshal_list<T: Resource>(bytes: &[u8]) -> Result<Vec<T>> {
    let document: DocumentRepr =
        serde_json::from_slice(bytes).map_err(|e| Error::Decode(e.to_string()))?;
    match document.data {
        PrimaryData::Many(reprs) => reprs.into_iter().map(from_resource_repr).collect(),
        PrimaryData::One(_) => Err(Error::Decode(format!(
            "expected a list of `{}` resources, found a single-resource document",
            T::KIND
        ))),
        PrimaryData::Null => Err(Error::Decode(format!(
            "expected a list of `{}` resources, found null primary data",
            T::KIND
        ))),
    }
}

fn to_resource_repr<T: Resource>(value: &T) -> Result<ResourceRepr> {
    let raw = serde_json::to_value(value).map_err(|e| Error::Encode(e.to_string()))?;
    let mut fields = match raw {
        Value::Object(fields) => fields,
        other => {
            return Err(Error::Encode(format!(
                "`{}` must serialize to an object, got {}",
                T::KIND,
                value_kind(&other)
            )))
        }
    };

    // An `id` field moves to the envelope. Absent or null means the server
    // assigns one, so the envelope member is omitted entirely.
    let id = match fields.remove("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id),
        Some(other) => {
            return Err(Error::Encode(format!(
                "`{}` id must be a string, got {}",
                T::KIND,
                value_kind(&other)
            )))
        }
    };

    let mut relationships = BTreeMap::new();
    for name in T::RELATIONSHIPS {
        if let Some(data) = fields.remove(*name) {
            relationships.insert((*name).to_string(), RelationshipRepr { data });
        }
    }

    Ok(ResourceRepr {
        kind: T::KIND.to_string(),
        id,
        attributes: fields,
        relationships,
    })
}

fn from_resource_repr<T: Resource>(repr: ResourceRepr) -> Result<T> {
    if repr.kind != T::KIND {
        return Err(Error::Decode(format!(
            "expected a `{}` resource, found `{}`",
            T::KIND,
            repr.kind
        )));
    }

    let mut fields = repr.attributes;
    for (name, relationship) in repr.relationships {
        fields.insert(name, relationship.data);
    }
    if let Some(id) = repr.id {
        fields.insert("id".to_string(), Value::String(id));
    }

    serde_json::from_value(Value::Object(fields)).map_err(|e| Error::Decode(e.to_string()))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
