//! Identifier translation between the store and the API
//!
//! Documents leave the store with a BSON `_id` holding an ObjectId and reach
//! callers with an `id` field holding the 24-character hex form. Every record
//! operation goes through this module; nothing else renames the field.

use mongodb::bson::{self, oid::ObjectId, Bson};
use serde_json::{Map, Number, Value};

/// A document as seen by callers: ordered field name → JSON value.
pub type Document = Map<String, Value>;

/// Identifier field exposed to callers
pub const ID_FIELD: &str = "id";

/// Identifier field used by the store
pub const INTERNAL_ID_FIELD: &str = "_id";

/// Identifier string that does not decode to an ObjectId
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a well-formed identifier")]
pub struct InvalidId(pub String);

/// Caller document that cannot be stored as given
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error(transparent)]
    InvalidId(#[from] InvalidId),

    #[error("integer {0} does not fit in a signed 64-bit value")]
    IntegerOutOfRange(String),
}

/// Render a store identifier in its external hex form.
pub fn internal_to_external(id: &ObjectId) -> String {
    id.to_hex()
}

/// Parse an external identifier back into the store form.
///
/// # Example
/// ```
/// use cfc_store::id::{external_to_internal, internal_to_external};
///
/// let oid = external_to_internal("65a1f0c2b3d4e5f601234567").unwrap();
/// assert_eq!(internal_to_external(&oid), "65a1f0c2b3d4e5f601234567");
/// assert!(external_to_internal("not-an-id").is_err());
/// ```
pub fn external_to_internal(id: &str) -> Result<ObjectId, InvalidId> {
    ObjectId::parse_str(id).map_err(|_| InvalidId(id.to_owned()))
}

/// Convert a stored document into the caller-facing form.
///
/// `_id` becomes a leading `id` field; every other value is converted to JSON
/// in place, preserving field order.
pub fn to_external(mut doc: bson::Document) -> Document {
    let mut out = Document::new();
    if let Some(id) = doc.remove(INTERNAL_ID_FIELD) {
        out.insert(ID_FIELD.to_owned(), bson_to_json(id));
    }
    for (key, value) in doc {
        out.insert(key, bson_to_json(value));
    }
    out
}

/// Convert a caller document into the stored form.
///
/// A string `id` becomes the ObjectId `_id`; a null `id` is treated as absent
/// so the store assigns one. A caller-supplied `_id` is never passed through.
pub fn to_internal(doc: Document) -> Result<bson::Document, ConversionError> {
    let id = match doc.get(ID_FIELD) {
        None | Some(Value::Null) => None,
        Some(value) => Some(id_from_value(value)?),
    };

    let mut out = bson::Document::new();
    if let Some(oid) = id {
        out.insert(INTERNAL_ID_FIELD, oid);
    }
    for (key, value) in doc {
        if key == ID_FIELD || key == INTERNAL_ID_FIELD {
            continue;
        }
        out.insert(key, json_to_bson(value)?);
    }
    Ok(out)
}

/// Convert an equality filter into the stored form.
///
/// Unlike [`to_internal`], an `id` constraint must be a well-formed string.
pub fn filter_to_internal(filter: &Document) -> Result<bson::Document, ConversionError> {
    let mut out = bson::Document::new();
    for (key, value) in filter {
        if key == ID_FIELD {
            out.insert(INTERNAL_ID_FIELD, id_from_value(value)?);
        } else {
            out.insert(key.clone(), json_to_bson(value.clone())?);
        }
    }
    Ok(out)
}

fn id_from_value(value: &Value) -> Result<ObjectId, InvalidId> {
    match value {
        Value::String(s) => external_to_internal(s),
        other => Err(InvalidId(other.to_string())),
    }
}

/// Convert a JSON value to BSON.
///
/// Integers above `i64::MAX` have no BSON integer form and are rejected.
pub fn json_to_bson(value: Value) -> Result<Bson, ConversionError> {
    let bson = match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Bson::Int64(i)
            } else if n.is_u64() {
                return Err(ConversionError::IntegerOutOfRange(n.to_string()));
            } else {
                Bson::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Bson::String(s),
        Value::Array(items) => Bson::Array(
            items
                .into_iter()
                .map(json_to_bson)
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => {
            let mut doc = bson::Document::new();
            for (key, value) in map {
                doc.insert(key, json_to_bson(value)?);
            }
            Bson::Document(doc)
        }
    };
    Ok(bson)
}

/// Convert a BSON value to JSON.
///
/// ObjectIds render as hex strings and datetimes as RFC 3339, so no extended
/// JSON wrappers reach callers for the types this API stores.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::from(i),
        Bson::Int64(i) => Value::from(i),
        Bson::Double(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        Bson::String(s) => Value::String(s),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => Value::Object(
            doc.into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        Bson::ObjectId(oid) => Value::String(internal_to_external(&oid)),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or(Value::Null),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use serde_json::json;

    fn object(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn round_trip_preserves_identifier() {
        for _ in 0..32 {
            let oid = ObjectId::new();
            let external = internal_to_external(&oid);
            assert_eq!(external.len(), 24);
            assert!(external.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(external_to_internal(&external).unwrap(), oid);
        }
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert!(external_to_internal("").is_err());
        assert!(external_to_internal("xyz").is_err());
        assert!(external_to_internal("65a1f0c2b3d4e5f60123456").is_err());
        assert!(external_to_internal("65a1f0c2b3d4e5f60123456z").is_err());
    }

    #[test]
    fn to_external_moves_id_first() {
        let oid = ObjectId::new();
        let stored = doc! { "title": "A", "_id": oid, "likes": 3_i32 };

        let doc = to_external(stored);
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "title", "likes"]);
        assert_eq!(doc["id"], json!(oid.to_hex()));
        assert_eq!(doc["likes"], json!(3));
        assert!(!doc.contains_key("_id"));
    }

    #[test]
    fn to_internal_uses_caller_id() {
        let oid = ObjectId::new();
        let input = object(json!({ "title": "A", "id": oid.to_hex() }));

        let stored = to_internal(input).unwrap();
        assert_eq!(stored.get_object_id("_id").unwrap(), oid);
        assert!(!stored.contains_key("id"));
        assert_eq!(stored.get_str("title").unwrap(), "A");
    }

    #[test]
    fn to_internal_without_id_leaves_assignment_to_store() {
        let stored = to_internal(object(json!({ "title": "A", "id": null }))).unwrap();
        assert!(!stored.contains_key("_id"));
        assert!(!stored.contains_key("id"));
    }

    #[test]
    fn to_internal_drops_raw_internal_id() {
        let stored = to_internal(object(json!({ "_id": "sneaky", "title": "A" }))).unwrap();
        assert!(!stored.contains_key("_id"));
    }

    #[test]
    fn to_internal_rejects_bad_id() {
        assert!(to_internal(object(json!({ "id": "nope" }))).is_err());
        assert!(to_internal(object(json!({ "id": 42 }))).is_err());
    }

    #[test]
    fn filter_translates_id() {
        let oid = ObjectId::new();
        let filter = object(json!({ "id": oid.to_hex(), "type": "note" }));
        let internal = filter_to_internal(&filter).unwrap();
        assert_eq!(internal.get_object_id("_id").unwrap(), oid);
        assert_eq!(internal.get_str("type").unwrap(), "note");

        assert!(filter_to_internal(&object(json!({ "id": null }))).is_err());
    }

    #[test]
    fn nested_values_survive_conversion() {
        let value = json!({
            "metadata": { "tags": ["rust", "web"], "likes": 0 },
            "content": { "images": null, "score": 1.5 }
        });
        let back = bson_to_json(json_to_bson(value.clone()).unwrap());
        assert_eq!(back, value);
    }

    #[test]
    fn oversized_integers_are_rejected() {
        let err = json_to_bson(json!({ "views": [u64::MAX] })).unwrap_err();
        assert_eq!(
            err,
            ConversionError::IntegerOutOfRange(u64::MAX.to_string())
        );

        assert_eq!(json_to_bson(json!(i64::MAX)).unwrap(), Bson::Int64(i64::MAX));
        assert!(to_internal(object(json!({ "n": u64::MAX }))).is_err());
        assert!(filter_to_internal(&object(json!({ "n": u64::MAX }))).is_err());
    }

    #[test]
    fn datetimes_render_as_rfc3339() {
        let dt = bson::DateTime::from_millis(0);
        assert_eq!(bson_to_json(Bson::DateTime(dt)), json!("1970-01-01T00:00:00Z"));
    }
}
