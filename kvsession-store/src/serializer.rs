//! Session payload serializers.
//!
//! The store holds one [`SessionSerializer`], chosen at construction time.
//! [`BinarySerializer`] is the default.

use crate::error::SerializerError;
use crate::traits::Values;

/// Converts the session value mapping to and from the bytes stored in the cache.
///
/// Anything an implementation serializes successfully must deserialize back
/// to an equal mapping.
pub trait SessionSerializer: Send + Sync {
    /// Encode `values`.
    fn serialize(&self, values: &Values) -> Result<Vec<u8>, SerializerError>;

    /// Decode `data` into `values`.
    fn deserialize(&self, data: &[u8], values: &mut Values) -> Result<(), SerializerError>;
}

/// MessagePack encoding of the whole mapping.
///
/// Supports every [`SessionKey`](crate::SessionKey) variant. Decoding
/// replaces the contents of the target mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinarySerializer;

impl SessionSerializer for BinarySerializer {
    fn serialize(&self, values: &Values) -> Result<Vec<u8>, SerializerError> {
        rmp_serde::to_vec(values).map_err(|e| SerializerError::Encode {
            location: "BinarySerializer::serialize",
            message: e.to_string(),
        })
    }

    fn deserialize(&self, data: &[u8], values: &mut Values) -> Result<(), SerializerError> {
        let decoded: Values = rmp_serde::from_slice(data).map_err(|e| SerializerError::Decode {
            location: "BinarySerializer::deserialize",
            message: e.to_string(),
        })?;
        *values = decoded;
        Ok(())
    }
}

/// JSON object encoding. Human readable, string keys only.
///
/// Serializing fails on the first non-string key, before any output is
/// produced. Deserializing MERGES the decoded entries into the target
/// mapping: entries already present and absent from the payload are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl SessionSerializer for JsonSerializer {
    fn serialize(&self, values: &Values) -> Result<Vec<u8>, SerializerError> {
        let mut object = serde_json::Map::with_capacity(values.len());
        for (key, value) in values {
            let Some(key) = key.as_str() else {
                return Err(SerializerError::NonStringKey {
                    location: "JsonSerializer::serialize",
                    key: key.clone(),
                });
            };
            object.insert(key.to_string(), value.clone());
        }

        serde_json::to_vec(&object).map_err(|e| SerializerError::Encode {
            location: "JsonSerializer::serialize",
            message: e.to_string(),
        })
    }

    fn deserialize(&self, data: &[u8], values: &mut Values) -> Result<(), SerializerError> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(data)
            .map_err(|e| SerializerError::Decode {
                location: "JsonSerializer::deserialize",
                message: e.to_string(),
            })?;

        values.extend(object.into_iter().map(|(k, v)| (k.into(), v)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SessionKey;
    use serde_json::json;

    fn string_keyed() -> Values {
        let mut values = Values::new();
        values.insert("user_id".into(), json!(123));
        values.insert("name".into(), json!("alice"));
        values.insert("roles".into(), json!(["admin", "ops"]));
        values.insert("prefs".into(), json!({"theme": "dark", "beta": true}));
        values.insert("ratio".into(), json!(0.25));
        values.insert("negative".into(), json!(-42));
        values.insert("nothing".into(), json!(null));
        values
    }

    #[test]
    fn test_binary_round_trip_mixed_keys() {
        let mut values = string_keyed();
        values.insert(SessionKey::Int(7), json!("seven"));
        values.insert(SessionKey::Int(-1), json!([1, 2]));
        values.insert(SessionKey::Bool(true), json!({"nested": 1}));

        let bytes = BinarySerializer.serialize(&values).unwrap();
        let mut decoded = Values::new();
        BinarySerializer.deserialize(&bytes, &mut decoded).unwrap();

        assert_eq!(decoded, values);
    }

    #[test]
    fn test_binary_replaces_target() {
        let values = string_keyed();
        let bytes = BinarySerializer.serialize(&values).unwrap();

        let mut target = Values::new();
        target.insert("stale".into(), json!(1));
        BinarySerializer.deserialize(&bytes, &mut target).unwrap();

        assert!(!target.contains_key(&SessionKey::from("stale")));
        assert_eq!(target, values);
    }

    #[test]
    fn test_binary_decode_error_has_location() {
        let mut target = Values::new();
        let err = BinarySerializer
            .deserialize(&[0xc1, 0x00, 0xff], &mut target)
            .unwrap_err();
        assert_eq!(err.location(), "BinarySerializer::deserialize");
        assert!(err.is_decode());
    }

    #[test]
    fn test_json_round_trip() {
        let values = string_keyed();
        let bytes = JsonSerializer.serialize(&values).unwrap();

        let mut decoded = Values::new();
        JsonSerializer.deserialize(&bytes, &mut decoded).unwrap();

        assert_eq!(decoded, values);
    }

    #[test]
    fn test_json_is_readable() {
        let mut values = Values::new();
        values.insert("user".into(), json!("bob"));
        let bytes = JsonSerializer.serialize(&values).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), r#"{"user":"bob"}"#);
    }

    #[test]
    fn test_json_rejects_non_string_key() {
        let mut values = string_keyed();
        values.insert(SessionKey::Int(1), json!("one"));

        let err = JsonSerializer.serialize(&values).unwrap_err();
        match &err {
            SerializerError::NonStringKey { location, key } => {
                assert_eq!(*location, "JsonSerializer::serialize");
                assert_eq!(*key, SessionKey::Int(1));
            }
            other => panic!("expected NonStringKey, got {:?}", other),
        }
        assert!(err.to_string().contains("non-string key"));
    }

    #[test]
    fn test_json_merges_into_target() {
        let mut payload = Values::new();
        payload.insert("a".into(), json!(1));
        payload.insert("b".into(), json!(2));
        let bytes = JsonSerializer.serialize(&payload).unwrap();

        let mut target = Values::new();
        target.insert("b".into(), json!("old"));
        target.insert("keep".into(), json!(true));
        target.insert(SessionKey::Int(9), json!("int key survives"));

        JsonSerializer.deserialize(&bytes, &mut target).unwrap();

        assert_eq!(target.len(), 4);
        assert_eq!(target[&SessionKey::from("a")], json!(1));
        assert_eq!(target[&SessionKey::from("b")], json!(2));
        assert_eq!(target[&SessionKey::from("keep")], json!(true));
        assert_eq!(target[&SessionKey::Int(9)], json!("int key survives"));
    }

    #[test]
    fn test_json_decode_error_has_location() {
        let mut target = Values::new();
        target.insert("untouched".into(), json!(1));

        let err = JsonSerializer.deserialize(b"{not json", &mut target).unwrap_err();
        assert_eq!(err.location(), "JsonSerializer::deserialize");
        assert_eq!(target.len(), 1);
    }

    #[test]
    fn test_empty_mapping() {
        for serializer in [&BinarySerializer as &dyn SessionSerializer, &JsonSerializer] {
            let bytes = serializer.serialize(&Values::new()).unwrap();
            let mut decoded = Values::new();
            serializer.deserialize(&bytes, &mut decoded).unwrap();
            assert!(decoded.is_empty());
        }
    }
}
