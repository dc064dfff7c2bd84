//! Translation between JSON wire bodies and domain records.

use axum::body::Bytes;
use dinosaur_domain::{Dinosaur, DinosaurId, NewDinosaur};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Client input that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Body was not a JSON object
    #[error("malformed body")]
    MalformedBody,

    /// A required string field was absent or not a string
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Path segment was not a base-10 integer
    #[error("invalid id: {0}")]
    InvalidId(String),
}

/// Wire shape of a dinosaur, all fields included
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DinosaurBody {
    /// Store-assigned id
    pub id: i64,
    /// Name of the dinosaur
    pub name: String,
    /// Free-form description
    pub description: String,
}

impl From<&Dinosaur> for DinosaurBody {
    fn from(dinosaur: &Dinosaur) -> Self {
        Self {
            id: dinosaur.id.value(),
            name: dinosaur.name.clone(),
            description: dinosaur.description.clone(),
        }
    }
}

/// Decode a `POST /dinosaur` body into an unsaved record.
///
/// Unknown fields, including a client-supplied `id`, are ignored.
pub fn decode_create_request(raw: &[u8]) -> Result<NewDinosaur, DecodeError> {
    let value: Value = serde_json::from_slice(raw).map_err(|_| DecodeError::MalformedBody)?;
    let object = value.as_object().ok_or(DecodeError::MalformedBody)?;

    let field = |name: &'static str| {
        object
            .get(name)
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingField(name))
    };

    Ok(NewDinosaur::new(field("name")?, field("description")?))
}

/// Decode an `:id` path segment
pub fn decode_id(raw: &str) -> Result<DinosaurId, DecodeError> {
    raw.parse::<i64>()
        .map(DinosaurId::from_value)
        .map_err(|_| DecodeError::InvalidId(raw.to_string()))
}

/// Encode one record as a JSON object
pub fn encode_dinosaur(dinosaur: &Dinosaur) -> Result<Bytes, serde_json::Error> {
    serde_json::to_vec(&DinosaurBody::from(dinosaur)).map(Bytes::from)
}

/// Encode a list of records as a JSON array
pub fn encode_dinosaurs(dinosaurs: &[Dinosaur]) -> Result<Bytes, serde_json::Error> {
    let bodies: Vec<DinosaurBody> = dinosaurs.iter().map(DinosaurBody::from).collect();
    serde_json::to_vec(&bodies).map(Bytes::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_create_request() {
        let decoded =
            decode_create_request(br#"{"name":"Tyrannosaurus","description":"Large theropod"}"#)
                .unwrap();
        assert_eq!(decoded, NewDinosaur::new("Tyrannosaurus", "Large theropod"));
    }

    #[test]
    fn test_decode_ignores_extra_fields_and_client_id() {
        let decoded = decode_create_request(
            br#"{"id":99,"name":"Stegosaurus","description":"Plated","era":"Jurassic"}"#,
        )
        .unwrap();
        assert_eq!(decoded, NewDinosaur::new("Stegosaurus", "Plated"));
    }

    #[test]
    fn test_decode_malformed_body() {
        assert_eq!(
            decode_create_request(b"not json"),
            Err(DecodeError::MalformedBody)
        );
        assert_eq!(decode_create_request(b""), Err(DecodeError::MalformedBody));
        assert_eq!(
            decode_create_request(br#"["name","description"]"#),
            Err(DecodeError::MalformedBody)
        );
    }

    #[test]
    fn test_decode_missing_or_mistyped_field() {
        assert_eq!(
            decode_create_request(br#"{"name":"Stegosaurus"}"#),
            Err(DecodeError::MissingField("description"))
        );
        assert_eq!(
            decode_create_request(br#"{"description":"Plated"}"#),
            Err(DecodeError::MissingField("name"))
        );
        assert_eq!(
            decode_create_request(br#"{"name":7,"description":"Plated"}"#),
            Err(DecodeError::MissingField("name"))
        );
        assert_eq!(
            decode_create_request(br#"{"name":"Stegosaurus","description":null}"#),
            Err(DecodeError::MissingField("description"))
        );
    }

    #[test]
    fn test_decode_id() {
        assert_eq!(decode_id("42"), Ok(DinosaurId::from_value(42)));
        assert_eq!(decode_id("-3"), Ok(DinosaurId::from_value(-3)));
        assert_eq!(
            decode_id("abc"),
            Err(DecodeError::InvalidId("abc".to_string()))
        );
        assert!(decode_id("4.2").is_err());
        assert!(decode_id("").is_err());
        assert!(decode_id("99999999999999999999").is_err());
    }

    #[test]
    fn test_encode_includes_all_fields() {
        let dinosaur = NewDinosaur::new("Tyrannosaurus", "Large theropod")
            .with_id(DinosaurId::from_value(1));
        let encoded = encode_dinosaur(&dinosaur).unwrap();
        let value: Value = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": 1, "name": "Tyrannosaurus", "description": "Large theropod"})
        );
    }

    #[test]
    fn test_encode_empty_list() {
        assert_eq!(&encode_dinosaurs(&[]).unwrap()[..], b"[]");
    }
}
