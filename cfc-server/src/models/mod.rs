//! Request and response models
//!
//! Input shape is enforced by deserialization; a body that does not fit the
//! model is rejected with a ValidationError, not a panic.

pub mod post;
pub mod quiz;
pub mod resource;
pub mod user;
pub mod validation;

pub use post::{Comment, Post, PostContent, PostMetadata};
pub use quiz::{AnswerOption, Question, QuestionContent};
pub use resource::Resource;
pub use user::{Session, User, UserSummary};
pub use validation::ValidationError;

use cfc_store::{Document, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Serialize a model into a store document
pub(crate) fn to_document<T: Serialize>(model: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(model) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::failure(
            "encode",
            format!("expected an object, got {}", other),
        )),
        Err(e) => Err(StoreError::failure("encode", e)),
    }
}

/// Read a stored document back into a model
///
/// A stored document that no longer fits the model is a store failure.
pub(crate) fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| StoreError::failure("decode", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfc_store::ErrorKind;
    use serde_json::json;

    #[test]
    fn document_conversion() {
        let question: Question = serde_json::from_value(json!({
            "id": "65a1f0c2b3d4e5f601234567",
            "category": "rust",
            "question": {
                "text": "Which keyword moves a closure's captures?",
                "options": [{ "id": "a", "text": "move" }, { "id": "b", "text": "ref" }],
                "correct_answer": "a"
            }
        }))
        .unwrap();

        let doc = to_document(&question).unwrap();
        assert_eq!(doc["category"], "rust");

        let back: Question = from_document(doc).unwrap();
        assert_eq!(back, question);
    }

    #[test]
    fn stored_document_missing_fields_is_store_failure() {
        let mut doc = Document::new();
        doc.insert("title".into(), json!("only a title"));

        let err = from_document::<Resource>(doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreFailure);
    }
}
