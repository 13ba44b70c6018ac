//! OCR result payload.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parsed response payload from the OCR API.
///
/// The upstream API returns a free-form JSON document; this wrapper keeps
/// it intact for persistence and webhook delivery while exposing the
/// fields callers commonly need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct OcrResult(pub Value);

impl OcrResult {
    /// Build a result holding only extracted text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self(serde_json::json!({ "text": text.into() }))
    }

    /// Extracted text, when the payload carries a top-level `text` field.
    pub fn text(&self) -> Option<String> {
        self.0.get("text").and_then(Value::as_str).map(String::from)
    }

    /// Borrow the raw payload.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume into the raw payload.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for OcrResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_extraction() {
        let result: OcrResult = serde_json::from_str(
            r#"{"text": "hello world", "pages": 2, "confidence": 0.98}"#,
        )
        .unwrap();

        assert_eq!(result.text(), Some("hello world".to_string()));
        assert_eq!(result.as_value()["pages"], 2);
    }

    #[test]
    fn test_text_absent() {
        let result = OcrResult(serde_json::json!({ "pages": [] }));
        assert_eq!(result.text(), None);
    }
}
