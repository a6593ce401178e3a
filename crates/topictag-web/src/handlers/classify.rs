//! Topic classification endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{Map, Value};
use topictag_model::Prediction;

use crate::error::ApiError;
use crate::state::SharedState;

/// Body of `POST /classify`, read leniently from any JSON object.
///
/// A field that is absent or falsy (`null`, `false`, `0`, `""`, `[]`, `{}`)
/// is treated as missing. Other scalars are taken by their display form.
#[derive(Debug, Default, PartialEq)]
pub struct ClassificationRequest {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
}

impl ClassificationRequest {
    /// Pick the two fields out of a decoded body. Anything but an object
    /// is a malformed request.
    pub fn from_json(body: &Value) -> Result<Self, ApiError> {
        let fields = body.as_object().ok_or_else(|| {
            ApiError::Internal("request body must be a JSON object".to_string())
        })?;
        Ok(Self {
            title: text_field(fields, "title"),
            abstract_text: text_field(fields, "abstract"),
        })
    }

    /// The model input for this request, or a validation error when
    /// either field is missing or empty.
    pub fn formatted_input(&self) -> Result<String, ApiError> {
        match (self.title.as_deref(), self.abstract_text.as_deref()) {
            (Some(title), Some(abstract_text)) if !title.is_empty() && !abstract_text.is_empty() => {
                Ok(format_input(title, abstract_text))
            }
            _ => Err(ApiError::missing_fields()),
        }
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("True".to_string()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// The title/abstract layout the OpenAlex model was fine-tuned on.
pub fn format_input(title: &str, abstract_text: &str) -> String {
    format!("<TITLE> {title}\n<ABSTRACT> {abstract_text}")
}

/// POST /classify: top-k topic predictions for a title/abstract pair
pub async fn classify(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<Prediction>>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::Internal(e.body_text()))?;
    let input = ClassificationRequest::from_json(&body)?.formatted_input()?;

    let classifier = Arc::clone(&state.classifier);
    let predictions = tokio::task::spawn_blocking(move || classifier.classify(&input))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    tracing::debug!("Returning {} predictions", predictions.len());
    Ok(Json(predictions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(title: Option<&str>, abstract_text: Option<&str>) -> ClassificationRequest {
        ClassificationRequest {
            title: title.map(str::to_string),
            abstract_text: abstract_text.map(str::to_string),
        }
    }

    #[test]
    fn test_format_input_layout() {
        assert_eq!(
            format_input("Deep learning for NLP", "We study transformer models."),
            "<TITLE> Deep learning for NLP\n<ABSTRACT> We study transformer models."
        );
    }

    #[test]
    fn test_formatted_input_is_deterministic() {
        let req = request(Some("A"), Some("B"));
        assert_eq!(req.formatted_input().unwrap(), req.formatted_input().unwrap());
    }

    #[test]
    fn test_missing_or_empty_fields_are_rejected() {
        let cases = [
            request(None, Some("x")),
            request(Some("x"), None),
            request(Some(""), Some("x")),
            request(Some("x"), Some("")),
            request(None, None),
        ];
        for req in cases {
            assert!(matches!(req.formatted_input(), Err(ApiError::Validation(_))), "{req:?}");
        }
    }

    #[test]
    fn test_abstract_field_name_on_the_wire() {
        let req = ClassificationRequest::from_json(&json!({ "title": "T", "abstract": "A", "extra": 1 })).unwrap();
        assert_eq!(req, request(Some("T"), Some("A")));
    }

    #[test]
    fn test_falsy_values_count_as_missing() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            let req = ClassificationRequest::from_json(&json!({ "title": falsy, "abstract": "x" })).unwrap();
            assert!(req.title.is_none(), "{falsy}");
            assert!(matches!(req.formatted_input(), Err(ApiError::Validation(_))));
        }
    }

    #[test]
    fn test_other_scalars_use_their_display_form() {
        let req = ClassificationRequest::from_json(&json!({ "title": 2024, "abstract": true })).unwrap();
        assert_eq!(req.formatted_input().unwrap(), "<TITLE> 2024\n<ABSTRACT> True");
    }

    #[test]
    fn test_non_object_body_is_malformed() {
        for body in [json!(["Deep learning", "We study"]), json!("text"), json!(null)] {
            let err = ClassificationRequest::from_json(&body).unwrap_err();
            assert!(matches!(err, ApiError::Internal(_)), "{body}");
        }
    }
}
