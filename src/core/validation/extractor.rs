//! Axum extractor for form submissions
//!
//! Browsers post `application/x-www-form-urlencoded`; API clients may post a
//! flat JSON object instead. Both end up as the same [`FormData`], so the
//! schemas never see the transport.

use crate::core::error::{AppError, RequestError};
use crate::core::form::FormData;
use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Extracted form body
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_invoice(
///     State(host): State<Arc<ServerHost>>,
///     FormSubmission(form): FormSubmission,
/// ) -> Response {
///     // form fields are raw strings, validation happens in the action
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FormSubmission(pub FormData);

impl FormSubmission {
    pub fn into_inner(self) -> FormData {
        self.0
    }
}

impl<S> FromRequest<S> for FormSubmission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(body): Json<Map<String, Value>> = Json::from_request(req, state)
                .await
                .map_err(|e| RequestError::InvalidBody {
                    message: e.body_text(),
                })?;
            return Ok(Self(form_from_json(body)));
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields): Form<HashMap<String, String>> = Form::from_request(req, state)
                .await
                .map_err(|e| RequestError::InvalidBody {
                    message: e.body_text(),
                })?;
            return Ok(Self(FormData::from(fields)));
        }

        Err(RequestError::UnsupportedMediaType { content_type }.into())
    }
}

/// Flatten a JSON object into form fields
///
/// Scalars are stringified the way a browser would submit them; nulls,
/// arrays and objects are treated as not submitted.
fn form_from_json(body: Map<String, Value>) -> FormData {
    let mut form = FormData::new();
    for (field, value) in body {
        match value {
            Value::String(s) => form.insert(&field, s),
            Value::Number(n) => form.insert(&field, n.to_string()),
            Value::Bool(b) => form.insert(&field, b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => {}
        }
    }
    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use serde_json::json;

    fn request(content_type: &str, body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .expect("failed to build request")
    }

    #[test]
    fn test_form_from_json_stringifies_scalars() {
        let body = json!({
            "customerId": "c1",
            "amount": 12.5,
            "status": "paid",
            "flag": true,
            "gone": null,
            "nested": { "a": 1 }
        });
        let form = form_from_json(body.as_object().unwrap().clone());
        assert_eq!(form.get("customerId"), Some("c1"));
        assert_eq!(form.get("amount"), Some("12.5"));
        assert_eq!(form.get("flag"), Some("true"));
        assert_eq!(form.get("gone"), None);
        assert_eq!(form.get("nested"), None);
    }

    #[tokio::test]
    async fn test_extracts_urlencoded_body() {
        let req = request(
            "application/x-www-form-urlencoded",
            "customerId=c1&amount=12.50&status=pending",
        );
        let FormSubmission(form) = FormSubmission::from_request(req, &()).await.unwrap();
        assert_eq!(form.get("customerId"), Some("c1"));
        assert_eq!(form.get("amount"), Some("12.50"));
        assert_eq!(form.get("status"), Some("pending"));
    }

    #[tokio::test]
    async fn test_extracts_json_body() {
        let req = request("application/json", r#"{"customerId":"c1","amount":5}"#);
        let FormSubmission(form) = FormSubmission::from_request(req, &()).await.unwrap();
        assert_eq!(form.get("customerId"), Some("c1"));
        assert_eq!(form.get("amount"), Some("5"));
        assert_eq!(form.get("status"), None);
    }

    #[tokio::test]
    async fn test_rejects_malformed_json() {
        let req = request("application/json", "{not json");
        let err = FormSubmission::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rejects_unknown_content_type() {
        let req = request("text/plain", "customerId=c1");
        let err = FormSubmission::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
