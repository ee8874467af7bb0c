//! Form submissions and their outcomes
//!
//! A mutation never "jumps" on success: it returns an [`ActionOutcome`] and
//! the HTTP layer decides how to turn a redirect into a response.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Path of the invoice list view
pub const INVOICES_PATH: &str = "/dashboard/invoices";

/// Landing page after sign-in
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Path of the edit view for one invoice
pub fn edit_invoice_path(id: &str) -> String {
    format!("{}/{}/edit", INVOICES_PATH, id)
}

/// Raw field values as submitted by a form
///
/// A field that was not submitted is absent, which is different from a
/// field submitted empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FormData(HashMap<String, String>);

impl FormData {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<String>) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, String>> for FormData {
    fn from(fields: HashMap<String, String>) -> Self {
        Self(fields)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for FormData {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs
            .into_iter()
            .fold(FormData::new(), |form, (k, v)| form.with(k, v))
    }
}

/// Field-keyed validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-submission result rendered back next to the form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    #[serde(default)]
    pub errors: FieldErrors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FormState {
    /// The state a form starts in, before any submission
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn with_errors(errors: FieldErrors, message: impl Into<String>) -> Self {
        Self {
            errors,
            message: Some(message.into()),
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            errors: FieldErrors::new(),
            message: Some(message.into()),
        }
    }
}

/// Why a mutation did not go through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Validation,
    NotFound,
    Persistence,
}

/// Result of a mutation handler
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// Success; the caller should navigate to the given path
    Redirect(String),
    /// Success; the caller stays where it is
    Completed,
    /// Nothing was changed, or the change failed
    Failure {
        reason: FailureReason,
        state: FormState,
    },
}

impl ActionOutcome {
    pub fn failure(reason: FailureReason, state: FormState) -> Self {
        ActionOutcome::Failure { reason, state }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ActionOutcome::Failure { .. })
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            ActionOutcome::Redirect(path) => Some(path),
            _ => None,
        }
    }

    pub fn form_state(&self) -> Option<&FormState> {
        match self {
            ActionOutcome::Failure { state, .. } => Some(state),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edit_invoice_path() {
        assert_eq!(edit_invoice_path("inv1"), "/dashboard/invoices/inv1/edit");
    }

    #[test]
    fn test_form_data_distinguishes_absent_and_empty() {
        let form = FormData::from([("customerId", "")]);
        assert_eq!(form.get("customerId"), Some(""));
        assert_eq!(form.get("amount"), None);
    }

    #[test]
    fn test_field_errors_accumulate_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("amount", "first");
        errors.add("amount", "second");
        errors.add("status", "third");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("amount").unwrap().len(), 2);
        assert!(errors.contains("status"));
    }

    #[test]
    fn test_form_state_serialization() {
        let mut errors = FieldErrors::new();
        errors.add("status", "Please select an invoice status.");
        let state = FormState::with_errors(errors, "failed");
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({
                "errors": { "status": ["Please select an invoice status."] },
                "message": "failed"
            })
        );

        let empty = serde_json::to_value(FormState::initial()).unwrap();
        assert_eq!(empty, json!({ "errors": {} }));
    }

    #[test]
    fn test_outcome_accessors() {
        let redirect = ActionOutcome::Redirect(INVOICES_PATH.to_string());
        assert!(redirect.is_success());
        assert_eq!(redirect.redirect_target(), Some(INVOICES_PATH));
        assert!(redirect.form_state().is_none());

        let failure =
            ActionOutcome::failure(FailureReason::Persistence, FormState::with_message("boom"));
        assert!(!failure.is_success());
        assert_eq!(
            failure.form_state().and_then(|s| s.message.as_deref()),
            Some("boom")
        );
    }
}
