//! Create, edit and delete invoice actions

use crate::core::cache::CacheInvalidator;
use crate::core::form::{
    ActionOutcome, FailureReason, FormData, FormState, INVOICES_PATH, edit_invoice_path,
};
use crate::core::service::InvoiceService;
use crate::core::validation::parse_invoice_fields;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

pub const CREATE_FAILED_MESSAGE: &str = "Database Error: Failed to create the Invoice.";
pub const UPDATE_FAILED_MESSAGE: &str = "Database Error: Failed to update the Invoice.";
pub const DELETE_FAILED_MESSAGE: &str = "Database Error: Failed to delete the Invoice.";
pub const NOT_FOUND_MESSAGE: &str = "Invoice not found.";

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Top-level message for a persistence failure
fn persistence_message(err: &anyhow::Error, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// Invoice mutation handlers
#[derive(Clone)]
pub struct InvoiceActions {
    service: Arc<dyn InvoiceService>,
    cache: Arc<dyn CacheInvalidator>,
    today: fn() -> NaiveDate,
}

impl InvoiceActions {
    pub fn new(service: Arc<dyn InvoiceService>, cache: Arc<dyn CacheInvalidator>) -> Self {
        Self {
            service,
            cache,
            today: utc_today,
        }
    }

    /// Replace the clock used for creation dates
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Create an invoice from a form submission
    ///
    /// `_previous` is the state returned by the last submission of the same
    /// form; it does not influence the result.
    pub async fn create_invoice(&self, _previous: &FormState, form: &FormData) -> ActionOutcome {
        let fields = match parse_invoice_fields(form) {
            Ok(fields) => fields,
            Err(errors) => {
                tracing::warn!(fields = errors.len(), "invoice create rejected by validation");
                return ActionOutcome::failure(
                    FailureReason::Validation,
                    FormState::with_errors(errors, CREATE_FAILED_MESSAGE),
                );
            }
        };

        let invoice = fields.into_new_invoice((self.today)());
        let created = match self.service.insert_invoice(invoice).await {
            Ok(created) => created,
            Err(err) => {
                tracing::error!(error = %err, "failed to insert invoice");
                return ActionOutcome::failure(
                    FailureReason::Persistence,
                    FormState::with_message(persistence_message(&err, CREATE_FAILED_MESSAGE)),
                );
            }
        };

        tracing::info!(
            invoice_id = %created.id,
            customer_id = %created.customer_id,
            amount = created.amount,
            "invoice created"
        );
        self.cache.invalidate(INVOICES_PATH).await;
        ActionOutcome::Redirect(INVOICES_PATH.to_string())
    }

    /// Update customer, amount and status of an existing invoice
    pub async fn edit_invoice(&self, id: &str, form: &FormData) -> ActionOutcome {
        let fields = match parse_invoice_fields(form) {
            Ok(fields) => fields,
            Err(errors) => {
                tracing::warn!(invoice_id = %id, fields = errors.len(), "invoice edit rejected by validation");
                return ActionOutcome::failure(
                    FailureReason::Validation,
                    FormState::with_errors(errors, UPDATE_FAILED_MESSAGE),
                );
            }
        };

        match self.service.update_invoice(id, fields.into_changes()).await {
            Ok(0) => {
                tracing::warn!(invoice_id = %id, "invoice edit matched no rows");
                ActionOutcome::failure(
                    FailureReason::NotFound,
                    FormState::with_message(NOT_FOUND_MESSAGE),
                )
            }
            Ok(_) => {
                tracing::info!(invoice_id = %id, "invoice updated");
                self.cache.invalidate(INVOICES_PATH).await;
                self.cache.invalidate(&edit_invoice_path(id)).await;
                ActionOutcome::Redirect(INVOICES_PATH.to_string())
            }
            Err(err) => {
                tracing::error!(invoice_id = %id, error = %err, "failed to update invoice");
                ActionOutcome::failure(
                    FailureReason::Persistence,
                    FormState::with_message(persistence_message(&err, UPDATE_FAILED_MESSAGE)),
                )
            }
        }
    }

    /// Delete an invoice; deleting a missing id succeeds
    pub async fn delete_invoice(&self, id: &str) -> ActionOutcome {
        match self.service.delete_invoice(id).await {
            Ok(rows) => {
                tracing::info!(invoice_id = %id, rows, "invoice deleted");
                self.cache.invalidate(INVOICES_PATH).await;
                self.cache.invalidate(&edit_invoice_path(id)).await;
                ActionOutcome::Completed
            }
            Err(err) => {
                tracing::error!(invoice_id = %id, error = %err, "failed to delete invoice");
                ActionOutcome::failure(
                    FailureReason::Persistence,
                    FormState::with_message(persistence_message(&err, DELETE_FAILED_MESSAGE)),
                )
            }
        }
    }
}
