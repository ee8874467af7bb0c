//! Invoice form schemas
//!
//! The base schema declares every invoice field. Create and edit submissions
//! are checked against the base minus `id` and `date`; seed rows from
//! configuration keep the date rule.

use super::schema::{FieldRule, FormSchema};
use super::{filters, validators};
use crate::core::form::{FieldErrors, FormData};
use crate::core::model::{InvoiceFields, InvoiceStatus};

pub const CUSTOMER_ID_FIELD: &str = "customerId";
pub const AMOUNT_FIELD: &str = "amount";
pub const STATUS_FIELD: &str = "status";
pub const DATE_FIELD: &str = "date";
pub const ID_FIELD: &str = "id";

pub const CUSTOMER_ID_MESSAGE: &str = "Please select a customer.";
pub const AMOUNT_MESSAGE: &str = "Please enter an amount greater than $0.";
pub const STATUS_MESSAGE: &str = "Please select an invoice status.";
pub const DATE_MESSAGE: &str = "Please enter a date as YYYY-MM-DD.";

/// Every invoice field
pub fn invoice_form_schema() -> FormSchema {
    FormSchema::new()
        .field(FieldRule::text(ID_FIELD).validate(validators::required("Missing invoice id.")))
        .field(
            FieldRule::text(CUSTOMER_ID_FIELD)
                .filter(filters::trim())
                .filter(filters::blank_to_null())
                .validate(validators::required(CUSTOMER_ID_MESSAGE)),
        )
        .field(
            FieldRule::number(AMOUNT_FIELD)
                .filter(filters::trim())
                .validate(validators::number(AMOUNT_MESSAGE))
                .validate(validators::positive(AMOUNT_MESSAGE))
                .validate(validators::whole_minor_units(AMOUNT_MESSAGE)),
        )
        .field(
            FieldRule::text(STATUS_FIELD)
                .validate(validators::in_list(&InvoiceStatus::VALUES, STATUS_MESSAGE)),
        )
        .field(
            FieldRule::text(DATE_FIELD)
                .validate(validators::required(DATE_MESSAGE))
                .validate(validators::date_format("%Y-%m-%d", DATE_MESSAGE)),
        )
}

/// Fields a user may submit when creating or editing an invoice
pub fn invoice_input_schema() -> FormSchema {
    invoice_form_schema().omit(&[ID_FIELD, DATE_FIELD])
}

/// Validate a create/edit submission into typed fields
pub fn parse_invoice_fields(form: &FormData) -> Result<InvoiceFields, FieldErrors> {
    let parsed = invoice_input_schema().safe_parse(form)?;

    let customer_id = parsed
        .get_str(CUSTOMER_ID_FIELD)
        .map(str::to_string)
        .ok_or_else(|| single_error(CUSTOMER_ID_FIELD, CUSTOMER_ID_MESSAGE))?;
    let amount = parsed
        .get_f64(AMOUNT_FIELD)
        .ok_or_else(|| single_error(AMOUNT_FIELD, AMOUNT_MESSAGE))?;
    let status = parsed
        .get_str(STATUS_FIELD)
        .and_then(|s| s.parse::<InvoiceStatus>().ok())
        .ok_or_else(|| single_error(STATUS_FIELD, STATUS_MESSAGE))?;

    Ok(InvoiceFields {
        customer_id,
        amount,
        status,
    })
}

fn single_error(field: &str, message: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.add(field, message);
    errors
}
