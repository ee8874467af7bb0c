//! Validation and filtering system
//!
//! Form submissions are checked against declarative [`FormSchema`]s before
//! any mutation handler touches storage. Rules are keyed by field name and
//! derived schemas are built with `omit`/`pick`.

pub mod extractor;
pub mod filters;
pub mod invoice;
pub mod schema;
pub mod validators;

pub use extractor::FormSubmission;
pub use invoice::{invoice_form_schema, invoice_input_schema, parse_invoice_fields};
pub use schema::{FieldKind, FieldRule, FormSchema, ParsedForm};
