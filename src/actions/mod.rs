//! Mutation entry points
//!
//! Each action runs validate → persist → invalidate → navigate and never
//! lets an error escape: the caller always receives an
//! [`ActionOutcome`](crate::core::form::ActionOutcome).

pub mod authenticate;
pub mod invoices;

pub use authenticate::{AuthActions, SignInOutcome};
pub use invoices::InvoiceActions;
