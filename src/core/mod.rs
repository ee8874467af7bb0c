//! Core module containing the domain types and the seams the server plugs
//! into

pub mod auth;
pub mod cache;
pub mod error;
pub mod form;
pub mod model;
pub mod service;
pub mod validation;

pub use auth::{AuthError, AuthErrorKind, AuthProvider, CredentialsAuthProvider, Session};
pub use cache::{CacheInvalidator, ViewCache};
pub use error::{AppError, ConfigError, RequestError, StorageError};
pub use form::{ActionOutcome, FailureReason, FieldErrors, FormData, FormState};
pub use model::{Customer, Invoice, InvoiceChanges, InvoiceStatus, InvoiceSummary, NewInvoice};
pub use service::InvoiceService;
