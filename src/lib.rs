//! # invoice-desk
//!
//! Invoice dashboard backend: authenticated users list, create, edit and
//! delete invoices tied to customers.
//!
//! ## Features
//!
//! - **Form pipeline**: validate → persist → invalidate cached views → redirect
//! - **Declarative schemas**: field rules keyed by name, derived with `omit`
//! - **Pluggable storage**: in-memory by default, PostgreSQL behind the
//!   `postgres` feature
//! - **Credentials sign-in**: bearer sessions gating the dashboard routes
//! - **Configuration-Based**: users, storage and seed data from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use invoice_desk::prelude::*;
//!
//! let config = AppConfig::default_config();
//! ServerBuilder::from_config(&config)
//!     .await?
//!     .serve(&config.server.bind)
//!     .await?;
//! ```
//!
//! Mutations can also be driven without HTTP:
//!
//! ```rust,ignore
//! let actions = InvoiceActions::new(service, cache);
//! let form = FormData::from([("customerId", "c1"), ("amount", "12.50"), ("status", "pending")]);
//! match actions.create_invoice(&FormState::initial(), &form).await {
//!     ActionOutcome::Redirect(path) => println!("go to {path}"),
//!     other => println!("{:?}", other.form_state()),
//! }
//! ```

pub mod actions;
pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Domain ===
    pub use crate::core::model::{
        Customer, Invoice, InvoiceChanges, InvoiceStatus, InvoiceSummary, NewInvoice,
    };

    // === Forms & Validation ===
    pub use crate::core::form::{ActionOutcome, FailureReason, FieldErrors, FormData, FormState};
    pub use crate::core::validation::{
        FieldRule, FormSchema, FormSubmission, invoice_form_schema, invoice_input_schema,
        parse_invoice_fields,
    };

    // === Core Traits ===
    pub use crate::core::auth::{AuthProvider, CredentialsAuthProvider, Session, SessionState};
    pub use crate::core::cache::{CacheInvalidator, ViewCache};
    pub use crate::core::service::InvoiceService;

    // === Actions ===
    pub use crate::actions::{AuthActions, InvoiceActions, SignInOutcome};

    // === Errors ===
    pub use crate::core::error::{AppError, ConfigError, RequestError, StorageError};

    // === Server & Config ===
    pub use crate::config::AppConfig;
    pub use crate::server::{ServerBuilder, ServerHost};

    // === Storage ===
    pub use crate::storage::InMemoryInvoiceService;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresInvoiceService;

    // === External re-exports ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use axum::Router;
    pub use std::sync::Arc;
}
