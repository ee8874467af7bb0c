//! Server host shared by every handler
//!
//! The host owns the collaborators the HTTP layer needs: the invoice data
//! service, the auth provider, the view cache and the action wrappers built
//! on top of them. It is cheap to clone behind an `Arc` and carries no
//! per-request state.

use crate::actions::{AuthActions, InvoiceActions};
use crate::core::auth::AuthProvider;
use crate::core::cache::ViewCache;
use crate::core::service::InvoiceService;
use chrono::NaiveDate;
use std::sync::Arc;

/// Host context containing all application state
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(ServerHost::new(service, auth, Arc::new(ViewCache::new())));
/// let app = build_router(host, Vec::new());
/// ```
pub struct ServerHost {
    /// Data and persistence provider
    pub invoices: Arc<dyn InvoiceService>,

    /// Session provider
    pub auth: Arc<dyn AuthProvider>,

    /// Cached page views
    pub cache: Arc<ViewCache>,

    /// Create, edit and delete handlers
    pub invoice_actions: InvoiceActions,

    /// Sign-in and sign-out handlers
    pub auth_actions: AuthActions,
}

impl ServerHost {
    pub fn new(
        invoices: Arc<dyn InvoiceService>,
        auth: Arc<dyn AuthProvider>,
        cache: Arc<ViewCache>,
    ) -> Self {
        let invoice_actions = InvoiceActions::new(invoices.clone(), cache.clone());
        let auth_actions = AuthActions::new(auth.clone());
        Self {
            invoices,
            auth,
            cache,
            invoice_actions,
            auth_actions,
        }
    }

    /// Replace the clock used for invoice creation dates
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.invoice_actions = self.invoice_actions.with_clock(today);
        self
    }
}
