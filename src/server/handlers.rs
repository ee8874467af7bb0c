//! HTTP handlers for the invoice dashboard
//!
//! Page loaders return JSON views (cached per path). Mutation handlers are
//! thin: they hand the submitted form to an action and translate the
//! [`ActionOutcome`] into a response.

use super::host::ServerHost;
use crate::actions::SignInOutcome;
use crate::core::auth::Session;
use crate::core::error::{AppError, RequestError};
use crate::core::form::{
    ActionOutcome, FailureReason, FormState, INVOICES_PATH, edit_invoice_path,
};
use crate::core::model::{Customer, Invoice, InvoiceSummary};
use crate::core::validation::FormSubmission;
use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// Translate a mutation result into an HTTP response
///
/// Redirects become `303 See Other`; failures carry the form state so the
/// client can render field errors next to the form.
pub fn outcome_response(outcome: ActionOutcome) -> Response {
    match outcome {
        ActionOutcome::Redirect(path) => Redirect::to(&path).into_response(),
        ActionOutcome::Completed => Json(json!({})).into_response(),
        ActionOutcome::Failure { reason, state } => {
            let status = match reason {
                FailureReason::Validation => StatusCode::UNPROCESSABLE_ENTITY,
                FailureReason::NotFound => StatusCode::NOT_FOUND,
                FailureReason::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(state)).into_response()
        }
    }
}

fn to_view<T: Serialize>(view: &T) -> Result<Value, AppError> {
    serde_json::to_value(view).map_err(|e| AppError::Internal(e.to_string()))
}

// =============================================================================
// Public routes
// =============================================================================

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "invoice-desk"
    }))
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    redirect: String,
    token: String,
}

/// `POST /login`
pub async fn login(
    State(host): State<Arc<ServerHost>>,
    FormSubmission(form): FormSubmission,
) -> Response {
    match host.auth_actions.sign_in(&form).await {
        SignInOutcome::Authenticated { session, redirect } => Json(LoginResponse {
            redirect,
            token: session.token,
        })
        .into_response(),
        SignInOutcome::Rejected { message } => {
            (StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
        }
    }
}

/// `POST /logout`
pub async fn logout(
    State(host): State<Arc<ServerHost>>,
    Extension(session): Extension<Session>,
) -> StatusCode {
    host.auth_actions.sign_out(&session.token).await;
    StatusCode::NO_CONTENT
}

// =============================================================================
// Page loaders
// =============================================================================

/// Query string of the invoice list page
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
struct InvoiceListView {
    query: String,
    page: usize,
    total_pages: usize,
    invoices: Vec<InvoiceSummary>,
}

#[derive(Debug, Serialize)]
struct CreateInvoiceView {
    customers: Vec<Customer>,
}

#[derive(Debug, Serialize)]
struct EditInvoiceView {
    invoice: Invoice,
    customers: Vec<Customer>,
}

/// `GET /dashboard/invoices`
pub async fn list_invoices(
    State(host): State<Arc<ServerHost>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(params) = params.map_err(|e| RequestError::InvalidQuery {
        message: e.body_text(),
    })?;
    let query = params.query.unwrap_or_default().trim().to_string();
    let page = params.page.unwrap_or(1).max(1);
    let variant = format!("query={}&page={}", query, page);

    let service = &host.invoices;
    let search = query.as_str();
    let view = host
        .cache
        .get_or_insert(INVOICES_PATH, &variant, || async move {
            let (invoices, total_pages) = tokio::try_join!(
                service.fetch_filtered_invoices(search, page),
                service.fetch_invoice_pages(search),
            )
            .map_err(AppError::from_service)?;

            to_view(&InvoiceListView {
                query: search.to_string(),
                page,
                total_pages,
                invoices,
            })
        })
        .await?;

    Ok(Json(view))
}

/// `GET /dashboard/invoices/create`
pub async fn create_invoice_page(
    State(host): State<Arc<ServerHost>>,
) -> Result<Json<Value>, AppError> {
    let customers = host
        .invoices
        .fetch_customers()
        .await
        .map_err(AppError::from_service)?;
    Ok(Json(to_view(&CreateInvoiceView { customers })?))
}

/// `GET /dashboard/invoices/{id}/edit`
///
/// Customers and the invoice are loaded concurrently; a missing invoice is
/// a 404 and is not cached.
pub async fn edit_invoice_page(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = &host.invoices;
    let invoice_id = id.as_str();
    let view = host
        .cache
        .get_or_insert(&edit_invoice_path(invoice_id), "", || async move {
            let (customers, invoice) = tokio::try_join!(
                service.fetch_customers(),
                service.fetch_invoice_by_id(invoice_id),
            )
            .map_err(AppError::from_service)?;

            let invoice = invoice.ok_or_else(|| AppError::NotFound {
                resource: "invoice".to_string(),
                id: invoice_id.to_string(),
            })?;

            to_view(&EditInvoiceView { invoice, customers })
        })
        .await?;

    Ok(Json(view))
}

// =============================================================================
// Mutations
// =============================================================================

/// `POST /dashboard/invoices`
pub async fn create_invoice(
    State(host): State<Arc<ServerHost>>,
    FormSubmission(form): FormSubmission,
) -> Response {
    let outcome = host
        .invoice_actions
        .create_invoice(&FormState::initial(), &form)
        .await;
    outcome_response(outcome)
}

/// `POST /dashboard/invoices/{id}/edit`
pub async fn edit_invoice(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
    FormSubmission(form): FormSubmission,
) -> Response {
    outcome_response(host.invoice_actions.edit_invoice(&id, &form).await)
}

/// `POST /dashboard/invoices/{id}/delete`
pub async fn delete_invoice(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
) -> Response {
    outcome_response(host.invoice_actions.delete_invoice(&id).await)
}
