//! Router assembly
//!
//! Routes:
//! - GET  /health, /healthz - liveness
//! - POST /login - credentials sign-in
//! - POST /logout - end the current session (gated)
//! - GET  /dashboard/invoices - list page, `?query=&page=`
//! - POST /dashboard/invoices - create
//! - GET  /dashboard/invoices/create - create form data
//! - GET  /dashboard/invoices/{id}/edit - edit form data
//! - POST /dashboard/invoices/{id}/edit - edit
//! - POST /dashboard/invoices/{id}/delete - delete

use super::handlers::{
    create_invoice, create_invoice_page, delete_invoice, edit_invoice, edit_invoice_page,
    health_check, list_invoices, login, logout,
};
use super::host::ServerHost;
use super::middleware::require_session;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the full application router from a host
pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/login", post(login));

    let dashboard_routes = Router::new()
        .route(
            "/dashboard/invoices",
            get(list_invoices).post(create_invoice),
        )
        .route("/dashboard/invoices/create", get(create_invoice_page))
        .route(
            "/dashboard/invoices/{id}/edit",
            get(edit_invoice_page).post(edit_invoice),
        )
        .route("/dashboard/invoices/{id}/delete", post(delete_invoice))
        .route("/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(
            host.clone(),
            require_session,
        ));

    let mut app = public_routes.merge(dashboard_routes).with_state(host);

    for custom_router in custom_routes {
        app = app.merge(custom_router);
    }

    app.layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::CredentialsAuthProvider;
    use crate::core::cache::ViewCache;
    use crate::storage::InMemoryInvoiceService;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    fn app(custom_routes: Vec<Router>) -> Router {
        let host = Arc::new(ServerHost::new(
            Arc::new(InMemoryInvoiceService::new()),
            Arc::new(CredentialsAuthProvider::new([])),
            Arc::new(ViewCache::new()),
        ));
        build_router(host, custom_routes)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_routes_are_public() {
        let app = app(Vec::new());
        for uri in ["/health", "/healthz"] {
            let response = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_dashboard_routes_are_gated() {
        let app = app(Vec::new());
        for uri in ["/dashboard/invoices", "/dashboard/invoices/create"] {
            let response = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        let request = Request::builder()
            .method("POST")
            .uri("/logout")
            .header(header::AUTHORIZATION, "Bearer unknown")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_custom_routes_are_merged_outside_the_gate() {
        let custom = Router::new().route("/version", get(|| async { "0.1.0" }));
        let response = app(vec![custom])
            .oneshot(get_request("/version"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
