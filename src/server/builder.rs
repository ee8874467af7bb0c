//! ServerBuilder for fluent API to build HTTP servers

use super::host::ServerHost;
use super::router::build_router;
use crate::config::{AppConfig, StorageBackend};
use crate::core::auth::{AuthProvider, CredentialsAuthProvider};
use crate::core::cache::ViewCache;
use crate::core::service::InvoiceService;
use crate::storage::InMemoryInvoiceService;
use anyhow::Result;
use axum::Router;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the invoice dashboard server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_invoice_service(InMemoryInvoiceService::new())
///     .with_auth_provider(CredentialsAuthProvider::new(users))
///     .build()?;
/// ```
pub struct ServerBuilder {
    invoice_service: Option<Arc<dyn InvoiceService>>,
    auth_provider: Option<Arc<dyn AuthProvider>>,
    view_cache: Option<Arc<ViewCache>>,
    clock: Option<fn() -> NaiveDate>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            invoice_service: None,
            auth_provider: None,
            view_cache: None,
            clock: None,
            custom_routes: Vec::new(),
        }
    }

    /// Build a server from configuration
    ///
    /// Selects the storage backend, seeds the in-memory store and registers
    /// the configured users.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let builder = Self::new().with_auth_provider(CredentialsAuthProvider::new(
            config.auth.users.iter().cloned(),
        ));

        match config.storage.backend {
            StorageBackend::InMemory => {
                let service = InMemoryInvoiceService::seeded(
                    config.seed.customers.iter().cloned(),
                    config.seed.invoices()?,
                )
                .await?;
                tracing::info!(
                    customers = config.seed.customers.len(),
                    invoices = config.seed.invoices.len(),
                    "in-memory store seeded"
                );
                Ok(builder.with_invoice_service(service))
            }
            #[cfg(feature = "postgres")]
            StorageBackend::Postgres => {
                use crate::storage::postgres::{PostgresInvoiceService, connect, run_migrations};

                let url = config.storage.database_url.as_deref().unwrap_or_default();
                let pool = connect(url).await?;
                run_migrations(&pool).await?;
                tracing::info!("connected to PostgreSQL");
                Ok(builder.with_invoice_service(PostgresInvoiceService::new(pool)))
            }
            #[cfg(not(feature = "postgres"))]
            StorageBackend::Postgres => Err(anyhow::anyhow!(
                "storage backend 'postgres' requires the `postgres` feature"
            )),
        }
    }

    /// Set the invoice data service (required)
    pub fn with_invoice_service(mut self, service: impl InvoiceService + 'static) -> Self {
        self.invoice_service = Some(Arc::new(service));
        self
    }

    /// Set the auth provider (required)
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth_provider = Some(Arc::new(provider));
        self
    }

    /// Share a view cache with the caller; a fresh one is used otherwise
    pub fn with_view_cache(mut self, cache: Arc<ViewCache>) -> Self {
        self.view_cache = Some(cache);
        self
    }

    /// Fix the date stamped on created invoices
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.clock = Some(today);
        self
    }

    /// Add custom routes to the server
    ///
    /// Custom routes are merged after the built-in ones and are not behind
    /// the session gate.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the host without exposing it
    pub fn build_host(mut self) -> Result<ServerHost> {
        let invoices = self.invoice_service.take().ok_or_else(|| {
            anyhow::anyhow!("InvoiceService is required. Call .with_invoice_service()")
        })?;
        let auth = self.auth_provider.take().ok_or_else(|| {
            anyhow::anyhow!("AuthProvider is required. Call .with_auth_provider()")
        })?;
        let cache = self.view_cache.take().unwrap_or_default();

        let mut host = ServerHost::new(invoices, auth, cache);
        if let Some(today) = self.clock {
            host = host.with_clock(today);
        }
        Ok(host)
    }

    /// Build the final router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        Ok(build_router(host, custom_routes))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Constructor tests ────────────────────────────────────────────────

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ServerBuilder::new();
        assert!(builder.invoice_service.is_none());
        assert!(builder.auth_provider.is_none());
        assert!(builder.view_cache.is_none());
        assert!(builder.custom_routes.is_empty());
    }

    #[test]
    fn test_with_custom_routes_appends_router() {
        let builder = ServerBuilder::new()
            .with_custom_routes(Router::new())
            .with_custom_routes(Router::new());
        assert_eq!(builder.custom_routes.len(), 2);
    }

    // ── build_host ───────────────────────────────────────────────────────

    #[test]
    fn test_build_host_without_invoice_service_fails() {
        let result = ServerBuilder::new()
            .with_auth_provider(CredentialsAuthProvider::new([]))
            .build_host();
        let err_msg = format!("{}", result.err().expect("should be Err"));
        assert!(
            err_msg.contains("InvoiceService is required"),
            "error should mention InvoiceService: {}",
            err_msg
        );
    }

    #[test]
    fn test_build_host_without_auth_provider_fails() {
        let result = ServerBuilder::new()
            .with_invoice_service(InMemoryInvoiceService::new())
            .build_host();
        let err_msg = format!("{}", result.err().expect("should be Err"));
        assert!(err_msg.contains("AuthProvider is required"), "{}", err_msg);
    }

    #[test]
    fn test_build_host_uses_shared_cache() {
        let cache = Arc::new(ViewCache::new());
        let host = ServerBuilder::new()
            .with_invoice_service(InMemoryInvoiceService::new())
            .with_auth_provider(CredentialsAuthProvider::new([]))
            .with_view_cache(cache.clone())
            .build_host()
            .expect("build_host should succeed");
        assert!(Arc::ptr_eq(&host.cache, &cache));
    }

    #[test]
    fn test_build_with_custom_routes() {
        use axum::routing::get;

        let custom = Router::new().route("/custom", get(|| async { "ok" }));
        let router = ServerBuilder::new()
            .with_invoice_service(InMemoryInvoiceService::new())
            .with_auth_provider(CredentialsAuthProvider::new([]))
            .with_custom_routes(custom)
            .build()
            .expect("build should succeed with custom routes");

        let _ = router;
    }

    // ── from_config ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_from_config_seeds_in_memory_store() {
        let host = ServerBuilder::from_config(&AppConfig::default_config())
            .await
            .expect("default config should build")
            .build_host()
            .expect("build_host should succeed");
        let customers = host.invoices.fetch_customers().await.unwrap();
        assert_eq!(customers.len(), 3);
        assert_eq!(host.invoices.fetch_invoice_pages("").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_from_config_rejects_postgres_without_url() {
        let mut config = AppConfig::default_config();
        config.storage.backend = StorageBackend::Postgres;
        config.storage.database_url = None;
        assert!(ServerBuilder::from_config(&config).await.is_err());
    }
}
