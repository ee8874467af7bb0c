//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresInvoiceService`, backed by a PostgreSQL database via
//! `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! invoice-desk = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! Tables are created by the migrations under `migrations/`, applied with
//! [`run_migrations`]. Every statement is parameterized.

use crate::core::error::StorageError;
use crate::core::model::{
    Customer, Invoice, InvoiceChanges, InvoiceStatus, InvoiceSummary, NewInvoice,
};
use crate::core::service::{ITEMS_PER_PAGE, InvoiceService, page_offset, total_pages};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

const BACKEND: &str = "PostgreSQL";

/// Connect a pool to `database_url`
pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|e| StorageError::Connection {
            backend: BACKEND.to_string(),
            message: e.to_string(),
        })?;
    Ok(pool)
}

/// Apply the bundled migrations (idempotent)
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StorageError::query(BACKEND, e))?;
    Ok(())
}

/// Map a driver error, keeping foreign-key violations distinct
fn storage_error(err: sqlx::Error) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => StorageError::Integrity {
            message: db.message().to_string(),
        },
        _ => StorageError::query(BACKEND, &err),
    }
}

fn parse_status(raw: &str) -> Result<InvoiceStatus> {
    raw.parse::<InvoiceStatus>()
        .map_err(|e| StorageError::query(BACKEND, e).into())
}

/// Pattern for the list search; `%` and `_` in the query match literally
fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// OFFSET for a 1-based page; pages past `i64::MAX` rows clamp instead of wrapping
fn sql_offset(page: usize) -> i64 {
    i64::try_from(page_offset(page)).unwrap_or(i64::MAX)
}

type InvoiceRow = (String, String, i64, String, NaiveDate);
type SummaryRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    i64,
    NaiveDate,
    String,
);

const SEARCH_PREDICATE: &str = "customers.name ILIKE $1 \
     OR customers.email ILIKE $1 \
     OR invoices.amount::text ILIKE $1 \
     OR invoices.date::text ILIKE $1 \
     OR invoices.status ILIKE $1";

/// Invoice storage service backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PostgresInvoiceService {
    pool: PgPool,
}

impl PostgresInvoiceService {
    /// Create a new `PostgresInvoiceService` with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert or replace a customer row
    pub async fn upsert_customer(&self, customer: &Customer) -> Result<()> {
        sqlx::query(
            "INSERT INTO customers (id, name, email, image_url) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE \
             SET name = EXCLUDED.name, email = EXCLUDED.email, image_url = EXCLUDED.image_url",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.image_url)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }
}

#[async_trait]
impl InvoiceService for PostgresInvoiceService {
    async fn fetch_customers(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query_as::<_, (String, String, String, Option<String>)>(
            "SELECT id, name, email, image_url FROM customers ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, name, email, image_url)| Customer {
                id,
                name,
                email,
                image_url,
            })
            .collect())
    }

    async fn fetch_invoice_by_id(&self, id: &str) -> Result<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            "SELECT id, customer_id, amount, status, date FROM invoices WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        match row {
            Some((id, customer_id, amount, status, date)) => Ok(Some(Invoice {
                id,
                customer_id,
                amount,
                status: parse_status(&status)?,
                date,
            })),
            None => Ok(None),
        }
    }

    async fn fetch_filtered_invoices(
        &self,
        query: &str,
        page: usize,
    ) -> Result<Vec<InvoiceSummary>> {
        let sql = format!(
            "SELECT invoices.id, invoices.customer_id, customers.name, customers.email, \
                    customers.image_url, invoices.amount, invoices.date, invoices.status \
             FROM invoices JOIN customers ON invoices.customer_id = customers.id \
             WHERE {} \
             ORDER BY invoices.date DESC, invoices.id ASC \
             LIMIT $2 OFFSET $3",
            SEARCH_PREDICATE
        );
        let rows = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(like_pattern(query))
            .bind(ITEMS_PER_PAGE as i64)
            .bind(sql_offset(page))
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        rows.into_iter()
            .map(
                |(id, customer_id, name, email, image_url, amount, date, status)| -> Result<InvoiceSummary> {
                    Ok(InvoiceSummary {
                        id,
                        customer_id,
                        name,
                        email,
                        image_url,
                        amount,
                        date,
                        status: parse_status(&status)?,
                    })
                },
            )
            .collect()
    }

    async fn fetch_invoice_pages(&self, query: &str) -> Result<usize> {
        let sql = format!(
            "SELECT COUNT(*) FROM invoices JOIN customers ON invoices.customer_id = customers.id \
             WHERE {}",
            SEARCH_PREDICATE
        );
        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(like_pattern(query))
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(total_pages(usize::try_from(count).unwrap_or_default()))
    }

    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice> {
        let (id,): (String,) = sqlx::query_as(
            "INSERT INTO invoices (customer_id, amount, status, date) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&invoice.customer_id)
        .bind(invoice.amount)
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(Invoice {
            id,
            customer_id: invoice.customer_id,
            amount: invoice.amount,
            status: invoice.status,
            date: invoice.date,
        })
    }

    async fn update_invoice(&self, id: &str, changes: InvoiceChanges) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE invoices SET customer_id = $1, amount = $2, status = $3 WHERE id = $4",
        )
        .bind(&changes.customer_id)
        .bind(changes.amount)
        .bind(changes.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(result.rows_affected())
    }

    async fn delete_invoice(&self, id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(result.rows_affected())
    }
}
