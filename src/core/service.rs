//! Service trait for invoice and customer data
//!
//! Page loaders use the fetch side; mutation handlers use the persistence
//! side. Each persistence call is a single atomic statement.

use crate::core::model::{Customer, Invoice, InvoiceChanges, InvoiceSummary, NewInvoice};
use anyhow::Result;
use async_trait::async_trait;

/// Rows per page of the invoice list
pub const ITEMS_PER_PAGE: usize = 6;

/// Storage-agnostic access to invoices and customers
///
/// Implementations report failures as `anyhow::Error`; a
/// [`StorageError`](crate::core::error::StorageError) inside is recovered
/// by the HTTP layer for status mapping.
#[async_trait]
pub trait InvoiceService: Send + Sync {
    /// All customers, ordered by name
    async fn fetch_customers(&self) -> Result<Vec<Customer>>;

    /// Get an invoice by id
    async fn fetch_invoice_by_id(&self, id: &str) -> Result<Option<Invoice>>;

    /// One page (1-based) of list rows matching `query`, newest first
    ///
    /// The query matches case-insensitively against customer name and
    /// email, the amount, the date and the status. An empty query
    /// matches everything.
    async fn fetch_filtered_invoices(&self, query: &str, page: usize)
    -> Result<Vec<InvoiceSummary>>;

    /// Number of pages needed to show every row matching `query`
    async fn fetch_invoice_pages(&self, query: &str) -> Result<usize>;

    /// Insert an invoice, returning the stored row with its assigned id
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice>;

    /// Update customer, amount and status; returns affected rows
    async fn update_invoice(&self, id: &str, changes: InvoiceChanges) -> Result<u64>;

    /// Delete by id; returns affected rows
    async fn delete_invoice(&self, id: &str) -> Result<u64>;
}

/// Page count for `total` rows
pub fn total_pages(total: usize) -> usize {
    total.div_ceil(ITEMS_PER_PAGE)
}

/// Offset of the first row on a 1-based page; page 0 is treated as page 1
pub fn page_offset(page: usize) -> usize {
    page.max(1).saturating_sub(1).saturating_mul(ITEMS_PER_PAGE)
}

/// Case-insensitive search predicate shared by backends that filter in
/// process
pub fn summary_matches(summary: &InvoiceSummary, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    [
        summary.name.to_lowercase(),
        summary.email.to_lowercase(),
        summary.amount.to_string(),
        summary.date.format("%Y-%m-%d").to_string(),
        summary.status.as_str().to_string(),
    ]
    .iter()
    .any(|haystack| haystack.contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::InvoiceStatus;
    use chrono::NaiveDate;

    fn summary() -> InvoiceSummary {
        InvoiceSummary {
            id: "inv1".to_string(),
            customer_id: "c1".to_string(),
            name: "Delba de Oliveira".to_string(),
            email: "delba@oliveira.com".to_string(),
            image_url: None,
            amount: 15795,
            date: NaiveDate::from_ymd_opt(2022, 12, 6).unwrap(),
            status: InvoiceStatus::Pending,
        }
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(6), 1);
        assert_eq!(total_pages(7), 2);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(0), 0);
        assert_eq!(page_offset(1), 0);
        assert_eq!(page_offset(3), 12);
    }

    #[test]
    fn test_summary_matches() {
        let row = summary();
        assert!(summary_matches(&row, ""));
        assert!(summary_matches(&row, "DELBA"));
        assert!(summary_matches(&row, "oliveira.com"));
        assert!(summary_matches(&row, "157"));
        assert!(summary_matches(&row, "2022-12"));
        assert!(summary_matches(&row, "pend"));
        assert!(!summary_matches(&row, "paid"));
    }
}
