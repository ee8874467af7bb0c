//! In-memory implementation of InvoiceService for testing and development

use crate::core::error::StorageError;
use crate::core::model::{Customer, Invoice, InvoiceChanges, InvoiceSummary, NewInvoice};
use crate::core::service::{
    ITEMS_PER_PAGE, InvoiceService, page_offset, summary_matches, total_pages,
};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory invoice service
///
/// Customers and invoices live in two maps behind one lock so that the
/// customer reference check and the write happen atomically. Clones share
/// the same data.
#[derive(Clone, Default)]
pub struct InMemoryInvoiceService {
    tables: Arc<RwLock<Tables>>,
}

#[derive(Default)]
struct Tables {
    customers: HashMap<String, Customer>,
    invoices: HashMap<String, Invoice>,
}

impl Tables {
    fn require_customer(&self, customer_id: &str) -> Result<(), StorageError> {
        if self.customers.contains_key(customer_id) {
            Ok(())
        } else {
            Err(StorageError::Integrity {
                message: format!("customer '{}' does not exist", customer_id),
            })
        }
    }

    /// List rows matching `query`, newest first, ties broken by id
    fn summaries(&self, query: &str) -> Vec<InvoiceSummary> {
        let mut rows: Vec<InvoiceSummary> = self
            .invoices
            .values()
            .filter_map(|invoice| {
                self.customers
                    .get(&invoice.customer_id)
                    .map(|customer| InvoiceSummary::from_parts(invoice, customer))
            })
            .filter(|row| summary_matches(row, query))
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        rows
    }
}

impl InMemoryInvoiceService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a service pre-filled with customers and invoices
    ///
    /// Invoices referencing an unknown customer are rejected.
    pub async fn seeded(
        customers: impl IntoIterator<Item = Customer>,
        invoices: impl IntoIterator<Item = Invoice>,
    ) -> Result<Self> {
        let service = Self::new();
        for customer in customers {
            service.add_customer(customer).await;
        }
        for invoice in invoices {
            service.add_invoice(invoice).await?;
        }
        Ok(service)
    }

    pub async fn add_customer(&self, customer: Customer) {
        let mut tables = self.tables.write().await;
        tables.customers.insert(customer.id.clone(), customer);
    }

    /// Store an invoice with its id and date as given
    pub async fn add_invoice(&self, invoice: Invoice) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.require_customer(&invoice.customer_id)?;
        tables.invoices.insert(invoice.id.clone(), invoice);
        Ok(())
    }

    pub async fn invoice_count(&self) -> usize {
        self.tables.read().await.invoices.len()
    }
}

#[async_trait]
impl InvoiceService for InMemoryInvoiceService {
    async fn fetch_customers(&self) -> Result<Vec<Customer>> {
        let tables = self.tables.read().await;
        let mut customers: Vec<Customer> = tables.customers.values().cloned().collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    async fn fetch_invoice_by_id(&self, id: &str) -> Result<Option<Invoice>> {
        let tables = self.tables.read().await;
        Ok(tables.invoices.get(id).cloned())
    }

    async fn fetch_filtered_invoices(
        &self,
        query: &str,
        page: usize,
    ) -> Result<Vec<InvoiceSummary>> {
        let tables = self.tables.read().await;
        Ok(tables
            .summaries(query)
            .into_iter()
            .skip(page_offset(page))
            .take(ITEMS_PER_PAGE)
            .collect())
    }

    async fn fetch_invoice_pages(&self, query: &str) -> Result<usize> {
        let tables = self.tables.read().await;
        Ok(total_pages(tables.summaries(query).len()))
    }

    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice> {
        let mut tables = self.tables.write().await;
        tables.require_customer(&invoice.customer_id)?;

        let stored = Invoice {
            id: Uuid::new_v4().to_string(),
            customer_id: invoice.customer_id,
            amount: invoice.amount,
            status: invoice.status,
            date: invoice.date,
        };
        tables.invoices.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update_invoice(&self, id: &str, changes: InvoiceChanges) -> Result<u64> {
        let mut tables = self.tables.write().await;
        if !tables.invoices.contains_key(id) {
            return Ok(0);
        }
        tables.require_customer(&changes.customer_id)?;

        let Some(invoice) = tables.invoices.get_mut(id) else {
            return Ok(0);
        };
        invoice.customer_id = changes.customer_id;
        invoice.amount = changes.amount;
        invoice.status = changes.status;
        Ok(1)
    }

    async fn delete_invoice(&self, id: &str) -> Result<u64> {
        let mut tables = self.tables.write().await;
        Ok(tables.invoices.remove(id).map_or(0, |_| 1))
    }
}
