//! Shared test harness for storage backend testing
//!
//! Provides a fixed set of customers every backend under test must be
//! seeded with, plus helpers for building insert and update payloads.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod invoice_service_tests;

use chrono::NaiveDate;
use invoice_desk::core::model::{Customer, InvoiceChanges, InvoiceStatus, NewInvoice};
use invoice_desk::storage::InMemoryInvoiceService;

/// Customers every harness backend starts with
pub fn harness_customers() -> Vec<Customer> {
    vec![
        Customer {
            id: "c1".to_string(),
            name: "Amy Burns".to_string(),
            email: "amy@burns.com".to_string(),
            image_url: Some("/customers/amy-burns.png".to_string()),
        },
        Customer {
            id: "c2".to_string(),
            name: "Balazs Orban".to_string(),
            email: "balazs@orban.com".to_string(),
            image_url: None,
        },
        Customer {
            id: "c3".to_string(),
            name: "Michael Novotny".to_string(),
            email: "michael@novotny.com".to_string(),
            image_url: None,
        },
    ]
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn new_invoice(customer_id: &str, amount: i64, status: InvoiceStatus, on: NaiveDate) -> NewInvoice {
    NewInvoice {
        customer_id: customer_id.to_string(),
        amount,
        status,
        date: on,
    }
}

pub fn changes(customer_id: &str, amount: i64, status: InvoiceStatus) -> InvoiceChanges {
    InvoiceChanges {
        customer_id: customer_id.to_string(),
        amount,
        status,
    }
}

/// In-memory service seeded with [`harness_customers`]
pub async fn seeded_in_memory() -> InMemoryInvoiceService {
    InMemoryInvoiceService::seeded(harness_customers(), [])
        .await
        .expect("harness customers should seed")
}
