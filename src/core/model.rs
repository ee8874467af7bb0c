//! Invoice and customer records
//!
//! Amounts are stored as integer minor units (cents). Conversions from the
//! decimal form values happen once, in [`to_minor_units`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment status of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    /// All accepted wire values, in declaration order
    pub const VALUES: [&'static str; 2] = ["pending", "paid"];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(format!("unknown invoice status '{}'", other)),
        }
    }
}

/// A persisted invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    /// Minor units (cents)
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// A customer, as offered in the invoice form's selection list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Invoice list row joined with its customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub id: String,
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub amount: i64,
    pub date: NaiveDate,
    pub status: InvoiceStatus,
}

impl InvoiceSummary {
    pub fn from_parts(invoice: &Invoice, customer: &Customer) -> Self {
        Self {
            id: invoice.id.clone(),
            customer_id: invoice.customer_id.clone(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            image_url: customer.image_url.clone(),
            amount: invoice.amount,
            date: invoice.date,
            status: invoice.status,
        }
    }
}

/// Fields accepted from the invoice form once validation has passed
///
/// `amount` is still in major units here.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceFields {
    pub customer_id: String,
    pub amount: f64,
    pub status: InvoiceStatus,
}

impl InvoiceFields {
    /// Amount in minor units
    ///
    /// The schema has already rejected amounts that do not convert, so the
    /// fallback is never reached for validated fields.
    pub fn amount_in_minor_units(&self) -> i64 {
        to_minor_units(self.amount).unwrap_or_default()
    }

    pub fn into_new_invoice(self, date: NaiveDate) -> NewInvoice {
        NewInvoice {
            amount: self.amount_in_minor_units(),
            customer_id: self.customer_id,
            status: self.status,
            date,
        }
    }

    pub fn into_changes(self) -> InvoiceChanges {
        InvoiceChanges {
            amount: self.amount_in_minor_units(),
            customer_id: self.customer_id,
            status: self.status,
        }
    }
}

/// Insert payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Update payload
///
/// There is no date here: an invoice keeps the date it was created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceChanges {
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
}

/// Convert a decimal major-unit amount into minor units
///
/// Returns `None` for non-finite input or when the result does not fit in
/// an `i64`.
pub fn to_minor_units(amount: f64) -> Option<i64> {
    if !amount.is_finite() {
        return None;
    }
    let cents = (amount * 100.0).round();
    if cents < i64::MIN as f64 || cents >= i64::MAX as f64 {
        return None;
    }
    Some(cents as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for value in InvoiceStatus::VALUES {
            let status: InvoiceStatus = value.parse().expect("known status");
            assert_eq!(status.as_str(), value);
        }
        assert!("overdue".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_value(InvoiceStatus::Paid).unwrap();
        assert_eq!(json, serde_json::json!("paid"));
    }

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(12.5), Some(1250));
        assert_eq!(to_minor_units(5.0), Some(500));
        // 0.29 * 100 is 28.999999999999996 in binary floating point
        assert_eq!(to_minor_units(0.29), Some(29));
        assert_eq!(to_minor_units(f64::NAN), None);
        assert_eq!(to_minor_units(f64::INFINITY), None);
        assert_eq!(to_minor_units(1e300), None);
    }

    #[test]
    fn test_fields_into_new_invoice_keeps_values() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let fields = InvoiceFields {
            customer_id: "c1".to_string(),
            amount: 12.5,
            status: InvoiceStatus::Pending,
        };
        let invoice = fields.into_new_invoice(date);
        assert_eq!(invoice.customer_id, "c1");
        assert_eq!(invoice.amount, 1250);
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.date, date);
    }

    #[test]
    fn test_fields_into_changes() {
        let changes = InvoiceFields {
            customer_id: "c2".to_string(),
            amount: 5.0,
            status: InvoiceStatus::Paid,
        }
        .into_changes();
        assert_eq!(
            changes,
            InvoiceChanges {
                customer_id: "c2".to_string(),
                amount: 500,
                status: InvoiceStatus::Paid,
            }
        );
    }
}
