//! Configuration loading and management

use crate::core::auth::UserAccount;
use crate::core::error::ConfigError;
use crate::core::form::FormData;
use crate::core::model::{Customer, Invoice, InvoiceStatus, to_minor_units};
use crate::core::validation::invoice::{
    AMOUNT_FIELD, CUSTOMER_ID_FIELD, DATE_FIELD, ID_FIELD, STATUS_FIELD, invoice_form_schema,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

pub const BIND_ENV: &str = "INVOICE_DESK_BIND";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Which [`InvoiceService`](crate::core::service::InvoiceService) backs the app
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Postgres,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub database_url: Option<String>,
}

/// Users allowed to sign in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub users: Vec<UserAccount>,
}

/// An invoice row as written in configuration
///
/// `amount` is in major units, like a form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedInvoice {
    #[serde(default)]
    pub id: Option<String>,
    pub customer_id: String,
    pub amount: f64,
    pub status: String,
    pub date: String,
}

impl SeedInvoice {
    fn as_form(&self) -> FormData {
        FormData::new()
            .with(CUSTOMER_ID_FIELD, self.customer_id.as_str())
            .with(AMOUNT_FIELD, self.amount.to_string())
            .with(STATUS_FIELD, self.status.as_str())
            .with(DATE_FIELD, self.date.as_str())
    }

    /// Validate against the invoice schema and build the stored row
    ///
    /// A missing id gets a fresh UUID.
    pub fn to_invoice(&self) -> Result<Invoice, ConfigError> {
        let parsed = invoice_form_schema()
            .omit(&[ID_FIELD])
            .safe_parse(&self.as_form())
            .map_err(|errors| ConfigError::InvalidValue {
                field: "seed.invoices".to_string(),
                value: self.customer_id.clone(),
                message: errors
                    .fields()
                    .map(|f| format!("{}: {}", f, errors.get(f).unwrap_or_default().join(" ")))
                    .collect::<Vec<_>>()
                    .join("; "),
            })?;

        let invalid = |field: &str, value: String| ConfigError::InvalidValue {
            field: format!("seed.invoices.{}", field),
            value,
            message: "unexpected value after validation".to_string(),
        };

        let status = parsed
            .get_str(STATUS_FIELD)
            .and_then(|s| s.parse::<InvoiceStatus>().ok())
            .ok_or_else(|| invalid(STATUS_FIELD, self.status.clone()))?;
        let date = parsed
            .get_str(DATE_FIELD)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .ok_or_else(|| invalid(DATE_FIELD, self.date.clone()))?;
        let amount = parsed
            .get_f64(AMOUNT_FIELD)
            .and_then(to_minor_units)
            .ok_or_else(|| invalid(AMOUNT_FIELD, self.amount.to_string()))?;
        let customer_id = parsed
            .get_str(CUSTOMER_ID_FIELD)
            .map(str::to_string)
            .ok_or_else(|| invalid(CUSTOMER_ID_FIELD, self.customer_id.clone()))?;

        Ok(Invoice {
            id: self
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            customer_id,
            amount,
            status,
            date,
        })
    }
}

/// Initial data for the in-memory backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub invoices: Vec<SeedInvoice>,
}

impl SeedConfig {
    pub fn invoices(&self) -> Result<Vec<Invoice>, ConfigError> {
        self.invoices.iter().map(SeedInvoice::to_invoice).collect()
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path, e),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })
    }

    /// Override the bind address and database URL from the environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Same as [`apply_env_overrides`](Self::apply_env_overrides) with an
    /// explicit variable lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup(BIND_ENV).filter(|v| !v.trim().is_empty()) {
            self.server.bind = bind;
        }
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.storage.database_url = Some(url);
        }
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::Postgres
            && self
                .storage
                .database_url
                .as_deref()
                .is_none_or(|url| url.trim().is_empty())
        {
            return Err(ConfigError::MissingField {
                field: "database_url".to_string(),
                context: "storage (backend: postgres)".to_string(),
            });
        }

        let mut emails = HashSet::new();
        for user in &self.auth.users {
            if !emails.insert(user.email.to_lowercase()) {
                return Err(ConfigError::InvalidValue {
                    field: "auth.users.email".to_string(),
                    value: user.email.clone(),
                    message: "duplicate user email".to_string(),
                });
            }
        }

        let customers: HashSet<&str> = self
            .seed
            .customers
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        for invoice in self.seed.invoices()? {
            if !customers.contains(invoice.customer_id.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "seed.invoices.customer_id".to_string(),
                    value: invoice.customer_id,
                    message: "no seed customer with this id".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Create a default configuration for development
    pub fn default_config() -> Self {
        let customer = |id: &str, name: &str, email: &str| Customer {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            image_url: None,
        };
        let invoice = |customer_id: &str, amount: f64, status: &str, date: &str| SeedInvoice {
            id: None,
            customer_id: customer_id.to_string(),
            amount,
            status: status.to_string(),
            date: date.to_string(),
        };

        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig {
                users: vec![UserAccount {
                    id: "410544b2-4001-4271-9855-fec4b6a6442a".to_string(),
                    name: "User".to_string(),
                    email: "user@nextmail.com".to_string(),
                    password: "123456".to_string(),
                }],
            },
            seed: SeedConfig {
                customers: vec![
                    customer("c1", "Evil Rabbit", "evil@rabbit.com"),
                    customer("c2", "Delba de Oliveira", "delba@oliveira.com"),
                    customer("c3", "Lee Robinson", "lee@robinson.com"),
                ],
                invoices: vec![
                    invoice("c1", 157.95, "pending", "2022-12-06"),
                    invoice("c2", 201.48, "pending", "2022-11-14"),
                    invoice("c3", 30.40, "paid", "2022-10-29"),
                    invoice("c2", 448.00, "paid", "2023-09-10"),
                ],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default_config();
        config.validate().unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.seed.invoices().unwrap()[0].amount, 15795);
    }

    #[test]
    fn test_seed_invoice_keeps_given_id() {
        let seed = SeedInvoice {
            id: Some("inv1".to_string()),
            customer_id: "c1".to_string(),
            amount: 12.5,
            status: "paid".to_string(),
            date: "2024-03-01".to_string(),
        };
        let invoice = seed.to_invoice().unwrap();
        assert_eq!(invoice.id, "inv1");
        assert_eq!(invoice.amount, 1250);
        assert_eq!(invoice.status, InvoiceStatus::Paid);
    }

    #[test]
    fn test_seed_invoice_rejects_bad_date() {
        let seed = SeedInvoice {
            id: None,
            customer_id: "c1".to_string(),
            amount: 1.0,
            status: "paid".to_string(),
            date: "01/03/2024".to_string(),
        };
        let err = seed.to_invoice().unwrap_err();
        assert!(err.to_string().contains("Please enter a date as YYYY-MM-DD."));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| match key {
            BIND_ENV => Some("0.0.0.0:8080".to_string()),
            DATABASE_URL_ENV => Some("postgres://localhost/invoices".to_string()),
            _ => None,
        });
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(
            config.storage.database_url.as_deref(),
            Some("postgres://localhost/invoices")
        );
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.storage.database_url, None);
    }
}
