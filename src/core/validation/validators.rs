//! Reusable field validators
//!
//! Each validator receives the field name and its (already filtered and
//! coerced) value, and carries the user-facing message to report on failure.

use crate::core::model::to_minor_units;
use serde_json::Value;

/// Validator: field is required (not null)
pub fn required(
    message: impl Into<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    let message = message.into();
    move |_: &str, value: &Value| {
        if value.is_null() {
            Err(message.clone())
        } else {
            Ok(())
        }
    }
}

/// Validator: value must be a number
///
/// Coercion leaves a null behind when the submitted text is not a number.
pub fn number(
    message: impl Into<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    let message = message.into();
    move |_: &str, value: &Value| {
        if value.is_number() {
            Ok(())
        } else {
            Err(message.clone())
        }
    }
}

/// Validator: number must be strictly positive
pub fn positive(
    message: impl Into<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    let message = message.into();
    move |_: &str, value: &Value| match value.as_f64() {
        Some(num) if num <= 0.0 => Err(message.clone()),
        _ => Ok(()), // non-numbers are left to `number()`
    }
}

/// Validator: number must convert to at least one minor unit
///
/// Rejects amounts that round to zero cents or overflow the stored range.
pub fn whole_minor_units(
    message: impl Into<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    let message = message.into();
    move |_: &str, value: &Value| match value.as_f64() {
        Some(num) => match to_minor_units(num) {
            Some(cents) if cents >= 1 => Ok(()),
            _ => Err(message.clone()),
        },
        None => Ok(()),
    }
}

/// Validator: value must be in allowed list
///
/// Anything that is not a string is rejected too.
pub fn in_list(
    allowed: &[&str],
    message: impl Into<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    let allowed: Vec<String> = allowed.iter().map(|s| s.to_string()).collect();
    let message = message.into();
    move |_: &str, value: &Value| match value.as_str() {
        Some(s) if allowed.iter().any(|a| a == s) => Ok(()),
        _ => Err(message.clone()),
    }
}

/// Validator: date must match format
pub fn date_format(
    format: &'static str,
    message: impl Into<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    let message = message.into();
    move |_: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            match chrono::NaiveDate::parse_from_str(s, format) {
                Ok(_) => Ok(()),
                Err(_) => Err(message.clone()),
            }
        } else {
            Ok(())
        }
    }
}
