//! Declarative form schemas
//!
//! A [`FormSchema`] is an ordered set of [`FieldRule`]s keyed by field name.
//! Every rule is evaluated on every parse, so a submission with several bad
//! fields reports all of them. Derived schemas are built with
//! [`FormSchema::omit`] instead of repeating rules.

use crate::core::form::{FieldErrors, FormData};
use anyhow::Result;
use serde_json::{Map, Value};
use std::sync::Arc;

type ValidatorFn = Arc<dyn Fn(&str, &Value) -> std::result::Result<(), String> + Send + Sync>;
type FilterFn = Arc<dyn Fn(&str, Value) -> Result<Value> + Send + Sync>;

/// How the raw submitted text is turned into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Kept as a string; a missing field becomes null
    Text,
    /// Coerced to a number; missing or blank counts as 0, unparseable
    /// or non-finite text becomes null
    Number,
}

/// Rules for one field
#[derive(Clone)]
pub struct FieldRule {
    name: String,
    kind: FieldKind,
    filters: Vec<FilterFn>,
    validators: Vec<ValidatorFn>,
}

impl FieldRule {
    pub fn text(name: &str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, FieldKind::Number)
    }

    fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            filters: Vec::new(),
            validators: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Append a filter; filters run in order, before coercion
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Append a validator; the first failing validator decides the message
    pub fn validate<V>(mut self, validator: V) -> Self
    where
        V: Fn(&str, &Value) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Run filters, coercion and validators against a raw submitted value
    pub fn check(&self, raw: Option<&str>) -> std::result::Result<Value, String> {
        let mut value = match raw {
            Some(s) => Value::String(s.to_string()),
            None => Value::Null,
        };

        for filter in &self.filters {
            value = filter(&self.name, value).map_err(|e| e.to_string())?;
        }

        if self.kind == FieldKind::Number {
            value = coerce_number(value);
        }

        for validator in &self.validators {
            validator(&self.name, &value)?;
        }

        Ok(value)
    }
}

impl std::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("filters", &self.filters.len())
            .field("validators", &self.validators.len())
            .finish()
    }
}

fn coerce_number(value: Value) -> Value {
    match value {
        Value::Null => Value::from(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Value::from(0.0);
            }
            match s.parse::<f64>() {
                Ok(n) if n.is_finite() => Value::from(n),
                _ => Value::Null,
            }
        }
        other => other,
    }
}

/// Values that passed a schema, keyed by field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedForm(Map<String, Value>);

impl ParsedForm {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.0.get(field).and_then(Value::as_f64)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Ordered collection of field rules
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    rules: Vec<FieldRule>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add (or replace) the rule for a field
    pub fn field(mut self, rule: FieldRule) -> Self {
        self.rules.retain(|r| r.name != rule.name);
        self.rules.push(rule);
        self
    }

    /// Derive a schema without the given fields
    pub fn omit(&self, fields: &[&str]) -> Self {
        Self {
            rules: self
                .rules
                .iter()
                .filter(|r| !fields.contains(&r.name.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Derive a schema with only the given fields
    pub fn pick(&self, fields: &[&str]) -> Self {
        Self {
            rules: self
                .rules
                .iter()
                .filter(|r| fields.contains(&r.name.as_str()))
                .cloned()
                .collect(),
        }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    /// Validate a submission against every rule
    ///
    /// Fields not declared by the schema are ignored.
    pub fn safe_parse(&self, form: &FormData) -> std::result::Result<ParsedForm, FieldErrors> {
        let mut parsed = Map::new();
        let mut errors = FieldErrors::new();

        for rule in &self.rules {
            match rule.check(form.get(&rule.name)) {
                Ok(value) => {
                    parsed.insert(rule.name.clone(), value);
                }
                Err(message) => errors.add(&rule.name, message),
            }
        }

        if errors.is_empty() {
            Ok(ParsedForm(parsed))
        } else {
            Err(errors)
        }
    }
}
