//! Schema-driven form validation.
//!
//! Tenants design their own contact form; the schema travels with the
//! landing configuration and this module turns it into validation rules.
//! All checks are pure string inspection, no IO.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum accepted length for long-text fields.
const TEXT_AREA_MIN_LEN: usize = 10;

/// The kinds of fields a tenant can put on their contact form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFieldKind {
    Text,
    Email,
    TextArea,
    Phone,
    Number,
}

/// One field of a tenant's contact form, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Field label; doubles as the submission key.
    pub label: String,
    pub kind: FormFieldKind,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// Ordered field list describing a tenant's contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSchema {
    pub fields: Vec<FormField>,
}

/// Per-field validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub label: String,
    pub reason: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("form validation failed: {0} field(s) invalid", .errors.len())]
pub struct FormValidationError {
    pub errors: Vec<FieldError>,
}

impl FormSchema {
    /// The out-of-the-box contact form a new tenant starts with.
    pub fn default_contact() -> Self {
        Self {
            fields: vec![
                FormField {
                    label: "Nombre".to_string(),
                    kind: FormFieldKind::Text,
                    required: true,
                },
                FormField {
                    label: "Email".to_string(),
                    kind: FormFieldKind::Email,
                    required: true,
                },
                FormField {
                    label: "Mensaje".to_string(),
                    kind: FormFieldKind::TextArea,
                    required: true,
                },
            ],
        }
    }

    /// A schema is usable when it has at least one field and no duplicate
    /// labels (labels key the submission map).
    pub fn check_well_formed(&self) -> Result<(), FormValidationError> {
        let mut errors = Vec::new();

        if self.fields.is_empty() {
            errors.push(FieldError {
                label: String::new(),
                reason: "schema must have at least one field".to_string(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if field.label.trim().is_empty() {
                errors.push(FieldError {
                    label: field.label.clone(),
                    reason: "label cannot be empty".to_string(),
                });
            } else if !seen.insert(field.label.as_str()) {
                errors.push(FieldError {
                    label: field.label.clone(),
                    reason: "duplicate label".to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(FormValidationError { errors })
        }
    }

    /// Validate a submission against this schema.
    ///
    /// Required fields must be present and non-empty. Optional fields may be
    /// absent or empty, but a present non-empty value is still shape-checked
    /// for its kind. Keys not in the schema are ignored.
    pub fn validate(&self, values: &BTreeMap<String, String>) -> Result<(), FormValidationError> {
        let mut errors = Vec::new();

        for field in &self.fields {
            let value = values.get(&field.label).map(String::as_str).unwrap_or("");
            let value = value.trim();

            if value.is_empty() {
                if field.required {
                    errors.push(FieldError {
                        label: field.label.clone(),
                        reason: "is required".to_string(),
                    });
                }
                continue;
            }

            if let Err(reason) = check_shape(field.kind, value) {
                errors.push(FieldError {
                    label: field.label.clone(),
                    reason,
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(FormValidationError { errors })
        }
    }
}

fn check_shape(kind: FormFieldKind, value: &str) -> Result<(), String> {
    match kind {
        FormFieldKind::Text => Ok(()),
        FormFieldKind::Email => check_email(value),
        FormFieldKind::TextArea => {
            if value.chars().count() < TEXT_AREA_MIN_LEN {
                Err(format!("must be at least {TEXT_AREA_MIN_LEN} characters"))
            } else {
                Ok(())
            }
        }
        FormFieldKind::Phone => check_phone(value),
        FormFieldKind::Number => {
            if value.parse::<f64>().is_ok() {
                Ok(())
            } else {
                Err("must be a number".to_string())
            }
        }
    }
}

/// `local@domain.tld` shape check. Not full RFC 5322; matches what the
/// storefront accepts.
fn check_email(value: &str) -> Result<(), String> {
    let err = || "must be a valid email address".to_string();

    if value.contains(char::is_whitespace) {
        return Err(err());
    }
    let (local, domain) = value.split_once('@').ok_or_else(err)?;
    if local.is_empty() || domain.contains('@') {
        return Err(err());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(err)?;
    if host.is_empty() || tld.is_empty() {
        return Err(err());
    }
    Ok(())
}

/// Digits plus common separators, at least six digits total.
fn check_phone(value: &str) -> Result<(), String> {
    let err = || "must be a valid phone number".to_string();

    let mut digits = 0;
    for c in value.chars() {
        match c {
            '0'..='9' => digits += 1,
            '+' | '-' | ' ' | '(' | ')' | '.' => {}
            _ => return Err(err()),
        }
    }
    if digits < 6 {
        return Err(err());
    }
    Ok(())
}
