//! Shared form-validation plumbing.
//!
//! Every form in the application validates with `validator` schemas and, on
//! failure, re-renders with the messages grouped per field. `FieldErrors` is
//! that grouping: an ordered field → messages map, carried as a value (not an
//! exception) so handlers can branch on it.

use std::collections::BTreeMap;

use validator::ValidationErrors;

/// Per-field validation messages, ordered by field name so re-rendered forms
/// are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages for one field; empty when the field validated cleanly.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

/// Flattens a `validator` result into `FieldErrors`.
///
/// Messages declared on the schema attributes are used verbatim; validators
/// without one fall back to a generic message per code.
pub fn collect(result: Result<(), ValidationErrors>) -> FieldErrors {
    let mut out = FieldErrors::new();
    if let Err(errors) = result {
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| default_message(error.code.as_ref()));
                out.add(field, message);
            }
        }
    }
    out
}

fn default_message(code: &str) -> String {
    match code {
        "email" => "Not a valid email address.".to_string(),
        "length" => "Invalid length.".to_string(),
        "must_match" => "Fields do not match.".to_string(),
        _ => "Invalid value.".to_string(),
    }
}
