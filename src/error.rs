//! Portal-level errors and field validation.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::api::ApiError;

/// Errors returned by the portal's flows
#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Local validation refused the input; no request was sent
    #[error("{}", .0.summary())]
    Validation(FieldErrors),

    /// Map/unmap attempted without a selected manager
    #[error("Please select a manager first.")]
    NoManagerSelected,

    /// The employee already reports to a manager and the policy refuses remapping
    #[error("{0} is already assigned to a manager.")]
    AlreadyMapped(String),

    #[error("Not permitted: {0}")]
    NotPermitted(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PortalError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            PortalError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Validation errors keyed by field (a field name or a question index)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
    summary: Option<String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single form-level message with no field attached
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            errors: BTreeMap::new(),
            summary: Some(message.into()),
        }
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors.insert(field.into(), message.into());
        self
    }

    /// Message shown above the form instead of the per-field list
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) {
        self.errors.remove(field);
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.summary.is_none()
    }

    pub fn summary(&self) -> String {
        if let Some(summary) = &self.summary {
            return summary.clone();
        }
        match self.errors.len() {
            0 => "Validation failed".to_string(),
            1 => self
                .errors
                .iter()
                .next()
                .map(|(field, msg)| format!("{}: {}", field, msg))
                .unwrap_or_default(),
            n => format!("Validation failed for {} fields", n),
        }
    }

    /// Ok when nothing was recorded, else a validation error
    pub fn finish(self) -> Result<(), PortalError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(PortalError::Validation(self))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_builder() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());
        errors.add("1", "This field is required");
        errors.add("3", "This field is required");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["1", "3"]);
        assert!(errors.summary().contains("2 fields"));

        errors.remove("1");
        assert_eq!(errors.summary(), "3: This field is required");
    }

    #[test]
    fn test_summary_override() {
        let errors = FieldErrors::message("Please fill in all fields");
        assert!(!errors.is_empty());
        let err = errors.finish().unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all fields");
        assert!(err.field_errors().is_some());
    }

    #[test]
    fn test_finish_ok_when_empty() {
        assert!(FieldErrors::new().finish().is_ok());
    }
}
