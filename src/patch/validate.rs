use std::fmt;

use super::PatchPayload;
use crate::errors::FieldErrors;

type Rule<R> = Box<dyn Fn(&R) -> Result<(), String> + Send + Sync>;

/// Conditional rules: each one runs only when its field was sent.
pub struct PatchValidator<R> {
    rules: Vec<(String, Rule<R>)>,
}

impl<R> Default for PatchValidator<R> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<R> fmt::Debug for PatchValidator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|(field, _)| field))
            .finish()
    }
}

impl<R> PatchValidator<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule for `field`. A field may carry several rules; each failure
    /// is reported.
    pub fn when_bound<F>(mut self, field: &str, rule: F) -> Self
    where
        F: Fn(&R) -> Result<(), String> + Send + Sync + 'static,
    {
        self.rules.push((field.to_string(), Box::new(rule)));
        self
    }

    /// Field names that carry at least one rule.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(field, _)| field.as_str())
    }

    pub fn validate(&self, payload: &PatchPayload<R>) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        for (field, rule) in &self.rules {
            if !payload.is_bound(field) {
                continue;
            }
            if let Err(message) = rule(&payload.request) {
                errors.push(field.as_str(), message);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

pub fn not_blank(value: Option<&str>) -> Result<(), String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(()),
        _ => Err("must not be empty".to_string()),
    }
}

pub fn max_chars(value: Option<&str>, max: usize) -> Result<(), String> {
    match value {
        Some(value) if value.chars().count() > max => {
            Err(format!("must be at most {max} characters"))
        }
        _ => Ok(()),
    }
}
