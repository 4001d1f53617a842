//! Wire types for the external risk backends.
//!
//! Field names follow the backends' JSON contracts. Every request type
//! implements [`Validate`]; clients call it before anything goes on the wire.

pub mod analytics;
pub mod ecl;
pub mod prinad;
pub mod propensao;

use crate::error::{CoreError, Result};

/// Client-side input validation, run before a request is submitted.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub(crate) fn check_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{field} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

pub(crate) fn check_probability(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{field} must be between 0 and 1, got {value}"
        )));
    }
    Ok(())
}

pub(crate) fn check_batch<T: Validate>(field: &str, items: &[T], max: usize) -> Result<()> {
    if items.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if items.len() > max {
        return Err(CoreError::Validation(format!(
            "{field} has {} items, maximum is {max}",
            items.len()
        )));
    }
    for (i, item) in items.iter().enumerate() {
        item.validate()
            .map_err(|e| CoreError::Validation(format!("{field}[{i}]: {e}")))?;
    }
    Ok(())
}
