//! Input validation helpers

use rust_decimal::Decimal;
use shared::error::AppError;

/// Brand and source names
pub const MAX_NAME_LEN: usize = 200;

/// Language codes, availability labels, client ids
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Upper bound for items in one catalog batch
pub const MAX_BATCH_LEN: usize = 500;

/// Language codes become one CPID segment
pub const MAX_LANGUAGE_LEN: usize = 8;

/// `reward_items.value` is `NUMERIC(12, 2)`
pub const VALUE_SCALE: u32 = 2;
pub const MAX_VALUE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// `reward_items.rebate_percentage` is `NUMERIC(6, 3)`
pub const PERCENTAGE_SCALE: u32 = 3;

/// Highest catalog position a reorder may set
pub const MAX_SORT_ORDER: i32 = 1_000_000;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")).with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Optional language code: letters and digits only, at most [`MAX_LANGUAGE_LEN`].
pub fn validate_language(value: &Option<String>, field: &str) -> Result<(), AppError> {
    let Some(v) = value else {
        return Ok(());
    };
    let trimmed = v.trim();
    if trimmed.len() > MAX_LANGUAGE_LEN {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {MAX_LANGUAGE_LEN})",
            trimmed.len()
        ))
        .with_detail("field", field));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(
            AppError::validation(format!("{field} must contain only letters and digits"))
                .with_detail("field", field),
        );
    }
    Ok(())
}

fn validate_scale(value: Decimal, field: &str, max_scale: u32) -> Result<(), AppError> {
    if value.normalize().scale() > max_scale {
        return Err(AppError::validation(format!(
            "{field} has more than {max_scale} decimal places"
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Monetary values must be positive and fit the value column
pub fn validate_value(value: Decimal, field: &str) -> Result<(), AppError> {
    if value <= Decimal::ZERO {
        return Err(AppError::validation(format!("{field} must be greater than 0")).with_detail("field", field));
    }
    if value > MAX_VALUE {
        return Err(AppError::validation(format!("{field} must not exceed {MAX_VALUE}")).with_detail("field", field));
    }
    validate_scale(value, field, VALUE_SCALE)
}

/// Rebate percentage within 0..=100
pub fn validate_percentage(value: Decimal, field: &str) -> Result<(), AppError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(AppError::validation(format!("{field} must be between 0 and 100")).with_detail("field", field));
    }
    validate_scale(value, field, PERCENTAGE_SCALE)
}

/// Catalog positions within 0..=[`MAX_SORT_ORDER`]
pub fn validate_sort_order(value: i32, field: &str) -> Result<(), AppError> {
    if !(0..=MAX_SORT_ORDER).contains(&value) {
        return Err(AppError::validation(format!(
            "{field} must be between 0 and {MAX_SORT_ORDER}"
        ))
        .with_detail("field", field));
    }
    Ok(())
}

pub fn validate_inventory(value: Option<i32>) -> Result<(), AppError> {
    if let Some(v) = value
        && v < 0
    {
        return Err(AppError::validation("inventory must not be negative").with_detail("field", "inventory"));
    }
    Ok(())
}

/// Non-empty batch without duplicates
pub fn validate_batch(ids: &[i64], field: &str) -> Result<(), AppError> {
    if ids.is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")).with_detail("field", field));
    }
    if ids.len() > MAX_BATCH_LEN {
        return Err(AppError::validation(format!(
            "{field} has too many entries ({}, max {MAX_BATCH_LEN})",
            ids.len()
        ))
        .with_detail("field", field));
    }
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
        return Err(AppError::validation(format!("{field} contains {dup} twice")).with_detail("field", field));
    }
    Ok(())
}
