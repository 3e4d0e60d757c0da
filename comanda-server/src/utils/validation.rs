//! Input guards shared by the engine and handlers

use super::{AppError, AppResult};

/// Maximum length for names (tables, menu items, staff display names)
pub const MAX_NAME_LEN: usize = 255;
/// Maximum length for free-text notes
pub const MAX_NOTE_LEN: usize = 500;
/// Maximum allowed quantity per order item
pub const MAX_QUANTITY: i32 = 999;
/// Maximum allowed price per menu item
pub const MAX_PRICE: f64 = 1_000_000.0;

/// Validate a required name field
pub fn validate_name(value: &str, field: &str) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum length of {MAX_NAME_LEN}"
        )));
    }
    Ok(())
}

/// Validate an optional free-text note
pub fn validate_note(value: Option<&str>, field: &str) -> AppResult<()> {
    if let Some(note) = value
        && note.len() > MAX_NOTE_LEN
    {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum length of {MAX_NOTE_LEN}"
        )));
    }
    Ok(())
}

/// Validate an order item quantity
pub fn validate_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::validation("quantity must be at least 1"));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY})"
        )));
    }
    Ok(())
}

/// Validate a monetary amount (finite, non-negative, bounded)
pub fn validate_price(price: f64, field: &str) -> AppResult<()> {
    if !price.is_finite() {
        return Err(AppError::validation(format!(
            "{field} must be a finite number, got {price}"
        )));
    }
    if price < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be non-negative, got {price}"
        )));
    }
    if price > MAX_PRICE {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_PRICE})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_rejected() {
        assert!(validate_name("  ", "name").is_err());
        assert!(validate_name("T1", "name").is_ok());
    }

    #[test]
    fn quantity_bounds() {
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
    }

    #[test]
    fn price_guards() {
        assert!(validate_price(f64::NAN, "price").is_err());
        assert!(validate_price(-0.01, "price").is_err());
        assert!(validate_price(9.99, "price").is_ok());
    }
}
