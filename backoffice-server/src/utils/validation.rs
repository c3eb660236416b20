//! Input validation helpers
//!
//! Numeric bounds for money and quantities, plus parsing of typed setting
//! values. Text length limits live on the payload types (`validator`).

use crate::utils::AppError;
use rust_decimal::Decimal;
use shared::models::SettingType;

/// Maximum allowed unit price / product price
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Maximum allowed quantity per line item
pub const MAX_QUANTITY: i32 = 9999;

/// Maximum setting key length
pub const MAX_KEY_LEN: usize = 100;

/// Validate a price: non-negative and within bounds.
pub fn validate_price(value: Decimal, field: &str) -> Result<(), AppError> {
    if value < Decimal::ZERO {
        return Err(AppError::validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    if value > MAX_PRICE {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_PRICE}), got {value}"
        )));
    }
    Ok(())
}

/// Validate a line item quantity (1..=MAX_QUANTITY).
pub fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::validation(format!(
            "quantity must be at least 1, got {quantity}"
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {quantity}"
        )));
    }
    Ok(())
}

/// Validate a setting key: non-empty, bounded, no surrounding whitespace.
pub fn validate_setting_key(key: &str) -> Result<(), AppError> {
    if key.trim().is_empty() {
        return Err(AppError::validation("key must not be empty"));
    }
    if key.trim() != key {
        return Err(AppError::validation("key must not have surrounding whitespace"));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(AppError::validation(format!(
            "key is too long ({} chars, max {MAX_KEY_LEN})",
            key.len()
        )));
    }
    Ok(())
}

/// Validate a setting value against its declared type.
///
/// `None` is always accepted (unset value).
pub fn validate_setting_value(value: Option<&str>, value_type: SettingType) -> Result<(), AppError> {
    let Some(raw) = value else {
        return Ok(());
    };
    match value_type {
        SettingType::String => Ok(()),
        SettingType::Number => raw
            .trim()
            .parse::<Decimal>()
            .map(|_| ())
            .map_err(|_| AppError::validation(format!("value '{raw}' is not a number"))),
        SettingType::Boolean => match raw.trim() {
            "true" | "false" => Ok(()),
            _ => Err(AppError::validation(format!(
                "value '{raw}' is not a boolean (expected true/false)"
            ))),
        },
        SettingType::Json => serde_json::from_str::<serde_json::Value>(raw)
            .map(|_| ())
            .map_err(|e| AppError::validation(format!("value is not valid JSON: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Decimal::ZERO, "price").is_ok());
        assert!(validate_price(Decimal::new(1999, 2), "price").is_ok());
        assert!(validate_price(Decimal::new(-1, 2), "price").is_err());
        assert!(validate_price(MAX_PRICE + Decimal::ONE, "price").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_setting_value() {
        assert!(validate_setting_value(Some("8.25"), SettingType::Number).is_ok());
        assert!(validate_setting_value(Some("eight"), SettingType::Number).is_err());
        assert!(validate_setting_value(Some("true"), SettingType::Boolean).is_ok());
        assert!(validate_setting_value(Some("yes"), SettingType::Boolean).is_err());
        assert!(validate_setting_value(Some("{\"a\":1}"), SettingType::Json).is_ok());
        assert!(validate_setting_value(Some("{a:1"), SettingType::Json).is_err());
        assert!(validate_setting_value(None, SettingType::Number).is_ok());
    }

    #[test]
    fn test_validate_setting_key() {
        assert!(validate_setting_key(shared::models::GLOBAL_TAX_RATE_KEY).is_ok());
        assert!(validate_setting_key("").is_err());
        assert!(validate_setting_key(" padded ").is_err());
    }
}
