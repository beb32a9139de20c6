//! Validation utilities for order submission

use crate::models::OrderLine;

/// Validate that a required free-text field is present
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Value is required");
    }
    Ok(())
}

/// Validate an order header: operator and customer are mandatory, and the
/// order must carry at least one line
pub fn validate_order_header(
    requested_by: &str,
    customer: &str,
    lines: &[OrderLine],
) -> Result<(), &'static str> {
    validate_required(requested_by).map_err(|_| "Requesting user is required")?;
    validate_required(customer).map_err(|_| "Customer is required")?;
    if lines.is_empty() {
        return Err("Order must contain at least one line");
    }
    Ok(())
}

/// Validate a requested quantity (positive integer)
pub fn validate_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a product code (non-empty, no surrounding whitespace)
pub fn validate_product_code(code: &str) -> Result<(), &'static str> {
    if code.is_empty() {
        return Err("Product code is required");
    }
    if code.trim() != code {
        return Err("Product code must not have surrounding whitespace");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_order_header_valid() {
        let lines = vec![OrderLine::new("X1", 1)];
        assert!(validate_order_header("ana", "Acme", &lines).is_ok());
    }

    #[test]
    fn test_validate_order_header_missing_user() {
        let lines = vec![OrderLine::new("X1", 1)];
        assert!(validate_order_header("  ", "Acme", &lines).is_err());
    }

    #[test]
    fn test_validate_order_header_missing_customer() {
        let lines = vec![OrderLine::new("X1", 1)];
        assert_eq!(
            validate_order_header("ana", " \t", &lines),
            Err("Customer is required")
        );
    }

    #[test]
    fn test_validate_order_header_no_lines() {
        assert!(validate_order_header("ana", "Acme", &[]).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_product_code() {
        assert!(validate_product_code("7701").is_ok());
        assert!(validate_product_code("").is_err());
        assert!(validate_product_code(" 7701").is_err());
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("x").is_ok());
        assert!(validate_required(" ").is_err());
    }
}
