//! Currency code validation.
//!
//! The ledger is single-currency per account: an account carries one ISO 4217
//! code and amounts never convert between currencies. Validation here only
//! checks the code shape, not membership in the ISO registry.

/// Validates that a currency code has the ISO 4217 shape
/// (exactly three ASCII uppercase letters).
///
/// # Errors
///
/// Returns a human-readable message describing the violation.
pub fn validate_currency_code(code: &str) -> Result<(), String> {
    if code.len() != 3 {
        return Err(format!(
            "Currency code must be exactly 3 characters, got '{code}'"
        ));
    }
    if !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(format!(
            "Currency code must be ASCII uppercase letters, got '{code}'"
        ));
    }
    Ok(())
}
