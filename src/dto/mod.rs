pub mod auth;
pub mod categories;
pub mod employees;
pub mod orders;
pub mod products;

use validator::ValidationError;

/// Vietnamese mobile numbers: `0` or `84`, a carrier digit in {3,5,7,8,9}, then 8 digits.
pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    let rest = phone
        .strip_prefix("84")
        .or_else(|| phone.strip_prefix('0'))
        .unwrap_or("");
    let valid = rest.len() == 9
        && rest.chars().all(|c| c.is_ascii_digit())
        && matches!(rest.as_bytes()[0], b'3' | b'5' | b'7' | b'8' | b'9');
    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_number");
        err.message = Some("must be a valid phone number".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::validate_phone_number;

    #[test]
    fn accepts_local_and_international_forms() {
        assert!(validate_phone_number("0912345678").is_ok());
        assert!(validate_phone_number("84912345678").is_ok());
        assert!(validate_phone_number("0387654321").is_ok());
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(validate_phone_number("").is_err());
        assert!(validate_phone_number("0212345678").is_err());
        assert!(validate_phone_number("091234567").is_err());
        assert!(validate_phone_number("09123456789").is_err());
        assert!(validate_phone_number("09123a5678").is_err());
    }
}
