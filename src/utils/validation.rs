use crate::error::{Error, Result};

pub const MOBILE_LENGTH: usize = 10;

/// A participant mobile number: exactly ten ASCII digits.
pub fn is_valid_mobile(mobile: &str) -> bool {
    mobile.len() == MOBILE_LENGTH && mobile.bytes().all(|b| b.is_ascii_digit())
}

pub fn require_mobile(mobile: &str) -> Result<()> {
    if is_valid_mobile(mobile) {
        Ok(())
    } else {
        Err(Error::BadRequest(
            "mobile must be exactly 10 digits".to_string(),
        ))
    }
}

pub fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}
