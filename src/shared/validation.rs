use lazy_static::lazy_static;
use regex::Regex;
use validator::Validate;

use crate::core::error::{AppError, Result};

lazy_static! {
    /// Regex for validating user ids issued by the identity provider
    /// - Valid: "Wq3x9ZkP2aY", "user_123", "a-b"
    /// - Invalid: "", "user 1", "user/1"
    pub static ref UID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,128}$").unwrap();
}

/// Run `validator` rules on a DTO and convert failures into `AppError::Validation`
pub fn validate_dto<T: Validate>(dto: &T) -> Result<()> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string().replace('\n', "; ")))
}

/// Returns the trimmed value when it carries any text
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
