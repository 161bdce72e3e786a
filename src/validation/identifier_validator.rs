use crate::api::middleware::AppError;

/// Characters that would let an identifier break out of its clause
const FORBIDDEN: &[char] = &['|', '"', '\'', '`', '(', ')', ';', '=', '<', '>', '!', ',', '#'];

/// Validation for names interpolated into lake queries
pub struct IdentifierValidator;

impl IdentifierValidator {
    /// Validate a pool reference such as `logs` or `logs@main`
    pub fn validate_pool(pool: &str) -> Result<(), AppError> {
        Self::validate("Pool name", pool)
    }

    /// Validate a field name such as `ts` or `event.when`
    pub fn validate_field(field: &str) -> Result<(), AppError> {
        Self::validate("Time field name", field)
    }

    fn validate(what: &str, name: &str) -> Result<(), AppError> {
        if name.is_empty() {
            return Err(AppError::Validation(format!("{} cannot be empty", what)));
        }

        if let Some(bad) = name
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || FORBIDDEN.contains(c))
        {
            return Err(AppError::Validation(format!(
                "{} '{}' contains the invalid character {:?}",
                what, name, bad
            )));
        }

        Ok(())
    }
}
