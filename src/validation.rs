/// Field-level input checks shared by the services
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Trimmed, non-empty, at most `max` characters
pub fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(field, format!("Please provide {}", field)));
    }
    check_length(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Blank input collapses to `None`
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, FieldError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            check_length(field, trimmed, max)?;
            Ok(Some(trimmed.to_string()))
        }
    }
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), FieldError> {
    if value.chars().count() > max {
        return Err(FieldError::new(
            field,
            format!("{} cannot be more than {} characters", field, max),
        ));
    }
    Ok(())
}

/// Lowercased address with a single `@` and a dotted domain
pub fn email(value: &str) -> Result<String, FieldError> {
    let candidate = value.trim().to_lowercase();
    let valid = match candidate.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !candidate.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(FieldError::new("email", "Please provide a valid email"));
    }
    Ok(candidate)
}

/// Aadhar numbers are 12 digits; spaces between groups are tolerated
pub fn aadhar_number(value: &str) -> Result<String, FieldError> {
    let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::new(
            "aadharNumber",
            "Aadhar number must be 12 digits",
        ));
    }
    Ok(digits)
}
