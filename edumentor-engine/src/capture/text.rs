use edumentor_core::errors::ValidationError;

/// Trimmed question text; blank input is rejected.
pub fn read_question(raw: &str) -> Result<String, ValidationError> {
    let query = raw.trim();
    if query.is_empty() {
        return Err(ValidationError::EmptyQuestion);
    }
    Ok(query.to_string())
}
