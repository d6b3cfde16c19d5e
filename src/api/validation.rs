use super::ApiError;

pub fn validate_poll_id(id: &str) -> Result<&str, ApiError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Poll id cannot be empty"));
    }

    if trimmed.len() > 64 {
        return Err(ApiError::validation("Poll id must be 64 characters or less"));
    }

    Ok(trimmed)
}

pub fn validate_user_id(id: &str) -> Result<&str, ApiError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("User id cannot be empty"));
    }

    Ok(trimmed)
}
