//! Input validation for untrusted request data.
//!
//! Everything the browser sends is checked here before it reaches the
//! upstream API.

use std::str::FromStr;

use board_tutor::Voice;
use thiserror::Error;

/// Maximum accepted API key length.
pub const MAX_API_KEY_LEN: usize = 512;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No key, or only whitespace.
    #[error("OpenAI API key is required")]
    MissingApiKey,
    /// Key exceeds maximum length.
    #[error("API key too long (max {MAX_API_KEY_LEN} chars)")]
    ApiKeyTooLong,
    /// Key contains whitespace or control characters.
    #[error("API key contains invalid characters")]
    ApiKeyInvalidChars,
    /// Voice is not offered by the realtime API.
    #[error("unsupported voice: {0}")]
    UnsupportedVoice(String),
}

impl ValidationError {
    /// Short label for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "api_key_missing",
            Self::ApiKeyTooLong | Self::ApiKeyInvalidChars => "api_key",
            Self::UnsupportedVoice(_) => "voice",
        }
    }
}

/// Validate an API key and return it trimmed.
///
/// # Errors
///
/// Returns [`ValidationError::MissingApiKey`] for a missing or blank key,
/// [`ValidationError::ApiKeyTooLong`] past [`MAX_API_KEY_LEN`], and
/// [`ValidationError::ApiKeyInvalidChars`] for embedded whitespace or control
/// characters.
pub fn validate_api_key(key: Option<&str>) -> Result<&str, ValidationError> {
    let key = key.map(str::trim).unwrap_or_default();
    if key.is_empty() {
        return Err(ValidationError::MissingApiKey);
    }
    if key.len() > MAX_API_KEY_LEN {
        return Err(ValidationError::ApiKeyTooLong);
    }
    if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::ApiKeyInvalidChars);
    }
    Ok(key)
}

/// Resolve the requested voice, defaulting to [`Voice::Alloy`].
///
/// # Errors
///
/// Returns [`ValidationError::UnsupportedVoice`] for unknown names.
pub fn validate_voice(voice: Option<&str>) -> Result<Voice, ValidationError> {
    match voice.map(str::trim) {
        None | Some("") => Ok(Voice::default()),
        Some(name) => {
            Voice::from_str(name).map_err(|_| ValidationError::UnsupportedVoice(name.to_string()))
        }
    }
}
