use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Gemini API Error: {0}")]
    ApiError(String),

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The call settled but carried no inline image. Holds whatever text the
    /// model sent back instead, if any.
    #[error("{}", no_image_message(.0))]
    NoImageInResponse(Option<String>),

    #[error("Call timed out after {0}s")]
    Timeout(u64),

    #[error("{0}")]
    NoImagesProduced(String),

    #[error("Story panel {panel} of {total} failed: {reason}")]
    StoryPanelFailed {
        panel: usize,
        total: usize,
        reason: String,
    },

    #[error("{0} This may be a cross-origin issue if the host blocks direct downloads.")]
    TemplateFetchError(String),

    #[error("File error: {0}")]
    FileError(String),

    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),
}

fn no_image_message(text: &Option<String>) -> String {
    match text.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => format!(
            "The model responded with text instead of an image: \"{}\"",
            text
        ),
        _ => "The model response was empty or did not contain an image. This could be due to a safety policy violation.".to_string(),
    }
}

impl MemeError {
    /// Errors raised before any call reaches the generation API.
    pub fn is_validation(&self) -> bool {
        matches!(self, MemeError::ValidationError(_))
    }
}

impl From<reqwest::Error> for MemeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MemeError::ApiError(format!("request timed out: {}", e))
        } else {
            MemeError::ApiError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for MemeError {
    fn from(e: serde_json::Error) -> Self {
        MemeError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MemeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_errors_carry_prefix() {
        let err = MemeError::ApiError("connection refused".into());
        assert_eq!(err.to_string(), "Gemini API Error: connection refused");
    }

    #[test]
    fn test_no_image_message_surfaces_text() {
        let err = MemeError::NoImageInResponse(Some("  I can't draw that. ".into()));
        assert_eq!(
            err.to_string(),
            "The model responded with text instead of an image: \"I can't draw that.\""
        );

        let empty = MemeError::NoImageInResponse(Some("   ".into()));
        assert!(empty.to_string().contains("safety policy"));
        assert!(MemeError::NoImageInResponse(None)
            .to_string()
            .contains("safety policy"));
    }

    #[test]
    fn test_template_fetch_mentions_cross_origin() {
        let err = MemeError::TemplateFetchError("Failed to fetch image. Status: 403.".into());
        assert!(err.to_string().contains("cross-origin"));
        assert!(!err.is_validation());
    }
}
