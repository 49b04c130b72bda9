use crate::{
    error::{MemeError, Result},
    models::{sniff_mime_type, UploadedImage},
    traits::ImageFetcher,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Downloads remote template images.
#[derive(Clone)]
pub struct TemplateClient {
    client: Client,
}

impl TemplateClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MemeError::ConfigError(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

/// Content-Type header wins when it names an image; otherwise sniff the bytes.
pub(crate) fn resolve_mime_type(header: Option<&str>, bytes: &[u8]) -> Option<String> {
    header
        .map(|value| value.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .filter(|value| value.starts_with("image/"))
        .or_else(|| sniff_mime_type(bytes).map(String::from))
}

#[async_trait]
impl ImageFetcher for TemplateClient {
    async fn fetch(&self, url: &str) -> Result<UploadedImage> {
        log::debug!("Downloading template from: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            log::error!("Failed to fetch image from {}: {}", url, e);
            MemeError::TemplateFetchError(format!("Failed to fetch image: {}.", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            log::error!(
                "Failed to fetch image from {}. Status: {}",
                url,
                status.as_u16()
            );
            return Err(MemeError::TemplateFetchError(format!(
                "Failed to fetch image. Status: {}.",
                status.as_u16()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response.bytes().await.map_err(|e| {
            MemeError::TemplateFetchError(format!("Failed to read image bytes: {}.", e))
        })?;

        if bytes.is_empty() {
            return Err(MemeError::TemplateFetchError(
                "Fetched template image was empty.".into(),
            ));
        }

        let mime_type = resolve_mime_type(content_type.as_deref(), &bytes).ok_or_else(|| {
            MemeError::TemplateFetchError(format!(
                "{} did not return an image (content type: {}).",
                url,
                content_type.as_deref().unwrap_or("unknown")
            ))
        })?;

        Ok(UploadedImage::new(bytes.to_vec(), mime_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_mime_type_prefers_header() {
        assert_eq!(
            resolve_mime_type(Some("image/jpeg; charset=binary"), b"whatever").as_deref(),
            Some("image/jpeg")
        );
    }

    #[test]
    fn test_resolve_mime_type_sniffs_when_header_is_generic() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A];
        assert_eq!(
            resolve_mime_type(Some("application/octet-stream"), &png).as_deref(),
            Some("image/png")
        );
        assert_eq!(resolve_mime_type(None, &png).as_deref(), Some("image/png"));
        assert_eq!(resolve_mime_type(Some("text/html"), b"<html>"), None);
    }
}
