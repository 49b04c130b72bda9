use crate::{
    error::Result,
    models::{ContentRequest, ContentResponse, UploadedImage},
};
use async_trait::async_trait;

/// The external multimodal model: a prompt plus images in, images and/or text out.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_content(&self, request: ContentRequest) -> Result<ContentResponse>;

    fn model_name(&self) -> &str;
}

/// Resolves a remote URL into image bytes.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<UploadedImage>;
}
