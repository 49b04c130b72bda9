pub mod image_client;
pub mod template_client;

use crate::{config::GeminiConfig, error::Result, traits::ImageGenerator};
use std::sync::Arc;

pub use image_client::GeminiImageClient;
pub use template_client::TemplateClient;

#[derive(Clone)]
pub struct GeminiClient {
    image_client: GeminiImageClient,
    template_client: TemplateClient,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        Ok(Self {
            image_client: GeminiImageClient::new(config)?,
            template_client: TemplateClient::new(config.timeout)?,
        })
    }

    pub fn image(&self) -> &GeminiImageClient {
        &self.image_client
    }

    pub fn templates(&self) -> &TemplateClient {
        &self.template_client
    }

    /// The image client as the orchestrator's collaborator.
    pub fn generator(&self) -> Arc<dyn ImageGenerator> {
        Arc::new(self.image_client.clone())
    }
}
