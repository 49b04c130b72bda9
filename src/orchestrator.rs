//! Turns a [`GenerationRequest`] into calls against an [`ImageGenerator`].
//!
//! Classic and popular requests fan out into independent calls that are all
//! awaited together; slots that come back without an image are dropped.
//! Story requests run one panel at a time, each panel seeing the previous
//! one, and abort on the first failed panel.

use crate::{
    config::OrchestratorConfig,
    error::{MemeError, Result},
    logger,
    models::{
        ContentRequest, DigitalTwinStyle, GenerationMode, GenerationRequest, GenerationResult,
        StoryPanel, UploadedImage,
    },
    prompts::{build_digital_twin_prompt, build_prompt, build_story_prompt},
    traits::ImageGenerator,
};
use futures::future::join_all;
use std::sync::Arc;

const VARIATIONS_FAILED: &str = "The AI failed to generate any meme variations. This can happen due to safety policies or if the request is unclear. Try a different image or topic.";
const CUSTOM_FAILED: &str = "The AI failed to generate the custom meme. This can happen due to safety policies or if the instruction is unclear. Try a different template, image, or instruction.";

#[derive(Clone)]
pub struct MemeOrchestrator {
    generator: Arc<dyn ImageGenerator>,
    config: OrchestratorConfig,
}

impl MemeOrchestrator {
    pub fn new(generator: Arc<dyn ImageGenerator>, config: OrchestratorConfig) -> Self {
        Self { generator, config }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        request.validate()?;

        let _timer = logger::timer(&format!("{} generation", request.mode));
        log::info!(
            "🎨 Generating {} meme from {} image(s) with {}",
            request.mode,
            request.source_images.len(),
            self.generator.model_name()
        );

        let result = match request.mode {
            GenerationMode::Classic | GenerationMode::Popular => {
                self.generate_variations(request).await
            }
            GenerationMode::Custom => self.generate_custom(request).await,
            GenerationMode::Story => self
                .generate_story(request)
                .await
                .map(|panels| panels.iter().map(StoryPanel::to_data_uri).collect()),
        };

        match &result {
            Ok(images) => log::info!("✅ {} generation produced {} image(s)", request.mode, images.len()),
            Err(e) => log::error!("❌ {} generation failed: {}", request.mode, e),
        }
        result
    }

    /// Generates the strip panel by panel. Any failed panel fails the whole
    /// story; nothing after it is requested.
    pub async fn generate_story(&self, request: &GenerationRequest) -> Result<Vec<StoryPanel>> {
        request.validate()?;

        let reference = request.reference_image().ok_or_else(|| {
            MemeError::ValidationError("An image is required for story mode.".into())
        })?;
        let total = self.config.story_panels;
        let mut panels: Vec<StoryPanel> = Vec::with_capacity(total);

        for index in 1..=total {
            let previous = panels.last().map(|panel| &panel.image);
            let prompt = build_story_prompt(index, total, &request.topic, previous.is_some());

            let mut call = ContentRequest::new(prompt).with_image(reference.clone());
            if let Some(previous) = previous {
                call = call.with_image(previous.clone());
            }

            log::debug!("Requesting story panel {} of {}", index, total);
            let image = self.call(call).await.map_err(|e| {
                log::error!("❌ Story panel {} of {} failed: {}", index, total, e);
                MemeError::StoryPanelFailed {
                    panel: index,
                    total,
                    reason: e.to_string(),
                }
            })?;

            panels.push(StoryPanel { image, index });
        }

        Ok(panels)
    }

    pub async fn create_digital_twin(
        &self,
        image: &UploadedImage,
        style: DigitalTwinStyle,
    ) -> Result<UploadedImage> {
        if image.is_empty() {
            return Err(MemeError::ValidationError(
                "Please upload an image before creating a digital twin.".into(),
            ));
        }

        let _timer = logger::timer(&format!("digital twin ({})", style));
        log::info!("🧍 Creating {} digital twin", style.label());

        let call = ContentRequest::new(build_digital_twin_prompt(style)).with_image(image.clone());
        self.call(call).await.map_err(|e| match e {
            MemeError::NoImageInResponse(_) | MemeError::Timeout(_) => {
                MemeError::NoImagesProduced(format!("Failed to create the digital twin. {}", e))
            }
            other => other,
        })
    }

    async fn generate_variations(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let hints = &self.config.variation_hints;
        let calls = (0..self.config.fan_out)
            .map(|slot| {
                let hint = if hints.is_empty() {
                    None
                } else {
                    Some(hints[slot % hints.len()].as_str())
                };
                let prompt = build_prompt(request.mode, &request.topic, false, hint);
                ContentRequest::new(prompt).with_images(request.subject_images())
            })
            .collect();

        self.settle_all(calls, VARIATIONS_FAILED).await
    }

    async fn generate_custom(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let template = request.template_image.as_ref().ok_or_else(|| {
            MemeError::ValidationError("Please upload a meme template to use custom mode.".into())
        })?;

        let prompt = build_prompt(GenerationMode::Custom, &request.topic, true, None);
        let call = ContentRequest::new(prompt)
            .with_image(template.clone())
            .with_images(request.subject_images());

        self.settle_all(vec![call], CUSTOM_FAILED).await
    }

    /// Issues every call at once and waits for all of them to settle. Each
    /// slot keeps its own outcome; failures are logged and skipped.
    ///
    /// When nothing succeeds, `failure_message` is only used if every slot
    /// settled without an image. A transport or API failure in any slot is
    /// returned as is so its cause reaches the caller.
    async fn settle_all(
        &self,
        calls: Vec<ContentRequest>,
        failure_message: &str,
    ) -> Result<GenerationResult> {
        let total = calls.len();
        let outcomes = join_all(calls.into_iter().map(|call| self.call(call))).await;

        let mut images = Vec::with_capacity(total);
        let mut errors = Vec::new();
        for (slot, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(image) => images.push(image.to_data_uri()),
                Err(e) => {
                    log::warn!("⚠️  Variation {} of {} produced no image: {}", slot + 1, total, e);
                    errors.push(e);
                }
            }
        }

        if images.is_empty() {
            return Err(surface_failure(errors, failure_message));
        }
        Ok(images)
    }

    /// One call, bounded by the configured timeout. Succeeds only if the
    /// response carries an inline image.
    async fn call(&self, request: ContentRequest) -> Result<UploadedImage> {
        log::debug!(
            "Prompt of {} chars with {} image(s)",
            request.prompt().map(str::len).unwrap_or(0),
            request.images().count()
        );

        let timeout = self.config.call_timeout;
        let response = tokio::time::timeout(timeout, self.generator.generate_content(request))
            .await
            .map_err(|_| MemeError::Timeout(timeout.as_secs()))??;

        match response.first_image() {
            Some(image) => Ok(image.clone()),
            None => {
                if let Some(reason) = &response.block_reason {
                    log::warn!("Request blocked: {}", reason);
                }
                let error = MemeError::NoImageInResponse(response.text());
                log::warn!("{}", error);
                Err(error)
            }
        }
    }
}

/// Picks the error to report when every slot failed. API errors win over
/// timeouts, which win over anything else that isn't a plain missing image.
fn surface_failure(errors: Vec<MemeError>, failure_message: &str) -> MemeError {
    let rank = |e: &MemeError| match e {
        MemeError::ApiError(_) => 0,
        MemeError::Timeout(_) => 1,
        _ => 2,
    };

    errors
        .into_iter()
        .filter(|e| !matches!(e, MemeError::NoImageInResponse(_)))
        .min_by_key(rank)
        .unwrap_or_else(|| MemeError::NoImagesProduced(failure_message.to_string()))
}
