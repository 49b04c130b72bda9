//! Session state for a front-end driving the orchestrator.
//!
//! State only changes through [`AppState::reduce`]; the orchestrator never
//! sees it, only the [`GenerationRequest`] built from it.

use crate::{
    error::{MemeError, Result},
    models::{DigitalTwinStyle, GenerationMode, GenerationRequest, GenerationResult, UploadedImage},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub uploaded_images: Vec<UploadedImage>,
    pub template_image: Option<UploadedImage>,
    pub topic: String,
    pub mode: GenerationMode,
    pub twin_enabled: bool,
    pub twin_style: DigitalTwinStyle,
    pub digital_twin: Option<UploadedImage>,
    pub generated: GenerationResult,
    pub selected: Option<usize>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub celebrate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ImagesAdded(Vec<UploadedImage>),
    ImageRemoved(usize),
    TemplateSelected(UploadedImage),
    TemplateRemoved,
    TopicChanged(String),
    ModeChanged(GenerationMode),
    TwinToggled(bool),
    TwinStyleChanged(DigitalTwinStyle),
    TwinStarted,
    TwinCreated(UploadedImage),
    TwinFailed(String),
    TwinRemoved,
    UploadFailed(String),
    GenerationStarted,
    GenerationSucceeded(GenerationResult),
    GenerationFailed(String),
    MemeSelected(Option<usize>),
    Cleared,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset_results(&mut self) {
        self.generated.clear();
        self.selected = None;
        self.celebrate = false;
    }

    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::ImagesAdded(images) => {
                self.reset_results();
                self.error = None;
                self.uploaded_images.extend(images);
                // A twin is derived from the first image; new uploads don't change it.
            }
            Action::ImageRemoved(index) => {
                if index < self.uploaded_images.len() {
                    self.uploaded_images.remove(index);
                    if index == 0 {
                        self.digital_twin = None;
                    }
                }
            }
            Action::TemplateSelected(template) => {
                self.reset_results();
                self.error = None;
                self.template_image = Some(template);
            }
            Action::TemplateRemoved => self.template_image = None,
            Action::TopicChanged(topic) => self.topic = topic,
            Action::ModeChanged(mode) => self.mode = mode,
            Action::TwinToggled(enabled) => {
                self.twin_enabled = enabled;
                if !enabled {
                    self.digital_twin = None;
                }
            }
            Action::TwinStyleChanged(style) => {
                if self.digital_twin.is_none() {
                    self.twin_style = style;
                }
            }
            Action::TwinStarted => {
                self.is_loading = true;
                self.error = None;
            }
            Action::TwinCreated(twin) => {
                self.is_loading = false;
                self.digital_twin = Some(twin);
            }
            Action::TwinFailed(message) => {
                self.is_loading = false;
                self.error = Some(format!("Digital twin creation failed: {}", message));
            }
            Action::TwinRemoved => self.digital_twin = None,
            Action::UploadFailed(message) => {
                self.is_loading = false;
                self.error = Some(message);
            }
            Action::GenerationStarted => {
                self.reset_results();
                self.is_loading = true;
                self.error = None;
            }
            Action::GenerationSucceeded(images) => {
                self.is_loading = false;
                if images.is_empty() {
                    self.error = Some(
                        "Meme generation failed: The AI did not return any images. Please try a different source image or topic."
                            .to_string(),
                    );
                } else {
                    self.celebrate = self.mode != GenerationMode::Story;
                    self.generated = images;
                }
            }
            Action::GenerationFailed(message) => {
                self.is_loading = false;
                self.error = Some(format!("Meme generation failed: {}", message));
            }
            Action::MemeSelected(index) => {
                self.selected = index.filter(|i| *i < self.generated.len());
            }
            Action::Cleared => return AppState::default(),
        }
        self
    }

    pub fn uploader_title(&self) -> &'static str {
        self.mode.uploader_title()
    }

    pub fn can_generate(&self) -> bool {
        !self.is_loading && !self.uploaded_images.is_empty()
    }

    /// Builds the request for the current mode. A created digital twin is
    /// set as the request's reference image; the uploads are passed as is.
    pub fn to_request(&self) -> Result<GenerationRequest> {
        if self.is_loading {
            return Err(MemeError::ValidationError(
                "A generation is already in progress.".into(),
            ));
        }

        let mut request = GenerationRequest::new(self.uploaded_images.clone(), self.mode)
            .with_topic(self.topic.clone());
        if self.mode.requires_template() {
            request.template_image = self.template_image.clone();
        }
        if let (true, Some(twin)) = (self.twin_enabled, &self.digital_twin) {
            request = request.with_reference_image(twin.clone());
        }

        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(byte: u8) -> UploadedImage {
        UploadedImage::new(vec![byte; 3], "image/png")
    }

    #[test]
    fn test_upload_and_remove() {
        let state = AppState::new()
            .reduce(Action::ImagesAdded(vec![image(1), image(2)]))
            .reduce(Action::ImagesAdded(vec![image(3)]))
            .reduce(Action::ImageRemoved(1))
            .reduce(Action::ImageRemoved(10));
        assert_eq!(state.uploaded_images, vec![image(1), image(3)]);
    }

    #[test]
    fn test_generation_lifecycle() {
        let state = AppState::new()
            .reduce(Action::ImagesAdded(vec![image(1)]))
            .reduce(Action::GenerationStarted);
        assert!(state.is_loading);
        assert!(!state.can_generate());

        let state = state.reduce(Action::GenerationSucceeded(vec!["data:image/png;base64,AA==".into()]));
        assert!(!state.is_loading);
        assert!(state.celebrate);
        assert_eq!(state.generated.len(), 1);

        let state = state
            .reduce(Action::MemeSelected(Some(0)))
            .reduce(Action::GenerationStarted);
        assert!(state.generated.is_empty());
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_story_success_does_not_celebrate() {
        let state = AppState::new()
            .reduce(Action::ModeChanged(GenerationMode::Story))
            .reduce(Action::GenerationSucceeded(vec!["data:image/png;base64,AA==".into()]));
        assert!(!state.celebrate);
    }

    #[test]
    fn test_failure_is_prefixed() {
        let state = AppState::new().reduce(Action::GenerationFailed("boom".into()));
        assert_eq!(state.error.as_deref(), Some("Meme generation failed: boom"));

        let empty = AppState::new().reduce(Action::GenerationSucceeded(vec![]));
        assert!(empty.error.unwrap().contains("did not return any images"));
    }

    #[test]
    fn test_clear_resets_to_classic() {
        let state = AppState::new()
            .reduce(Action::ModeChanged(GenerationMode::Custom))
            .reduce(Action::TopicChanged("x".into()))
            .reduce(Action::TemplateSelected(image(7)))
            .reduce(Action::Cleared);
        assert_eq!(state, AppState::default());
        assert_eq!(state.mode, GenerationMode::Classic);
    }

    #[test]
    fn test_request_validation() {
        assert!(AppState::new().to_request().unwrap_err().is_validation());

        let custom = AppState::new()
            .reduce(Action::ImagesAdded(vec![image(1)]))
            .reduce(Action::ModeChanged(GenerationMode::Custom));
        assert!(custom.to_request().is_err());

        let ready = custom
            .reduce(Action::TemplateSelected(image(9)))
            .reduce(Action::TopicChanged("make it a cat".into()));
        let request = ready.to_request().unwrap();
        assert_eq!(request.template_image, Some(image(9)));
    }

    #[test]
    fn test_template_only_sent_in_custom_mode() {
        let state = AppState::new()
            .reduce(Action::ImagesAdded(vec![image(1)]))
            .reduce(Action::TemplateSelected(image(9)));
        assert_eq!(state.to_request().unwrap().template_image, None);
    }

    #[test]
    fn test_twin_replaces_reference() {
        let state = AppState::new()
            .reduce(Action::ImagesAdded(vec![image(1), image(2)]))
            .reduce(Action::TwinToggled(true))
            .reduce(Action::TwinStyleChanged(DigitalTwinStyle::PixelArt))
            .reduce(Action::TwinStarted)
            .reduce(Action::TwinCreated(image(5)))
            .reduce(Action::TwinStyleChanged(DigitalTwinStyle::Cartoon));
        assert_eq!(state.twin_style, DigitalTwinStyle::PixelArt);

        let request = state.to_request().unwrap();
        assert_eq!(request.reference_image(), Some(&image(5)));
        assert_eq!(request.source_images, vec![image(1), image(2)]);
        assert_eq!(state.uploaded_images, vec![image(1), image(2)]);

        let removed = state.reduce(Action::ImageRemoved(0));
        assert!(removed.digital_twin.is_none());
    }

    #[test]
    fn test_state_is_serializable() {
        let state = AppState::new()
            .reduce(Action::ImagesAdded(vec![image(1)]))
            .reduce(Action::TopicChanged("mondays".into()));
        let json = serde_json::to_string(&state).unwrap();
        let back: AppState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
