use super::{GenerationMode, UploadedImage};
use crate::error::{MemeError, Result};
use serde::{Deserialize, Serialize};

/// Data URIs of the generated images, in slot order with failed slots dropped.
pub type GenerationResult = Vec<String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub source_images: Vec<UploadedImage>,
    pub topic: String,
    pub mode: GenerationMode,
    pub template_image: Option<UploadedImage>,
    /// The subject story and twin flows build on. When unset, the first
    /// source image is the reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<UploadedImage>,
}

impl GenerationRequest {
    pub fn new(source_images: Vec<UploadedImage>, mode: GenerationMode) -> Self {
        Self {
            source_images,
            topic: String::new(),
            mode,
            template_image: None,
            reference_image: None,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_template(mut self, template: UploadedImage) -> Self {
        self.template_image = Some(template);
        self
    }

    /// Sets an explicit reference subject, e.g. a digital twin created from
    /// the first upload. `source_images` is left untouched.
    pub fn with_reference_image(mut self, image: UploadedImage) -> Self {
        self.reference_image = Some(image);
        self
    }

    pub fn reference_image(&self) -> Option<&UploadedImage> {
        self.reference_image
            .as_ref()
            .or_else(|| self.source_images.first())
    }

    /// Images sent as the subject of a generation call: the reference
    /// first, then the remaining uploads. An explicit reference stands in
    /// for the first upload.
    pub fn subject_images(&self) -> impl Iterator<Item = &UploadedImage> {
        self.reference_image()
            .into_iter()
            .chain(self.source_images.iter().skip(1))
    }

    pub fn has_topic(&self) -> bool {
        !self.topic.trim().is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_images.is_empty() {
            return Err(MemeError::ValidationError(
                "Please upload at least one image first.".into(),
            ));
        }

        if let Some(index) = self.source_images.iter().position(UploadedImage::is_empty) {
            return Err(MemeError::ValidationError(format!(
                "Uploaded image {} is empty.",
                index + 1
            )));
        }

        if self.reference_image.as_ref().map_or(false, UploadedImage::is_empty) {
            return Err(MemeError::ValidationError(
                "The reference image is empty.".into(),
            ));
        }

        if self.mode.requires_template() {
            if self.template_image.is_none() {
                return Err(MemeError::ValidationError(
                    "Please upload a meme template to use custom mode.".into(),
                ));
            }
            if !self.has_topic() {
                return Err(MemeError::ValidationError(
                    "Please describe how the subject should be placed into the template.".into(),
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryPanel {
    pub image: UploadedImage,
    /// 1-based position in the strip.
    pub index: usize,
}

impl StoryPanel {
    pub fn to_data_uri(&self) -> String {
        self.image.to_data_uri()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(byte: u8) -> UploadedImage {
        UploadedImage::new(vec![byte; 4], "image/png")
    }

    #[test]
    fn test_requires_source_image() {
        let err = GenerationRequest::new(vec![], GenerationMode::Classic)
            .validate()
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_custom_requires_template_and_instruction() {
        let base = GenerationRequest::new(vec![image(1)], GenerationMode::Custom);
        assert!(base.validate().is_err());
        assert!(base.clone().with_template(image(2)).validate().is_err());
        assert!(base
            .clone()
            .with_template(image(2))
            .with_topic("   ")
            .validate()
            .is_err());
        assert!(base
            .with_template(image(2))
            .with_topic("put my dog on the left")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_classic_allows_empty_topic() {
        assert!(GenerationRequest::new(vec![image(1)], GenerationMode::Classic)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_reference_defaults_to_first_upload() {
        let request = GenerationRequest::new(vec![image(1), image(2)], GenerationMode::Story);
        assert_eq!(request.reference_image(), Some(&image(1)));
        assert_eq!(
            request.subject_images().collect::<Vec<_>>(),
            vec![&image(1), &image(2)]
        );
    }

    #[test]
    fn test_reference_substitution_keeps_uploads() {
        let request = GenerationRequest::new(vec![image(1), image(2)], GenerationMode::Story)
            .with_reference_image(image(9));

        assert_eq!(request.reference_image(), Some(&image(9)));
        assert_eq!(request.source_images, vec![image(1), image(2)]);
        assert_eq!(
            request.subject_images().collect::<Vec<_>>(),
            vec![&image(9), &image(2)]
        );
    }

    #[test]
    fn test_empty_reference_is_rejected() {
        let request = GenerationRequest::new(vec![image(1)], GenerationMode::Classic)
            .with_reference_image(UploadedImage::new(Vec::<u8>::new(), "image/png"));
        assert!(request.validate().unwrap_err().is_validation());
    }
}
