use super::UploadedImage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Image,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    Image(UploadedImage),
}

impl Part {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(text) => Some(text),
            Part::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&UploadedImage> {
        match self {
            Part::Image(image) => Some(image),
            Part::Text(_) => None,
        }
    }
}

/// One call to the generation collaborator: ordered parts plus the
/// modalities the caller will accept back.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRequest {
    pub parts: Vec<Part>,
    pub response_modalities: Vec<Modality>,
}

impl ContentRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Text(prompt.into())],
            response_modalities: vec![Modality::Image, Modality::Text],
        }
    }

    pub fn with_image(mut self, image: UploadedImage) -> Self {
        self.parts.push(Part::Image(image));
        self
    }

    pub fn with_images<'a>(mut self, images: impl IntoIterator<Item = &'a UploadedImage>) -> Self {
        self.parts
            .extend(images.into_iter().cloned().map(Part::Image));
        self
    }

    pub fn prompt(&self) -> Option<&str> {
        self.parts.iter().find_map(Part::as_text)
    }

    pub fn images(&self) -> impl Iterator<Item = &UploadedImage> {
        self.parts.iter().filter_map(Part::as_image)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Candidate {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentResponse {
    pub candidates: Vec<Candidate>,
    pub block_reason: Option<String>,
}

impl ContentResponse {
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            candidates: vec![Candidate { parts }],
            block_reason: None,
        }
    }

    /// First inline image of the first candidate.
    pub fn first_image(&self) -> Option<&UploadedImage> {
        self.candidates
            .first()?
            .parts
            .iter()
            .filter_map(Part::as_image)
            .find(|image| !image.is_empty() && !image.mime_type().is_empty())
    }

    /// Concatenated text of the first candidate, if it sent any.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .parts
            .iter()
            .filter_map(Part::as_text)
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
