use crate::error::MemeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    #[default]
    Classic,
    Popular,
    Custom,
    Story,
}

impl GenerationMode {
    pub const ALL: [GenerationMode; 4] = [
        GenerationMode::Classic,
        GenerationMode::Popular,
        GenerationMode::Custom,
        GenerationMode::Story,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Classic => "classic",
            GenerationMode::Popular => "popular",
            GenerationMode::Custom => "custom",
            GenerationMode::Story => "story",
        }
    }

    /// Modes that fan a single request out into several independent calls.
    pub fn uses_variations(&self) -> bool {
        matches!(self, GenerationMode::Classic | GenerationMode::Popular)
    }

    pub fn requires_template(&self) -> bool {
        matches!(self, GenerationMode::Custom)
    }

    pub fn uploader_title(&self) -> &'static str {
        match self {
            GenerationMode::Story => "Upload Character Image",
            GenerationMode::Custom => "Upload Subject Image(s)",
            GenerationMode::Popular => "Upload Image to Recreate",
            GenerationMode::Classic => "Upload Image(s)",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = MemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GenerationMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                MemeError::ValidationError(format!(
                    "unknown mode '{}', expected one of classic, popular, custom, story",
                    s
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DigitalTwinStyle {
    #[default]
    #[serde(rename = "sticker")]
    Sticker,
    #[serde(rename = "3d_model")]
    Model3d,
    #[serde(rename = "cartoon")]
    Cartoon,
    #[serde(rename = "pixel_art")]
    PixelArt,
}

impl DigitalTwinStyle {
    pub const ALL: [DigitalTwinStyle; 4] = [
        DigitalTwinStyle::Sticker,
        DigitalTwinStyle::Model3d,
        DigitalTwinStyle::Cartoon,
        DigitalTwinStyle::PixelArt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DigitalTwinStyle::Sticker => "sticker",
            DigitalTwinStyle::Model3d => "3d_model",
            DigitalTwinStyle::Cartoon => "cartoon",
            DigitalTwinStyle::PixelArt => "pixel_art",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DigitalTwinStyle::Sticker => "Sticker",
            DigitalTwinStyle::Model3d => "3D Model",
            DigitalTwinStyle::Cartoon => "Cartoon",
            DigitalTwinStyle::PixelArt => "Pixel Art",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DigitalTwinStyle::Sticker => "Clean, enhanced photorealistic cutout.",
            DigitalTwinStyle::Model3d => "Pixar-style 3D character render.",
            DigitalTwinStyle::Cartoon => "Vibrant 2D animated style.",
            DigitalTwinStyle::PixelArt => "Classic 16-bit video game sprite.",
        }
    }
}

impl fmt::Display for DigitalTwinStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigitalTwinStyle {
    type Err = MemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DigitalTwinStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                MemeError::ValidationError(format!(
                    "unknown digital twin style '{}', expected one of sticker, 3d_model, cartoon, pixel_art",
                    s
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("classic".parse::<GenerationMode>().unwrap(), GenerationMode::Classic);
        assert_eq!(" Story ".parse::<GenerationMode>().unwrap(), GenerationMode::Story);
        assert!("gallery".parse::<GenerationMode>().is_err());
    }

    #[test]
    fn test_mode_fan_out_classification() {
        assert!(GenerationMode::Classic.uses_variations());
        assert!(GenerationMode::Popular.uses_variations());
        assert!(!GenerationMode::Custom.uses_variations());
        assert!(!GenerationMode::Story.uses_variations());
        assert_eq!(GenerationMode::Story.uploader_title(), "Upload Character Image");
    }

    #[test]
    fn test_twin_style_names() {
        for style in DigitalTwinStyle::ALL {
            assert_eq!(style.as_str().parse::<DigitalTwinStyle>().unwrap(), style);
            assert_eq!(
                serde_json::to_value(style).unwrap(),
                serde_json::json!(style.as_str())
            );
        }
        assert_eq!(DigitalTwinStyle::Model3d.label(), "3D Model");
    }
}
