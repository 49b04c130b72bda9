//! Built-in library of well-known meme templates for custom mode.

use crate::{
    error::Result,
    files,
    models::UploadedImage,
    traits::ImageFetcher,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemeTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub image_url: &'static str,
}

pub const MEME_TEMPLATES: &[MemeTemplate] = &[
    MemeTemplate {
        id: "distracted-boyfriend",
        name: "Distracted Boyfriend",
        image_url: "https://i.imgflip.com/1ur9b0.jpg",
    },
    MemeTemplate {
        id: "drake",
        name: "Drake Hotline Bling",
        image_url: "https://i.imgflip.com/30b1gx.jpg",
    },
    MemeTemplate {
        id: "two-buttons",
        name: "Two Buttons",
        image_url: "https://i.imgflip.com/1g8my4.jpg",
    },
    MemeTemplate {
        id: "change-my-mind",
        name: "Change My Mind",
        image_url: "https://i.imgflip.com/24y43o.jpg",
    },
    MemeTemplate {
        id: "woman-yelling-at-cat",
        name: "Woman Yelling at Cat",
        image_url: "https://i.imgflip.com/345v97.jpg",
    },
    MemeTemplate {
        id: "expanding-brain",
        name: "Expanding Brain",
        image_url: "https://i.imgflip.com/1jwhww.jpg",
    },
    MemeTemplate {
        id: "is-this-a-pigeon",
        name: "Is This A Pigeon",
        image_url: "https://i.imgflip.com/1o00in.jpg",
    },
    MemeTemplate {
        id: "surprised-pikachu",
        name: "Surprised Pikachu",
        image_url: "https://i.imgflip.com/2kbn1e.jpg",
    },
];

pub fn find_template(id: &str) -> Option<&'static MemeTemplate> {
    MEME_TEMPLATES
        .iter()
        .find(|template| template.id.eq_ignore_ascii_case(id.trim()))
}

pub async fn hydrate(fetcher: &dyn ImageFetcher, template: &MemeTemplate) -> Result<UploadedImage> {
    log::info!("🖼️  Fetching template '{}'", template.name);
    fetcher.fetch(template.image_url).await
}

/// Resolves a user-supplied template reference: a library id, an http(s)
/// URL, or a local file path.
pub async fn resolve(fetcher: &dyn ImageFetcher, reference: &str) -> Result<UploadedImage> {
    if let Some(template) = find_template(reference) {
        return hydrate(fetcher, template).await;
    }
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return fetcher.fetch(reference).await;
    }
    files::load_image(reference).await
}
