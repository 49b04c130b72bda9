//! Local file decoding and result persistence.

use crate::{
    error::{MemeError, Result},
    models::{sniff_mime_type, UploadedImage},
};
use std::path::{Path, PathBuf};

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

pub async fn load_image(path: impl AsRef<Path>) -> Result<UploadedImage> {
    let path = path.as_ref();
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| MemeError::FileError(format!("failed to read {}: {}", path.display(), e)))?;

    if data.is_empty() {
        return Err(MemeError::FileError(format!("{} is empty", path.display())));
    }

    let mime_type = sniff_mime_type(&data)
        .or_else(|| mime_from_extension(path))
        .ok_or_else(|| {
            MemeError::FileError(format!("{} does not look like an image", path.display()))
        })?;

    log::debug!("Loaded {} ({}, {} bytes)", path.display(), mime_type, data.len());
    Ok(UploadedImage::new(data, mime_type))
}

/// Loads every path, failing on the first unreadable one.
pub async fn load_images<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<UploadedImage>> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        images.push(load_image(path).await?);
    }
    Ok(images)
}

/// Writes a generated data URI to `dir/<stem>.<ext>` and returns the path.
pub async fn save_data_uri(dir: impl AsRef<Path>, stem: &str, data_uri: &str) -> Result<PathBuf> {
    let image = UploadedImage::from_data_uri(data_uri)?;
    let dir = dir.as_ref();

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| MemeError::FileError(format!("failed to create {}: {}", dir.display(), e)))?;

    let path = dir.join(format!("{}.{}", stem, image.extension()));
    tokio::fs::write(&path, image.data())
        .await
        .map_err(|e| MemeError::FileError(format!("failed to write {}: {}", path.display(), e)))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_sniffs_content_over_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0, 1]).unwrap();

        let image = load_image(&path).await.unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.data().len(), 6);
    }

    #[tokio::test]
    async fn test_load_falls_back_to_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portrait.HEIC");
        std::fs::write(&path, b"\0\0\0\x18ftypheic").unwrap();

        let image = load_image(&path).await.unwrap();
        assert_eq!(image.mime_type(), "image/heic");
    }

    #[tokio::test]
    async fn test_load_rejects_missing_empty_and_non_images() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_image(dir.path().join("nope.png")).await.is_err());

        let empty = dir.path().join("empty.png");
        std::fs::write(&empty, b"").unwrap();
        assert!(matches!(load_image(&empty).await, Err(MemeError::FileError(_))));

        let text = dir.path().join("notes.txt");
        std::fs::write(&text, b"hello").unwrap();
        assert!(load_image(&text).await.is_err());
    }

    #[tokio::test]
    async fn test_save_data_uri_uses_mime_extension() {
        let dir = tempfile::tempdir().unwrap();
        let image = UploadedImage::new(vec![1, 2, 3], "image/jpeg");

        let path = save_data_uri(dir.path().join("out"), "meme_1", &image.to_data_uri())
            .await
            .unwrap();

        assert!(path.ends_with("out/meme_1.jpg"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
    }
}
