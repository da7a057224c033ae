use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tokio::task;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Uploaded file is not a valid image")]
    InvalidImage,

    #[error("Failed to store image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub struct ImageService {
    config: Config,
}

impl ImageService {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Validate that the bytes decode as an image and store them under a
    /// random filename, keeping the client's extension when it names an
    /// image type. Returns the stored filename. The previous image of a
    /// destination, if any, is not touched.
    pub async fn save_upload(
        &self,
        original_filename: Option<&str>,
        data: Vec<u8>,
    ) -> Result<String, ImageError> {
        // Full decode, not just a magic-byte sniff; truncated files fail
        // here. Decoding is CPU-bound, so it runs on the blocking pool and
        // hands the buffer back for the write.
        let (format, data) = task::spawn_blocking(move || {
            let format = image::guess_format(&data).map_err(|_| ImageError::InvalidImage)?;
            image::load_from_memory(&data).map_err(|_| ImageError::InvalidImage)?;
            Ok::<_, ImageError>((format, data))
        })
        .await
        .map_err(|e| ImageError::Internal(format!("Image decode task panicked: {e}")))??;

        let extension = choose_extension(original_filename, format);
        let filename = format!("{}.{}", Uuid::new_v4(), extension);

        let uploads_dir = PathBuf::from(&self.config.general.uploads_path);
        if !uploads_dir.exists() {
            fs::create_dir_all(&uploads_dir).await?;
        }

        let file_path = uploads_dir.join(&filename);
        fs::write(&file_path, data).await?;

        info!(path = %file_path.display(), "Stored uploaded image");
        Ok(filename)
    }
}

/// Keep the uploaded extension when it maps to an image mime type, fall
/// back to the detected format's canonical extension otherwise.
fn choose_extension(original_filename: Option<&str>, format: image::ImageFormat) -> String {
    let from_name = original_filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    if let Some(ext) = from_name {
        let mime = mime_guess::from_ext(&ext).first_or_octet_stream();
        if mime.type_() == mime_guess::mime::IMAGE {
            return ext;
        }
    }

    format
        .extensions_str()
        .first()
        .copied()
        .unwrap_or("jpg")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_from_filename_wins_for_image_types() {
        assert_eq!(
            choose_extension(Some("photo.PNG"), image::ImageFormat::Jpeg),
            "png"
        );
    }

    #[test]
    fn non_image_extension_falls_back_to_detected_format() {
        assert_eq!(
            choose_extension(Some("photo.txt"), image::ImageFormat::Png),
            "png"
        );
    }

    #[test]
    fn missing_filename_uses_detected_format() {
        assert_eq!(choose_extension(None, image::ImageFormat::Jpeg), "jpg");
    }
}
