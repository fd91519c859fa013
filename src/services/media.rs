//! Media storage under the configured media root.
//!
//! Stored paths are relative (`products/product_3/images/front.png`) and only
//! become URLs when rendered through [`MediaStorage::url`].

use crate::errors::ServiceError;
use image::{
    codecs::jpeg::JpegEncoder,
    imageops::{self, FilterType},
    DynamicImage, Rgba, RgbaImage,
};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};

/// Side of the square every avatar is fitted into
pub const AVATAR_SIDE: u32 = 291;
pub const AVATAR_JPEG_QUALITY: u8 = 60;

#[derive(Clone, Debug)]
pub struct MediaStorage {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into(),
        }
    }

    pub fn from_app_config(cfg: &crate::config::AppConfig) -> Self {
        Self::new(cfg.media_root.clone(), cfg.media_url.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL for a stored relative path
    pub fn url(&self, src: &str) -> String {
        if src.starts_with("http://") || src.starts_with("https://") || src.starts_with('/') {
            return src.to_string();
        }
        format!("{}{}", self.url_prefix, src)
    }

    /// Writes `bytes` at `relative`, creating parent directories.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn save(&self, relative: &str, bytes: &[u8]) -> Result<(), ServiceError> {
        let target = self.resolve(relative)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        debug!("stored media file {}", target.display());
        Ok(())
    }

    /// Copies an external file into the media root at `relative`.
    #[instrument(skip(self))]
    pub async fn copy_in(&self, source: &Path, relative: &str) -> Result<(), ServiceError> {
        let target = self.resolve(relative)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(source, &target).await?;
        Ok(())
    }

    /// Removes a stored file; a missing file is not an error.
    pub async fn remove(&self, relative: &str) -> Result<(), ServiceError> {
        let target = self.resolve(relative)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, ServiceError> {
        let rel = Path::new(relative);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if relative.is_empty() || escapes {
            return Err(ServiceError::BadRequest(format!(
                "invalid media path: {}",
                relative
            )));
        }
        Ok(self.root.join(rel))
    }
}

/// Keeps the last path segment of an uploaded name and drops anything
/// outside `[A-Za-z0-9._-]`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Avatars are re-encoded, so the stored name always ends in `.jpg`.
pub fn avatar_path(profile_id: i32, filename: &str) -> String {
    let name = sanitize_filename(filename);
    let stem = Path::new(&name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("avatar");
    format!("profiles/profile_{}/avatar/{}.jpg", profile_id, stem)
}

/// Scales an uploaded picture to fit an `AVATAR_SIDE` square, centres it on
/// a white matte and re-encodes it as JPEG.
pub fn fit_avatar(bytes: &[u8]) -> Result<Vec<u8>, ServiceError> {
    let picture = image::load_from_memory(bytes)
        .map_err(|e| ServiceError::BadRequest(format!("avatar is not a readable image: {}", e)))?;
    let fitted = picture
        .resize(AVATAR_SIDE, AVATAR_SIDE, FilterType::Lanczos3)
        .to_rgba8();

    let mut canvas = RgbaImage::from_pixel(AVATAR_SIDE, AVATAR_SIDE, Rgba([255, 255, 255, 255]));
    let x = AVATAR_SIDE.saturating_sub(fitted.width()) / 2;
    let y = AVATAR_SIDE.saturating_sub(fitted.height()) / 2;
    imageops::overlay(&mut canvas, &fitted, i64::from(x), i64::from(y));

    let flattened = DynamicImage::ImageRgba8(canvas).to_rgb8();
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, AVATAR_JPEG_QUALITY)
        .encode_image(&flattened)
        .map_err(|e| ServiceError::InternalError(format!("could not encode avatar: {}", e)))?;
    Ok(encoded)
}

pub fn product_image_path(product_id: i32, filename: &str) -> String {
    format!(
        "products/product_{}/images/{}",
        product_id,
        sanitize_filename(filename)
    )
}

pub fn category_image_path(category_id: i32, filename: &str) -> String {
    format!(
        "categories/category_{}/{}",
        category_id,
        sanitize_filename(filename)
    )
}
