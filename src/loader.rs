//! Turning icon hrefs into pixels.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;

use crate::error::{FaviconError, Result};

/// Asynchronously loads the image behind an icon href.
///
/// Loads happen on a single thread; implementations need not be `Send`.
#[async_trait(?Send)]
pub trait ImageLoader {
    async fn load(&self, href: &str) -> Result<RgbaImage>;
}

/// Loads `data:` URLs and, optionally, files below a local asset directory.
///
/// There is no network access: an href that is neither a data URL nor
/// resolvable under the asset root fails with [`FaviconError::ImageLoad`].
#[derive(Debug, Clone, Default)]
pub struct DataUrlLoader {
    asset_root: Option<PathBuf>,
}

impl DataUrlLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves non-data hrefs as paths relative to `root`.
    pub fn with_asset_root(root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: Some(root.into()),
        }
    }

    fn load_file(&self, root: &Path, href: &str) -> Result<RgbaImage> {
        let relative = href.trim_start_matches('/');
        let path = root.join(relative);
        let bytes = std::fs::read(&path).map_err(|e| FaviconError::load(href, e.to_string()))?;
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}

#[async_trait(?Send)]
impl ImageLoader for DataUrlLoader {
    async fn load(&self, href: &str) -> Result<RgbaImage> {
        if href.starts_with("data:") {
            let bytes = decode_data_url(href)?;
            return Ok(image::load_from_memory(&bytes)?.to_rgba8());
        }
        match &self.asset_root {
            Some(root) => self.load_file(root, href),
            None => Err(FaviconError::load(href, "only data URLs can be loaded")),
        }
    }
}

/// Decodes the payload of a base64 `data:` URL.
///
/// ASCII whitespace inside the payload is ignored, matching how browsers
/// treat multi-line data URLs.
pub fn decode_data_url(href: &str) -> Result<Vec<u8>> {
    let rest = href
        .strip_prefix("data:")
        .ok_or_else(|| FaviconError::load(href, "not a data URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| FaviconError::load(href, "missing ',' in data URL"))?;
    if !header.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        return Err(FaviconError::load(href, "data URL is not base64 encoded"));
    }

    let compact: Vec<u8> = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(|e| FaviconError::load(href, e.to_string()))
}

/// Encodes an image as a PNG `data:` URL, like a canvas `toDataURL()`.
pub fn encode_data_url(image: &RgbaImage) -> Result<String> {
    let mut png = Vec::new();
    image.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}
