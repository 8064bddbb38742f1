//! Error type shared by the registry, the renderers and the loaders.

use thiserror::Error;

/// Errors produced while resolving, rendering or displaying favicons.
#[derive(Debug, Error)]
pub enum FaviconError {
    /// A color string was not a 3, 4, 6 or 8 digit hex color.
    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    /// The page has no favicon to draw a badge onto.
    #[error("no default icon available")]
    NoDefaultIcon,

    /// An icon href could not be turned into pixels.
    #[error("failed to load image {href:?}: {reason}")]
    ImageLoad { href: String, reason: String },

    /// Decoding or encoding pixel data failed.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// The drawing surface could not be created.
    #[error("canvas error: {0}")]
    Canvas(String),

    /// A host-supplied renderer failed.
    #[error("renderer failed: {0}")]
    Renderer(String),

    /// Configuration JSON was malformed.
    #[error(transparent)]
    Config(#[from] serde_json::Error),
}

impl FaviconError {
    pub(crate) fn load(href: &str, reason: impl Into<String>) -> Self {
        Self::ImageLoad {
            href: truncate_href(href),
            reason: reason.into(),
        }
    }
}

/// Cuts hrefs to 64 characters for error messages.
fn truncate_href(href: &str) -> String {
    const MAX: usize = 64;
    match href.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &href[..idx]),
        None => href.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, FaviconError>;
