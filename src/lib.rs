//! favicon-badge: runtime favicon switching with generated badges
//!
//! This crate keeps a registry of named favicon sets for a page, backs up the
//! page's original icons the first time they are touched, and rewrites the
//! head's `<link>` elements only when the requested set actually differs from
//! the one on screen. Notification badges (a dot or a digit) are drawn onto
//! the original icon and shown as `data:` URLs.
//!
//! # Example
//!
//! ```
//! use favicon_badge::{DigitOptions, FaviconConfig, FaviconRegistry, Icon, MemoryHead};
//!
//! let head = MemoryHead::with_links([Icon::new("/favicon.png").with_rel("icon")]);
//! let config = FaviconConfig::new()
//!     .with_icon("promo", Icon::new("/promo.png").with_sizes("32x32"));
//! let mut registry = FaviconRegistry::new(head, config);
//!
//! assert!(registry.display(Some("promo")));
//! assert_eq!(registry.current(), "promo");
//!
//! // Back to the page's own icons
//! registry.set_default();
//! assert_eq!(registry.head().favicons()[0].href, "/favicon.png");
//!
//! // "/favicon.png" is not a data URL, so the default loader cannot draw on it
//! let result = futures::executor::block_on(registry.set_number(3, &DigitOptions::default()));
//! assert!(result.is_err());
//! ```
//!
//! # Custom renderers
//!
//! Anything implementing [`IconRenderer`] can be passed to
//! [`FaviconRegistry::display_generated`]. [`FnRenderer`] adapts a closure:
//!
//! ```
//! use favicon_badge::{FaviconConfig, FaviconRegistry, FnRenderer, Icon, IconSet, MemoryHead, SizedIconMap};
//!
//! let head = MemoryHead::with_links([Icon::new("/favicon.png").with_rel("icon")]);
//! let mut registry = FaviconRegistry::new(head, FaviconConfig::new());
//!
//! let renderer = FnRenderer::new(|version: &u32, defaults: &SizedIconMap| {
//!     Ok(defaults
//!         .values()
//!         .map(|icon| icon.with_href(format!("{}?v={version}", icon.href)))
//!         .collect::<IconSet>())
//! });
//!
//! let shown = futures::executor::block_on(registry.display_generated(&renderer, &2, Some("v2")))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(shown.first().unwrap().href, "/favicon.png?v=2");
//! ```

mod color;
mod config;
mod error;
mod head;
mod icon;
mod loader;
mod registry;
pub mod render;

#[cfg(feature = "web")]
mod web;

pub use color::{parse_hex_color, recolor};
pub use config::FaviconConfig;
pub use error::{FaviconError, Result};
pub use head::{DEFAULT_REL, ICON_RELS, IconHead, MemoryHead, favicon_links, replace_icons};
pub use icon::{Icon, IconEntry, IconSet, PREFERRED_SIZES, SizedIconMap};
pub use loader::{DataUrlLoader, ImageLoader, decode_data_url, encode_data_url};
pub use registry::{DEFAULT_ICON_KEY, DOT_ICON_KEY, FaviconRegistry, TEMP_ICON_KEY};
pub use render::{
    BadgeColors, Canvas, DigitBadge, DigitBadgeRenderer, DigitOptions, DotOptions, DotPlacement,
    DotRenderer, FnRenderer, IconRenderer,
};

#[cfg(feature = "web")]
pub use web::{WebFavicons, WebHead, WebImageLoader};
