//! Browser bindings for WASM environments.
//!
//! [`WebHead`] implements [`IconHead`] over the live document,
//! [`WebImageLoader`] decodes icons the way an `<img>` would, and
//! [`WebFavicons`] exposes a registry bound to both to JavaScript.
//!
//! # Feature Flag
//!
//! This module is only available with the `web` feature enabled:
//!
//! ```toml
//! [dependencies]
//! favicon-badge = { version = "0.1", features = ["web"] }
//! ```
//!
//! # Example (JavaScript/TypeScript)
//!
//! ```javascript
//! import init, { WebFavicons } from 'favicon-badge';
//!
//! await init();
//!
//! const favicons = new WebFavicons(JSON.stringify({
//!   icons: { promo: { href: '/promo.png', sizes: '32x32' } },
//! }));
//!
//! favicons.display('promo');
//! await favicons.setNumber(3);
//! await favicons.setDot(JSON.stringify({ color: '#0a0' }));
//! favicons.setDefault();
//! ```

use std::rc::Rc;

use async_trait::async_trait;
use futures::lock::{Mutex, MutexGuard};
use image::RgbaImage;
use js_sys::{Function, Promise};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlHeadElement,
    HtmlImageElement,
};

use crate::config::FaviconConfig;
use crate::error::{FaviconError, Result};
use crate::head::IconHead;
use crate::icon::{Icon, IconEntry, IconSet, SizedIconMap};
use crate::loader::ImageLoader;
use crate::registry::FaviconRegistry;
use crate::render::{DigitOptions, DotOptions, IconRenderer};

// ============================================================================
// WebHead
// ============================================================================

/// The `<head>` of a browser document.
pub struct WebHead {
    document: Document,
    head: HtmlHeadElement,
}

impl WebHead {
    pub fn new(document: Document, head: HtmlHeadElement) -> Self {
        Self { document, head }
    }

    /// Binds to the head of the current window's document.
    pub fn from_window() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let head = document.head()?;
        Some(Self::new(document, head))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn attribute(element: &Element, name: &str) -> Option<String> {
    element.get_attribute(name).filter(|value| !value.is_empty())
}

impl IconHead for WebHead {
    type Link = Element;

    fn links(&self) -> Vec<(Element, Icon)> {
        let nodes = match self.head.query_selector_all("link[rel]") {
            Ok(nodes) => nodes,
            Err(err) => {
                log::warn!("failed to query head links: {err:?}");
                return Vec::new();
            }
        };

        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| {
                let icon = Icon {
                    href: element.get_attribute("href").unwrap_or_default(),
                    rel: attribute(&element, "rel"),
                    mime_type: attribute(&element, "type"),
                    sizes: attribute(&element, "sizes"),
                };
                (element, icon)
            })
            .collect()
    }

    fn remove_link(&mut self, link: Element) {
        let Some(parent) = link.parent_node() else {
            return;
        };
        if let Err(err) = parent.remove_child(&link) {
            log::warn!("failed to remove favicon link: {err:?}");
        }
    }

    fn append_link(&mut self, icon: &Icon) {
        let link = match self.document.create_element("link") {
            Ok(link) => link,
            Err(err) => {
                log::warn!("failed to create favicon link: {err:?}");
                return;
            }
        };

        let attributes = [
            ("rel", icon.rel.as_deref()),
            ("type", icon.mime_type.as_deref()),
            ("sizes", icon.sizes.as_deref()),
            ("href", Some(icon.href.as_str())),
        ];
        for (name, value) in attributes {
            let Some(value) = value else { continue };
            if let Err(err) = link.set_attribute(name, value) {
                log::warn!("failed to set {name} on favicon link: {err:?}");
            }
        }

        if let Err(err) = self.head.append_child(&link) {
            log::warn!("failed to append favicon link: {err:?}");
        }
    }
}

// ============================================================================
// WebImageLoader
// ============================================================================

/// Loads any href the browser can show in an `<img>`.
///
/// The image is decoded by the browser and its pixels are read back through
/// an off-screen canvas. Cross-origin icons served without CORS headers taint
/// the canvas and fail with [`FaviconError::ImageLoad`].
pub struct WebImageLoader {
    document: Document,
}

impl WebImageLoader {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn read_pixels(&self, image: &HtmlImageElement) -> std::result::Result<RgbaImage, JsValue> {
        let (width, height) = (image.natural_width(), image.natural_height());
        if width == 0 || height == 0 {
            return Err(JsValue::from_str("image has no pixels"));
        }

        let canvas: HtmlCanvasElement = self.document.create_element("canvas")?.dyn_into()?;
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas 2d context is null"))?
            .dyn_into()?;

        ctx.draw_image_with_html_image_element(image, 0.0, 0.0)?;
        let data = ctx.get_image_data(0.0, 0.0, width as f64, height as f64)?;
        RgbaImage::from_raw(width, height, data.data().0)
            .ok_or_else(|| JsValue::from_str("pixel buffer does not match image size"))
    }
}

#[async_trait(?Send)]
impl ImageLoader for WebImageLoader {
    async fn load(&self, href: &str) -> Result<RgbaImage> {
        let load_error = |err: JsValue| FaviconError::load(href, format!("{err:?}"));

        let image = HtmlImageElement::new().map_err(load_error)?;
        image.set_src(href);
        JsFuture::from(image.decode()).await.map_err(load_error)?;
        self.read_pixels(&image).map_err(load_error)
    }
}

// ============================================================================
// JsRenderer
// ============================================================================

/// Wraps a JavaScript function as an [`IconRenderer`].
///
/// The function is called with the options value and the default icons as a
/// JSON string. It returns, directly or through a promise, a JSON string
/// holding an icon or a list of icons.
struct JsRenderer {
    callback: Function,
}

fn renderer_error(err: JsValue) -> FaviconError {
    FaviconError::Renderer(format!("{err:?}"))
}

#[async_trait(?Send)]
impl IconRenderer for JsRenderer {
    type Options = JsValue;

    async fn generate(&self, options: &JsValue, default_icons: &SizedIconMap) -> Result<IconSet> {
        let defaults = serde_json::to_string(&default_icons.to_icon_set())?;
        let returned = self
            .callback
            .call2(&JsValue::NULL, options, &JsValue::from_str(&defaults))
            .map_err(renderer_error)?;
        let resolved = JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(renderer_error)?;
        let json = resolved
            .as_string()
            .ok_or_else(|| FaviconError::Renderer("expected a JSON string".into()))?;
        let entry: IconEntry = serde_json::from_str(&json)?;
        Ok(entry.to_icon_set())
    }
}

// ============================================================================
// WebFavicons
// ============================================================================

type WebRegistry = FaviconRegistry<WebHead>;

/// A [`FaviconRegistry`] bound to the current document, for JavaScript.
///
/// Badge methods return promises. Updates run one at a time in the order they
/// were requested; synchronous methods fail while an update is pending.
#[wasm_bindgen]
pub struct WebFavicons {
    registry: Rc<Mutex<WebRegistry>>,
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsError::new(&err.to_string()).into()
}

fn parse_options<T: DeserializeOwned + Default>(json: Option<String>) -> std::result::Result<T, JsError> {
    match json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| JsError::new(&format!("Failed to parse options: {}", e))),
        None => Ok(T::default()),
    }
}

/// Resolves to the shown icons as JSON, or `null` when nothing changed.
fn shown_to_js(shown: Option<IconSet>) -> std::result::Result<JsValue, JsValue> {
    match shown {
        Some(icons) => serde_json::to_string(&icons)
            .map(|json| JsValue::from_str(&json))
            .map_err(js_error),
        None => Ok(JsValue::NULL),
    }
}

impl WebFavicons {
    fn registry(&self) -> std::result::Result<MutexGuard<'_, WebRegistry>, JsError> {
        self.registry
            .try_lock()
            .ok_or_else(|| JsError::new("A favicon update is still pending"))
    }
}

#[wasm_bindgen]
impl WebFavicons {
    /// Creates a registry from a JSON [`FaviconConfig`].
    ///
    /// Pass `undefined` to start with no configured icon sets.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> std::result::Result<WebFavicons, JsError> {
        let config = match config_json {
            Some(json) => FaviconConfig::from_json(&json)
                .map_err(|e| JsError::new(&format!("Failed to parse config: {}", e)))?,
            None => FaviconConfig::new(),
        };
        let head =
            WebHead::from_window().ok_or_else(|| JsError::new("No document head available"))?;
        let loader = WebImageLoader::new(head.document().clone());

        Ok(Self {
            registry: Rc::new(Mutex::new(FaviconRegistry::with_loader(head, config, loader))),
        })
    }

    /// Name of the icon set currently shown.
    pub fn current(&self) -> std::result::Result<String, JsError> {
        Ok(self.registry()?.current().to_string())
    }

    /// Shows the named icon set. Returns whether the favicon changed.
    pub fn display(&self, name: Option<String>) -> std::result::Result<bool, JsError> {
        Ok(self.registry()?.display(name.as_deref()))
    }

    #[wasm_bindgen(js_name = "setDefault")]
    pub fn set_default(&self) -> std::result::Result<bool, JsError> {
        Ok(self.registry()?.set_default())
    }

    /// Caches an icon or a list of icons, given as JSON, under `name`.
    #[wasm_bindgen(js_name = "cacheIconJson")]
    pub fn cache_icon_json(&self, name: &str, json: &str) -> std::result::Result<(), JsError> {
        let entry: IconEntry = serde_json::from_str(json)
            .map_err(|e| JsError::new(&format!("Failed to parse icons: {}", e)))?;
        self.registry()?.cache_icon_set(name, entry.to_icon_set());
        Ok(())
    }

    /// Shows an icon or a list of icons, given as JSON.
    #[wasm_bindgen(js_name = "displayIconJson")]
    pub fn display_icon_json(
        &self,
        json: &str,
        cache_key: Option<String>,
    ) -> std::result::Result<bool, JsError> {
        let entry: IconEntry = serde_json::from_str(json)
            .map_err(|e| JsError::new(&format!("Failed to parse icons: {}", e)))?;
        Ok(self
            .registry()?
            .display_icon_set(entry.to_icon_set(), cache_key.as_deref()))
    }

    #[wasm_bindgen(js_name = "resetCache")]
    pub fn reset_cache(&self) -> std::result::Result<(), JsError> {
        self.registry()?.reset_cache();
        Ok(())
    }

    /// Draws a dot on the default icon. `options_json` is a JSON `DotOptions`.
    #[wasm_bindgen(js_name = "setDot")]
    pub fn set_dot(&self, options_json: Option<String>) -> std::result::Result<Promise, JsError> {
        let options: DotOptions = parse_options(options_json)?;
        let registry = Rc::clone(&self.registry);
        Ok(future_to_promise(async move {
            let mut registry = registry.lock().await;
            shown_to_js(registry.set_dot(&options).await.map_err(js_error)?)
        }))
    }

    /// Draws a digit badge on the default icon. `options_json` is a JSON
    /// `DigitOptions`.
    #[wasm_bindgen(js_name = "setNumber")]
    pub fn set_number(
        &self,
        number: u32,
        options_json: Option<String>,
    ) -> std::result::Result<Promise, JsError> {
        let options: DigitOptions = parse_options(options_json)?;
        let registry = Rc::clone(&self.registry);
        Ok(future_to_promise(async move {
            let mut registry = registry.lock().await;
            shown_to_js(registry.set_number(number, &options).await.map_err(js_error)?)
        }))
    }

    /// Shows icons produced by `render(options, defaultIconsJson)`.
    ///
    /// The function returns an icon or a list of icons as a JSON string, or
    /// a promise of one.
    #[wasm_bindgen(js_name = "setCustom")]
    pub fn set_custom(
        &self,
        render: Function,
        options: JsValue,
        cache_key: Option<String>,
    ) -> Promise {
        let registry = Rc::clone(&self.registry);
        future_to_promise(async move {
            let renderer = JsRenderer { callback: render };
            let mut registry = registry.lock().await;
            let shown = registry
                .display_generated(&renderer, &options, cache_key.as_deref())
                .await
                .map_err(js_error)?;
            shown_to_js(shown)
        })
    }
}
