//! Notification dot badge.

use std::rc::Rc;

use async_trait::async_trait;
use image::RgbaImage;
use palette::Srgba;
use serde::{Deserialize, Serialize};

use super::{Canvas, IconRenderer};
use crate::color::parse_hex_color;
use crate::error::{FaviconError, Result};
use crate::icon::{IconSet, SizedIconMap};
use crate::loader::{ImageLoader, encode_data_url};

/// Dot fill used when no color is given.
pub const DEFAULT_DOT_COLOR: &str = "#f00";

/// Dot radius as a fraction of the icon width.
pub const DEFAULT_DOT_RADIUS: f32 = 0.25;

/// Where the dot sits when no explicit center is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DotPlacement {
    #[default]
    TopRight,
    BottomRight,
}

impl DotPlacement {
    /// Default center as fractions of the icon width and height.
    pub fn center(self) -> (f32, f32) {
        match self {
            Self::TopRight => (0.7, 0.25),
            Self::BottomRight => (0.7, 0.75),
        }
    }
}

/// Per-call dot settings. Unset fields fall back to the placement defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DotOptions {
    /// Hex fill color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Horizontal center as a fraction of the icon width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_x: Option<f32>,

    /// Vertical center as a fraction of the icon height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_y: Option<f32>,

    /// Radius as a fraction of the icon width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
}

impl DotOptions {
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_center(mut self, x: f32, y: f32) -> Self {
        self.center_x = Some(x);
        self.center_y = Some(y);
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }
}

/// Draws a filled circle onto a copy of `base`.
///
/// `center` and `radius` are fractions: the center is scaled by the image
/// width and height, the radius by the width.
pub fn draw_dot(
    base: &RgbaImage,
    center: (f32, f32),
    radius: f32,
    color: Srgba<u8>,
) -> Result<RgbaImage> {
    let mut canvas = Canvas::from_image(base)?;
    let width = canvas.width() as f32;
    let height = canvas.height() as f32;
    canvas.fill_circle(center.0 * width, center.1 * height, radius * width, color);
    Ok(canvas.into_image())
}

/// Renders a colored dot onto the page's default icon.
pub struct DotRenderer {
    loader: Rc<dyn ImageLoader>,
    placement: DotPlacement,
}

impl DotRenderer {
    pub fn new(loader: Rc<dyn ImageLoader>, placement: DotPlacement) -> Self {
        Self { loader, placement }
    }

    pub fn top_right(loader: Rc<dyn ImageLoader>) -> Self {
        Self::new(loader, DotPlacement::TopRight)
    }

    pub fn bottom_right(loader: Rc<dyn ImageLoader>) -> Self {
        Self::new(loader, DotPlacement::BottomRight)
    }

    /// Returns where the dot is drawn when no center is given.
    pub fn placement(&self) -> DotPlacement {
        self.placement
    }
}

#[async_trait(?Send)]
impl IconRenderer for DotRenderer {
    type Options = DotOptions;

    async fn generate(&self, options: &DotOptions, default_icons: &SizedIconMap) -> Result<IconSet> {
        let icon = default_icons
            .preferred()
            .ok_or(FaviconError::NoDefaultIcon)?;
        let color = parse_hex_color(options.color.as_deref().unwrap_or(DEFAULT_DOT_COLOR))?;
        let (default_x, default_y) = self.placement.center();
        let center = (
            options.center_x.unwrap_or(default_x),
            options.center_y.unwrap_or(default_y),
        );
        let radius = options.radius.unwrap_or(DEFAULT_DOT_RADIUS);

        let base = self.loader.load(&icon.href).await?;
        log::trace!(
            "drawing dot at {center:?} r={radius} on {}x{} icon",
            base.width(),
            base.height()
        );
        let drawn = draw_dot(&base, center, radius, color)?;
        Ok(IconSet::from(icon.with_href(encode_data_url(&drawn)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::Icon;
    use crate::loader::DataUrlLoader;
    use futures::executor::block_on;
    use image::Rgba;

    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn blue_icon(size: u32, sizes: &str) -> Icon {
        let img = RgbaImage::from_pixel(size, size, Rgba(BLUE));
        Icon::new(encode_data_url(&img).unwrap())
            .with_rel("icon")
            .with_type("image/png")
            .with_sizes(sizes)
    }

    fn renderer(placement: DotPlacement) -> DotRenderer {
        DotRenderer::new(Rc::new(DataUrlLoader::new()), placement)
    }

    fn render(renderer: &DotRenderer, options: &DotOptions, defaults: &SizedIconMap) -> RgbaImage {
        let set = block_on(renderer.generate(options, defaults)).unwrap();
        assert_eq!(set.len(), 1);
        block_on(DataUrlLoader::new().load(&set.first().unwrap().href)).unwrap()
    }

    #[test]
    fn top_right_dot_defaults() {
        let defaults: SizedIconMap = [blue_icon(32, "32x32")].into_iter().collect();
        let out = render(&renderer(DotPlacement::TopRight), &DotOptions::default(), &defaults);

        assert_eq!(out.dimensions(), (32, 32));
        // center (22.4, 8), radius 8
        assert_eq!(out.get_pixel(22, 8).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(22, 24).0, BLUE);
        assert_eq!(out.get_pixel(2, 2).0, BLUE);
    }

    #[test]
    fn shorthand_constructors_set_placement() {
        let loader: Rc<dyn ImageLoader> = Rc::new(DataUrlLoader::new());
        assert_eq!(
            DotRenderer::top_right(Rc::clone(&loader)).placement(),
            DotPlacement::TopRight
        );
        assert_eq!(
            DotRenderer::bottom_right(loader).placement(),
            DotPlacement::BottomRight
        );
        assert_eq!(DotPlacement::default(), DotPlacement::TopRight);
    }

    #[test]
    fn bottom_right_dot_defaults() {
        let defaults: SizedIconMap = [blue_icon(32, "32x32")].into_iter().collect();
        let out = render(&renderer(DotPlacement::BottomRight), &DotOptions::default(), &defaults);

        assert_eq!(out.get_pixel(22, 24).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(22, 8).0, BLUE);
    }

    #[test]
    fn options_override_placement_and_color() {
        let defaults: SizedIconMap = [blue_icon(20, "20x20")].into_iter().collect();
        let options = DotOptions::default()
            .with_color("#0f0")
            .with_center(0.25, 0.25)
            .with_radius(0.1);
        let out = render(&renderer(DotPlacement::TopRight), &options, &defaults);

        assert_eq!(out.get_pixel(5, 5).0, [0, 255, 0, 255]);
        assert_eq!(out.get_pixel(14, 5).0, BLUE);
    }

    #[test]
    fn preserves_base_icon_attributes() {
        let defaults: SizedIconMap = [blue_icon(16, "16x16"), blue_icon(32, "32x32")]
            .into_iter()
            .collect();
        let set = block_on(renderer(DotPlacement::TopRight).generate(&DotOptions::default(), &defaults))
            .unwrap();
        let icon = set.first().unwrap();

        assert_eq!(icon.sizes.as_deref(), Some("32x32"));
        assert_eq!(icon.rel.as_deref(), Some("icon"));
        assert_eq!(icon.mime_type.as_deref(), Some("image/png"));
        assert_ne!(icon.href, defaults.get("32x32").unwrap().href);
    }

    #[test]
    fn fails_without_default_icon() {
        let err = block_on(
            renderer(DotPlacement::TopRight).generate(&DotOptions::default(), &SizedIconMap::new()),
        )
        .unwrap_err();
        assert!(matches!(err, FaviconError::NoDefaultIcon));
    }

    #[test]
    fn invalid_color_aborts_render() {
        let defaults: SizedIconMap = [blue_icon(32, "32x32")].into_iter().collect();
        let options = DotOptions::default().with_color("#12");
        let err = block_on(renderer(DotPlacement::TopRight).generate(&options, &defaults))
            .unwrap_err();
        assert!(matches!(err, FaviconError::InvalidColor(_)));
    }

    #[test]
    fn options_deserialize_camel_case() {
        let options: DotOptions =
            serde_json::from_str(r##"{"color": "#00f", "centerX": 0.5, "radius": 0.2}"##).unwrap();
        assert_eq!(options.center_x, Some(0.5));
        assert_eq!(options.center_y, None);
        assert_eq!(options.radius, Some(0.2));
    }
}
