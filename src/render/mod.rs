//! Favicon generation.
//!
//! A renderer takes the page's default icons and produces a new [`IconSet`].
//! [`DotRenderer`] and [`DigitBadgeRenderer`] draw notification badges onto
//! the default icon; [`FnRenderer`] adapts a plain closure for hosts that
//! compute icons some other way.
//!
//! Drawing goes through [`Canvas`], a thin wrapper over a `tiny_skia` pixmap
//! with the subset of 2D canvas operations the badges need.

pub mod digit;
pub mod dot;

pub use digit::{BadgeColors, DigitBadge, DigitBadgeRenderer, DigitOptions};
pub use dot::{DotOptions, DotPlacement, DotRenderer};

use std::marker::PhantomData;

use async_trait::async_trait;
use image::RgbaImage;
use palette::Srgba;
use resvg::tiny_skia::{
    ColorU8, FillRule, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Transform,
};

use crate::error::{FaviconError, Result};
use crate::icon::{IconSet, SizedIconMap};

// ============================================================================
// IconRenderer
// ============================================================================

/// Produces an icon set from the page's default icons.
///
/// This is the extension point used by
/// [`FaviconRegistry::display_generated`](crate::FaviconRegistry::display_generated).
/// Implementations deliver exactly one icon set or fail.
#[async_trait(?Send)]
pub trait IconRenderer {
    /// Per-call options understood by this renderer.
    type Options;

    async fn generate(
        &self,
        options: &Self::Options,
        default_icons: &SizedIconMap,
    ) -> Result<IconSet>;
}

/// Wraps a synchronous function as an [`IconRenderer`].
///
/// ```
/// use favicon_badge::{FnRenderer, IconSet, SizedIconMap};
///
/// let renderer = FnRenderer::new(|_: &(), defaults: &SizedIconMap| {
///     Ok(defaults
///         .values()
///         .map(|icon| icon.with_href(icon.href.replace(".png", "-dotted.png")))
///         .collect::<IconSet>())
/// });
/// # let _ = renderer;
/// ```
pub struct FnRenderer<F, O> {
    f: F,
    _options: PhantomData<fn(&O)>,
}

impl<F, O> FnRenderer<F, O>
where
    F: Fn(&O, &SizedIconMap) -> Result<IconSet>,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _options: PhantomData,
        }
    }
}

#[async_trait(?Send)]
impl<F, O> IconRenderer for FnRenderer<F, O>
where
    F: Fn(&O, &SizedIconMap) -> Result<IconSet>,
{
    type Options = O;

    async fn generate(&self, options: &O, default_icons: &SizedIconMap) -> Result<IconSet> {
        (self.f)(options, default_icons)
    }
}

// ============================================================================
// Canvas
// ============================================================================

/// An off-screen drawing surface initialised from an image.
///
/// Coordinates passed to drawing calls go through the current transform, so
/// after [`scale`](Self::scale) callers can work in a logical coordinate
/// space, like `CanvasRenderingContext2D.scale`.
pub struct Canvas {
    pixmap: Pixmap,
    transform: Transform,
}

impl Canvas {
    /// Creates a canvas the size of `image` with `image` drawn at the origin.
    pub fn from_image(image: &RgbaImage) -> Result<Self> {
        Ok(Self {
            pixmap: rgba_to_pixmap(image)?,
            transform: Transform::identity(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Scales all subsequent drawing uniformly.
    pub fn scale(&mut self, factor: f32) {
        self.transform = self.transform.pre_scale(factor, factor);
    }

    /// Fills an axis-aligned rectangle.
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Srgba<u8>) {
        let Some(rect) = Rect::from_xywh(x, y, width, height) else {
            return;
        };
        self.pixmap
            .fill_rect(rect, &solid(color), self.transform, None);
    }

    /// Fills a circle with anti-aliased edges.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Srgba<u8>) {
        let Some(path) = PathBuilder::from_circle(cx, cy, radius) else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &solid(color),
            FillRule::Winding,
            self.transform,
            None,
        );
    }

    /// Composites `image` with its top-left corner at `(x, y)`.
    pub fn draw_image(&mut self, image: &RgbaImage, x: f32, y: f32) -> Result<()> {
        let source = rgba_to_pixmap(image)?;
        self.pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &PixmapPaint::default(),
            self.transform.pre_translate(x, y),
            None,
        );
        Ok(())
    }

    /// Returns the canvas contents as straight-alpha RGBA.
    pub fn into_image(self) -> RgbaImage {
        pixmap_to_rgba_image(&self.pixmap)
    }
}

fn solid(color: Srgba<u8>) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.red, color.green, color.blue, color.alpha);
    paint.anti_alias = true;
    paint
}

/// Converts a straight-alpha image to a premultiplied pixmap.
fn rgba_to_pixmap(image: &RgbaImage) -> Result<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height()).ok_or_else(|| {
        FaviconError::Canvas(format!(
            "cannot draw on a {}x{} image",
            image.width(),
            image.height()
        ))
    })?;

    let mut data = Vec::with_capacity(image.as_raw().len());
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let premultiplied = ColorU8::from_rgba(r, g, b, a).premultiply();
        data.extend_from_slice(&[
            premultiplied.red(),
            premultiplied.green(),
            premultiplied.blue(),
            premultiplied.alpha(),
        ]);
    }

    Pixmap::from_vec(data, size)
        .ok_or_else(|| FaviconError::Canvas("pixel buffer does not match image size".into()))
}

/// Converts a premultiplied pixmap back to a straight-alpha image.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        dst.0 = [color.red(), color.green(), color.blue(), color.alpha()];
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::Icon;
    use futures::executor::block_on;
    use image::Rgba;

    fn red() -> Srgba<u8> {
        Srgba::new(255, 0, 0, 255)
    }

    #[test]
    fn canvas_round_trips_pixels() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 128, 255, 255]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        let canvas = Canvas::from_image(&img).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (4, 4));

        let out = canvas.into_image();
        assert_eq!(out.get_pixel(1, 1).0, [0, 128, 255, 255]);
        assert_eq!(out.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn zero_sized_images_are_rejected() {
        let err = Canvas::from_image(&RgbaImage::new(0, 0)).err().unwrap();
        assert!(matches!(err, FaviconError::Canvas(_)));
    }

    #[test]
    fn fill_rect_respects_scale() {
        let mut canvas = Canvas::from_image(&RgbaImage::new(8, 8)).unwrap();
        canvas.scale(2.0);
        canvas.fill_rect(2.0, 0.0, 2.0, 2.0, red());
        let out = canvas.into_image();

        assert_eq!(out.get_pixel(5, 1).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(7, 3).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(3, 1)[3], 0);
        assert_eq!(out.get_pixel(5, 4)[3], 0);
    }

    #[test]
    fn fill_circle_covers_center_only() {
        let mut canvas = Canvas::from_image(&RgbaImage::new(20, 20)).unwrap();
        canvas.fill_circle(10.0, 10.0, 5.0, red());
        let out = canvas.into_image();

        assert_eq!(out.get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(1, 1)[3], 0);
        assert_eq!(out.get_pixel(18, 10)[3], 0);
    }

    #[test]
    fn draw_image_places_source() {
        let mut canvas =
            Canvas::from_image(&RgbaImage::from_pixel(6, 6, Rgba([255, 255, 255, 255]))).unwrap();
        canvas
            .draw_image(&RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255])), 3.0, 1.0)
            .unwrap();
        let out = canvas.into_image();

        assert_eq!(out.get_pixel(3, 1).0, [0, 0, 255, 255]);
        assert_eq!(out.get_pixel(4, 2).0, [0, 0, 255, 255]);
        assert_eq!(out.get_pixel(2, 1).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(3, 3).0, [255, 255, 255, 255]);
    }

    #[test]
    fn fn_renderer_passes_default_icons() {
        let defaults: SizedIconMap = [Icon::new("a.png").with_sizes("16x16")]
            .into_iter()
            .collect();
        let renderer = FnRenderer::new(|suffix: &String, icons: &SizedIconMap| {
            Ok(icons
                .values()
                .map(|icon| icon.with_href(format!("{}{}", icon.href, suffix)))
                .collect::<IconSet>())
        });

        let out = block_on(renderer.generate(&"?v=2".to_string(), &defaults)).unwrap();
        assert_eq!(out.first().unwrap().href, "a.png?v=2");
        assert_eq!(out.first().unwrap().sizes.as_deref(), Some("16x16"));
    }
}
