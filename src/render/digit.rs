//! Digit badge: a number from 1 to 9 on a colored square.
//!
//! The badge is laid out in a logical 32x32 icon space and scaled onto the
//! real base icon. A contrast border square sits in the top-right corner,
//! the background square inside it, and the digit glyph centered on the
//! background.

use std::rc::Rc;

use async_trait::async_trait;
use image::RgbaImage;
use image::imageops::crop_imm;
use palette::Srgba;
use serde::{Deserialize, Serialize};

use super::{Canvas, IconRenderer};
use crate::color::{parse_hex_color, recolor};
use crate::error::{FaviconError, Result};
use crate::icon::{IconSet, SizedIconMap};
use crate::loader::{DataUrlLoader, ImageLoader, encode_data_url};

/// Pre-rendered glyphs for 1 to 9, left to right, one 10x10 cell each.
const DIGITS_SPRITE: &str = concat!(
    "data:image/png;base64,",
    "iVBORw0KGgoAAAANSUhEUgAAAFoAAAAKCAYAAAA0Jkn1AAAA4UlEQVRIS+2XWxKEIAwE1/sfe",
    "i1RqjDLMB0ftT/4ZxgeNpOAy+f3+R6hJTTVeKdLCVU91cVxYj86Xh3H6V17XI/TUz5FF8VbbILekb8GWjlKOVg5srd5rTZuZPZdrUcZhK6/6iiHlK6FQjve/",
    "dAsWAqQ6hx4yiGly5QOteOxRlKdK1EudWltVuujGanOHFqjT3VolNru0JqgdwLDS0DG0W+lpktlWvOdc2kGxYxU81MeRTdB+1vW30A7B7p26tBsjaZnA3Xs1",
    "fHi9z9+j3aAXWorANkfoOzhRTe+C7AJDuddAcvfXAVOlVH+AAAAAElFTkSuQmCC",
);

const GLYPH_SIZE: u32 = 10;
const BADGE_SIZE: f32 = 18.0;
const ICON_SIZE: f32 = 32.0;

pub const DEFAULT_DIGIT_COLOR: &str = "#ffffffff";
pub const DEFAULT_BADGE_COLOR: &str = "#ff0000ff";
pub const DEFAULT_BORDER_COLOR: &str = "#ffffffff";

/// Per-call color overrides, each a hex color.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
}

impl DigitOptions {
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_bg_color(mut self, bg_color: impl Into<String>) -> Self {
        self.bg_color = Some(bg_color.into());
        self
    }

    pub fn with_border_color(mut self, border_color: impl Into<String>) -> Self {
        self.border_color = Some(border_color.into());
        self
    }
}

/// Parsed badge colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeColors {
    pub digit: Srgba<u8>,
    pub background: Srgba<u8>,
    pub border: Srgba<u8>,
}

/// Draws the badge onto a copy of `base`.
///
/// Digits outside 1..=9 produce the badge backdrop without a glyph.
pub fn draw_digit_badge(
    base: &RgbaImage,
    sprite: &RgbaImage,
    digit: u32,
    colors: &BadgeColors,
) -> Result<RgbaImage> {
    let mut canvas = Canvas::from_image(base)?;
    canvas.scale(canvas.width() as f32 / ICON_SIZE);

    let border = BADGE_SIZE + 1.0;
    canvas.fill_rect(ICON_SIZE - border, 0.0, border, border, colors.border);
    canvas.fill_rect(ICON_SIZE - BADGE_SIZE, 0.0, BADGE_SIZE, BADGE_SIZE, colors.background);

    if let Some(glyph) = glyph(sprite, digit, colors.digit) {
        let inset = (BADGE_SIZE - GLYPH_SIZE as f32) / 2.0;
        canvas.draw_image(&glyph, ICON_SIZE - BADGE_SIZE + inset, inset)?;
    }
    Ok(canvas.into_image())
}

/// Cuts the cell for `digit` out of the sprite and recolors it.
fn glyph(sprite: &RgbaImage, digit: u32, color: Srgba<u8>) -> Option<RgbaImage> {
    if !(1..=9).contains(&digit) {
        return None;
    }
    let x = (digit - 1) * GLYPH_SIZE;
    if x + GLYPH_SIZE > sprite.width() || GLYPH_SIZE > sprite.height() {
        log::warn!("digit sprite is too small for glyph {digit}");
        return None;
    }
    let mut cell = crop_imm(sprite, x, 0, GLYPH_SIZE, GLYPH_SIZE).to_image();
    recolor(&mut cell, color);
    Some(cell)
}

/// Renders digit badges with configurable default colors.
pub struct DigitBadgeRenderer {
    loader: Rc<dyn ImageLoader>,
    sprite_loader: DataUrlLoader,
    color: String,
    bg_color: String,
    border_color: String,
}

impl DigitBadgeRenderer {
    /// Creates a renderer drawing a white digit on red with a white border.
    pub fn new(loader: Rc<dyn ImageLoader>) -> Self {
        Self {
            loader,
            sprite_loader: DataUrlLoader::new(),
            color: DEFAULT_DIGIT_COLOR.to_string(),
            bg_color: DEFAULT_BADGE_COLOR.to_string(),
            border_color: DEFAULT_BORDER_COLOR.to_string(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_bg_color(mut self, bg_color: impl Into<String>) -> Self {
        self.bg_color = bg_color.into();
        self
    }

    pub fn with_border_color(mut self, border_color: impl Into<String>) -> Self {
        self.border_color = border_color.into();
        self
    }

    /// Resolves per-call overrides against the configured colors.
    pub fn colors(&self, options: &DigitOptions) -> Result<BadgeColors> {
        Ok(BadgeColors {
            digit: parse_hex_color(options.color.as_deref().unwrap_or(&self.color))?,
            background: parse_hex_color(options.bg_color.as_deref().unwrap_or(&self.bg_color))?,
            border: parse_hex_color(
                options
                    .border_color
                    .as_deref()
                    .unwrap_or(&self.border_color),
            )?,
        })
    }

    /// Draws `digit` onto the preferred default icon.
    ///
    /// The base icon and the glyph sprite load concurrently.
    pub async fn render(
        &self,
        digit: u32,
        options: &DigitOptions,
        default_icons: &SizedIconMap,
    ) -> Result<IconSet> {
        let icon = default_icons
            .preferred()
            .ok_or(FaviconError::NoDefaultIcon)?;
        let colors = self.colors(options)?;

        let (sprite, base) = futures::try_join!(
            self.sprite_loader.load(DIGITS_SPRITE),
            self.loader.load(&icon.href),
        )?;
        log::trace!(
            "drawing digit {digit} badge on {}x{} icon",
            base.width(),
            base.height()
        );
        let drawn = draw_digit_badge(&base, &sprite, digit, &colors)?;
        Ok(IconSet::from(icon.with_href(encode_data_url(&drawn)?)))
    }

    /// Binds a digit so the renderer can be passed where an
    /// [`IconRenderer`] is expected.
    pub fn digit(&self, digit: u32) -> DigitBadge<'_> {
        DigitBadge {
            renderer: self,
            digit,
        }
    }
}

/// A [`DigitBadgeRenderer`] with its digit fixed.
pub struct DigitBadge<'a> {
    renderer: &'a DigitBadgeRenderer,
    digit: u32,
}

#[async_trait(?Send)]
impl<'a> IconRenderer for DigitBadge<'a> {
    type Options = DigitOptions;

    async fn generate(
        &self,
        options: &DigitOptions,
        default_icons: &SizedIconMap,
    ) -> Result<IconSet> {
        self.renderer
            .render(self.digit, options, default_icons)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::Icon;
    use futures::executor::block_on;
    use image::Rgba;

    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const RED: [u8; 4] = [255, 0, 0, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn base_icon(size: u32) -> Icon {
        let img = RgbaImage::from_pixel(size, size, Rgba(BLUE));
        Icon::new(encode_data_url(&img).unwrap())
            .with_rel("icon")
            .with_sizes(format!("{size}x{size}"))
    }

    fn renderer() -> DigitBadgeRenderer {
        DigitBadgeRenderer::new(Rc::new(DataUrlLoader::new()))
    }

    fn render(
        renderer: &DigitBadgeRenderer,
        digit: u32,
        options: &DigitOptions,
        size: u32,
    ) -> RgbaImage {
        let defaults: SizedIconMap = [base_icon(size)].into_iter().collect();
        let set = block_on(renderer.render(digit, options, &defaults)).unwrap();
        block_on(DataUrlLoader::new().load(&set.first().unwrap().href)).unwrap()
    }

    #[test]
    fn sprite_holds_nine_cells() {
        let sprite = block_on(DataUrlLoader::new().load(DIGITS_SPRITE)).unwrap();
        assert_eq!(sprite.dimensions(), (9 * GLYPH_SIZE, GLYPH_SIZE));
    }

    #[test]
    fn draws_backdrop_and_border() {
        let out = render(&renderer(), 3, &DigitOptions::default(), 32);

        // border column and row around the 18x18 background
        assert_eq!(out.get_pixel(13, 5).0, WHITE);
        assert_eq!(out.get_pixel(20, 18).0, WHITE);
        assert_eq!(out.get_pixel(15, 1).0, RED);
        assert_eq!(out.get_pixel(31, 17).0, RED);
        // untouched base
        assert_eq!(out.get_pixel(12, 5).0, BLUE);
        assert_eq!(out.get_pixel(20, 19).0, BLUE);
        assert_eq!(out.get_pixel(5, 25).0, BLUE);
    }

    #[test]
    fn glyph_is_recolored_and_centered() {
        let options = DigitOptions::default().with_color("#0f0");
        let out = render(&renderer(), 1, &options, 32);

        // the "1" glyph has a solid stem in cell columns 4..6
        for y in 4..14 {
            assert_eq!(out.get_pixel(22, y).0, [0, 255, 0, 255], "stem at y={y}");
        }
        // cell column 0 is empty for "1"
        assert_eq!(out.get_pixel(18, 8).0, RED);
    }

    #[test]
    fn out_of_range_digit_draws_backdrop_only() {
        let options = DigitOptions::default().with_color("#0f0");
        for digit in [0, 10, 11] {
            let out = render(&renderer(), digit, &options, 32);
            for y in 4..14 {
                for x in 18..28 {
                    assert_eq!(out.get_pixel(x, y).0, RED, "digit {digit} at ({x}, {y})");
                }
            }
            assert_eq!(out.get_pixel(13, 5).0, WHITE);
        }
    }

    #[test]
    fn badge_scales_with_icon() {
        let out = render(&renderer(), 11, &DigitOptions::default(), 64);

        assert_eq!(out.dimensions(), (64, 64));
        assert_eq!(out.get_pixel(27, 10).0, WHITE);
        assert_eq!(out.get_pixel(40, 20).0, RED);
        assert_eq!(out.get_pixel(25, 10).0, BLUE);
        assert_eq!(out.get_pixel(40, 39).0, BLUE);
    }

    #[test]
    fn configured_colors_apply_and_options_override() {
        let renderer = renderer()
            .with_bg_color("#00ff00")
            .with_border_color("#000");
        let out = render(&renderer, 0, &DigitOptions::default(), 32);
        assert_eq!(out.get_pixel(20, 2).0, [0, 255, 0, 255]);
        assert_eq!(out.get_pixel(13, 2).0, [0, 0, 0, 255]);

        let options = DigitOptions::default()
            .with_bg_color("#ff0")
            .with_border_color("#f0f");
        let out = render(&renderer, 0, &options, 32);
        assert_eq!(out.get_pixel(20, 2).0, [255, 255, 0, 255]);
        assert_eq!(out.get_pixel(13, 2).0, [255, 0, 255, 255]);
    }

    #[test]
    fn errors_surface_before_loading() {
        let err = block_on(renderer().render(1, &DigitOptions::default(), &SizedIconMap::new()))
            .unwrap_err();
        assert!(matches!(err, FaviconError::NoDefaultIcon));

        let defaults: SizedIconMap = [base_icon(32)].into_iter().collect();
        let options = DigitOptions::default().with_bg_color("red");
        let err = block_on(renderer().render(1, &options, &defaults)).unwrap_err();
        assert!(matches!(err, FaviconError::InvalidColor(_)));
    }

    #[test]
    fn bound_digit_renders_through_trait() {
        let defaults: SizedIconMap = [base_icon(32)].into_iter().collect();
        let renderer = renderer();
        let one = block_on(renderer.digit(1).generate(&DigitOptions::default(), &defaults)).unwrap();
        let two = block_on(renderer.digit(2).generate(&DigitOptions::default(), &defaults)).unwrap();

        assert_ne!(one.first().unwrap().href, two.first().unwrap().href);
        assert_eq!(one.first().unwrap().sizes.as_deref(), Some("32x32"));
    }
}
