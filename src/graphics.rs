//! A declarative rendering surface for widgets.
//!
//! Widgets do not talk to a GPU or an OS window. They record draw commands
//! into a [`Frame`], and the embedding application (or a test) decides what to
//! do with the resulting display list. Commands are recorded in window
//! coordinates along with the clipping rectangle that was in effect, so a
//! frame can be replayed by any renderer or inspected directly.

use std::fmt::{self, Debug};

use figures::units::{Px, UPx};
use figures::{IntoSigned, Point, Rect, Size, Zero};
use unicode_segmentation::UnicodeSegmentation;

/// A 32-bit RGBA color.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color(pub u32);

impl Color {
    /// Returns a new color with the provided components.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self(((red as u32) << 24) | ((green as u32) << 16) | ((blue as u32) << 8) | alpha as u32)
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Returns the alpha component. 255 is fully opaque.
    #[must_use]
    pub const fn alpha(self) -> u8 {
        self.0 as u8
    }

    /// Returns this color with its alpha replaced by `alpha`.
    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self((self.0 & 0xFFFF_FF00) | alpha as u32)
    }

    /// Returns this color with its alpha scaled by `factor`, clamped to
    /// `0.0..=1.0`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn with_alpha_scaled(self, factor: f32) -> Self {
        let alpha = f32::from(self.alpha()) * factor.clamp(0., 1.);
        self.with_alpha(alpha.round() as u8)
    }

    /// Fully opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Fully opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Fully transparent black.
    pub const CLEAR_BLACK: Self = Self::new(0, 0, 0, 0);
}

impl Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

/// A single drawing operation, in window coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// A filled, optionally rounded, rectangle.
    Fill {
        /// The filled region.
        rect: Rect<Px>,
        /// The fill color.
        color: Color,
        /// The corner radius. [`Px::ZERO`] fills a plain rectangle.
        corner_radius: Px,
    },
    /// A filled circle.
    Circle {
        /// The center of the circle.
        center: Point<Px>,
        /// The radius of the circle.
        radius: Px,
        /// The fill color.
        color: Color,
    },
    /// A run of text, anchored at its center.
    Text {
        /// The text to draw.
        text: String,
        /// The text color.
        color: Color,
        /// The center of the rendered text.
        center: Point<Px>,
    },
}

/// A [`DrawCommand`] paired with the clip that was in effect when it was
/// recorded. Renderers must not paint outside `clip`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCommand {
    /// The clipping rectangle, in window coordinates.
    pub clip: Rect<Px>,
    /// The recorded command.
    pub command: DrawCommand,
}

/// A recorded display list for one redraw of a window.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    size: Size<UPx>,
    commands: Vec<PlacedCommand>,
}

impl Frame {
    /// Returns an empty frame for a surface of `size`.
    #[must_use]
    pub fn new(size: Size<UPx>) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// The size of the surface this frame was recorded for.
    #[must_use]
    pub const fn size(&self) -> Size<UPx> {
        self.size
    }

    /// The recorded commands, in paint order.
    #[must_use]
    pub fn commands(&self) -> &[PlacedCommand] {
        &self.commands
    }

    /// Returns a [`Graphics`] that records into this frame, covering the full
    /// surface.
    pub fn graphics(&mut self) -> Graphics<'_> {
        let region = Rect::from(self.size.into_signed());
        Graphics {
            commands: &mut self.commands,
            region,
            clip: region,
        }
    }
}

/// Records draw commands for one widget's region of a [`Frame`].
///
/// All coordinates accepted by this type are relative to the current region's
/// origin. Recorded commands are translated into window coordinates and
/// clipped to the intersection of every enclosing region.
pub struct Graphics<'gfx> {
    commands: &'gfx mut Vec<PlacedCommand>,
    region: Rect<Px>,
    clip: Rect<Px>,
}

impl Graphics<'_> {
    /// The size of the region being drawn.
    #[must_use]
    pub const fn size(&self) -> Size<Px> {
        self.region.size
    }

    /// The region being drawn, in window coordinates.
    #[must_use]
    pub const fn region(&self) -> Rect<Px> {
        self.region
    }

    /// Returns a borrowed graphics that records into `region`, which is
    /// interpreted in window coordinates. The new clip is the intersection of
    /// the current clip and `region`.
    pub(crate) fn for_region(&mut self, region: Rect<Px>) -> Graphics<'_> {
        Graphics {
            clip: intersect(self.clip, region),
            commands: self.commands,
            region,
        }
    }

    /// Fills the current region with `color`.
    pub fn fill(&mut self, color: Color) {
        self.fill_rounded(color, Px::ZERO);
    }

    /// Fills the current region with `color`, rounding corners by
    /// `corner_radius`.
    pub fn fill_rounded(&mut self, color: Color, corner_radius: Px) {
        self.push(DrawCommand::Fill {
            rect: self.region,
            color,
            corner_radius,
        });
    }

    /// Draws a filled circle centered at `center` in region coordinates.
    pub fn draw_circle(&mut self, center: Point<Px>, radius: Px, color: Color) {
        self.push(DrawCommand::Circle {
            center: self.region.origin + center,
            radius,
            color,
        });
    }

    /// Draws `text` centered at `center` in region coordinates.
    pub fn draw_text(&mut self, text: &str, color: Color, center: Point<Px>) {
        self.push(DrawCommand::Text {
            text: text.to_string(),
            color,
            center: self.region.origin + center,
        });
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(PlacedCommand {
            clip: self.clip,
            command,
        });
    }
}

impl Debug for Graphics<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graphics")
            .field("region", &self.region)
            .field("clip", &self.clip)
            .finish_non_exhaustive()
    }
}

/// The advance width of one grapheme cluster in the deterministic text
/// metrics used by this crate.
pub const GRAPHEME_ADVANCE: u32 = 8;
/// The line height of the deterministic text metrics used by this crate.
pub const LINE_HEIGHT: u32 = 16;

/// Measures `text` using fixed-cell metrics.
///
/// Ripplet has no font stack; layout only needs stable, deterministic
/// measurements. Each grapheme cluster advances [`GRAPHEME_ADVANCE`] and every
/// run is one [`LINE_HEIGHT`] tall.
#[must_use]
pub fn measure_text(text: &str) -> Size<UPx> {
    let graphemes =
        u32::try_from(text.graphemes(true).count()).unwrap_or(u32::MAX / GRAPHEME_ADVANCE);
    Size::new(
        UPx::new(graphemes * GRAPHEME_ADVANCE),
        UPx::new(LINE_HEIGHT),
    )
}

/// Returns the intersection of two rectangles, or a zero-sized rectangle at
/// `a`'s origin when they do not overlap.
pub(crate) fn intersect(a: Rect<Px>, b: Rect<Px>) -> Rect<Px> {
    let (a_tl, a_br) = a.extents();
    let (b_tl, b_br) = b.extents();
    let tl = Point::new(a_tl.x.max(b_tl.x), a_tl.y.max(b_tl.y));
    let br = Point::new(a_br.x.min(b_br.x), a_br.y.min(b_br.y));
    if br.x <= tl.x || br.y <= tl.y {
        Rect::new(a.origin, Size::ZERO)
    } else {
        Rect::new(tl, Size::new(br.x - tl.x, br.y - tl.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_components() {
        let color = Color::new(0x4E, 0x34, 0x2E, 0xFF);
        assert_eq!(color.red(), 0x4E);
        assert_eq!(color.green(), 0x34);
        assert_eq!(color.blue(), 0x2E);
        assert_eq!(color.alpha(), 0xFF);
        assert_eq!(color.with_alpha(0).alpha(), 0);
        assert_eq!(color.with_alpha(0).red(), 0x4E);
        assert_eq!(Color::WHITE.with_alpha_scaled(0.5).alpha(), 128);
    }

    #[test]
    fn clips_nest() {
        let mut frame = Frame::new(Size::new(UPx::new(100), UPx::new(100)));
        let mut gfx = frame.graphics();
        let mut child = gfx.for_region(Rect::new(
            Point::new(Px::new(10), Px::new(10)),
            Size::new(Px::new(200), Px::new(20)),
        ));
        child.fill(Color::BLACK);
        let command = &frame.commands()[0];
        // The child region may extend past the surface, but its clip may not.
        assert_eq!(
            command.clip,
            Rect::new(
                Point::new(Px::new(10), Px::new(10)),
                Size::new(Px::new(90), Px::new(20)),
            )
        );
    }

    #[test]
    fn disjoint_intersection_is_empty() {
        let a = Rect::new(
            Point::new(Px::new(0), Px::new(0)),
            Size::new(Px::new(10), Px::new(10)),
        );
        let b = Rect::new(
            Point::new(Px::new(50), Px::new(50)),
            Size::new(Px::new(10), Px::new(10)),
        );
        assert_eq!(intersect(a, b).size, Size::ZERO);
    }

    #[test]
    fn text_metrics_count_graphemes() {
        assert_eq!(measure_text("button"), Size::new(UPx::new(48), UPx::new(16)));
        assert_eq!(measure_text(""), Size::new(UPx::new(0), UPx::new(16)));
    }
}
