#![forbid(unsafe_code)]

//! World/screen coordinate math for the canvas.
//!
//! Two coordinate systems are in play:
//!
//! - **World space**: unbounded logical coordinates where card positions and
//!   sizes live. Independent of the current pan/zoom.
//! - **Screen space**: pixel coordinates of the host viewport.
//!
//! The view maps world to screen as `screen = (world + pan) * scale`. When the
//! host can measure the on-screen rectangle of the world element (the
//! "anchor"), the inverse is `world = (screen - anchor.left) / scale`, which is
//! the authoritative form used by zoom and drag.
//!
//! # Invariants
//!
//! 1. [`ScaleBounds::clamp`] never returns a value outside `[min, max]`.
//! 2. [`SizeFloor::clamp`] never returns a width/height below the floor.
//! 3. [`zoom_about`] keeps the world point under the cursor fixed on screen,
//!    and returns `None` (no state change) when the scale is already pinned at
//!    a bound.

use serde::{Deserialize, Serialize};

/// Logical world width, used for minimap proportions only.
pub const WORLD_WIDTH: f64 = 6000.0;
/// Logical world height, used for minimap proportions only.
pub const WORLD_HEIGHT: f64 = 4000.0;
/// Smallest allowed view scale.
pub const MIN_SCALE: f64 = 0.2;
/// Largest allowed view scale.
pub const MAX_SCALE: f64 = 3.0;
/// Multiplicative step for one wheel tick toward the user.
pub const ZOOM_IN_FACTOR: f64 = 1.08;
/// Multiplicative step for one wheel tick away from the user.
pub const ZOOM_OUT_FACTOR: f64 = 0.92;
/// Minimum card width in world units.
pub const MIN_CARD_WIDTH: f64 = 200.0;
/// Minimum card height in world units.
pub const MIN_CARD_HEIGHT: f64 = 120.0;
/// Minimap width in pixels.
pub const MINIMAP_WIDTH: f64 = 160.0;
/// Minimap height in pixels.
pub const MINIMAP_HEIGHT: f64 = 100.0;
/// Fixed chrome (top bar + dock) subtracted from the viewport height.
pub const VIEWPORT_CHROME_HEIGHT: f64 = 58.0;

/// A 2D point (world or screen, depending on context).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[inline]
    #[must_use]
    pub fn delta_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    /// Both components are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A 2D extent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[inline]
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

/// An axis-aligned rectangle with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from an origin and a size.
    #[inline]
    #[must_use]
    pub const fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Left edge (alias for x).
    #[inline]
    #[must_use]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Top edge (alias for y).
    #[inline]
    #[must_use]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// Inclusive scale range for the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBounds {
    pub min: f64,
    pub max: f64,
}

impl ScaleBounds {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp `scale` into `[min, max]`. NaN collapses to `min`.
    #[inline]
    #[must_use]
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.max(self.min).min(self.max)
    }
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self::new(MIN_SCALE, MAX_SCALE)
    }
}

/// Minimum card extent in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeFloor {
    pub min_width: f64,
    pub min_height: f64,
}

impl SizeFloor {
    #[must_use]
    pub const fn new(min_width: f64, min_height: f64) -> Self {
        Self {
            min_width,
            min_height,
        }
    }

    #[inline]
    #[must_use]
    pub fn clamp(&self, size: Size) -> Size {
        Size::new(
            size.width.max(self.min_width),
            size.height.max(self.min_height),
        )
    }
}

impl Default for SizeFloor {
    fn default() -> Self {
        Self::new(MIN_CARD_WIDTH, MIN_CARD_HEIGHT)
    }
}

/// Clamp a scale to the default `[MIN_SCALE, MAX_SCALE]` range.
#[inline]
#[must_use]
pub fn clamp_scale(scale: f64) -> f64 {
    ScaleBounds::default().clamp(scale)
}

/// Clamp a card size to the default minimum card extent.
#[inline]
#[must_use]
pub fn clamp_size(width: f64, height: f64) -> Size {
    SizeFloor::default().clamp(Size::new(width, height))
}

/// Map a world point to the screen given a pan offset and scale.
#[inline]
#[must_use]
pub fn world_to_screen(world: Point, pan: Point, scale: f64) -> Point {
    Point::new((world.x + pan.x) * scale, (world.y + pan.y) * scale)
}

/// Map a screen point to world space using the measured anchor rectangle of
/// the world element.
#[inline]
#[must_use]
pub fn screen_to_world(screen: Point, scale: f64, anchor: Rect) -> Point {
    Point::new(
        (screen.x - anchor.left()) / scale,
        (screen.y - anchor.top()) / scale,
    )
}

/// Screen-space top-left of a world point, measured against the anchor.
#[inline]
#[must_use]
pub fn anchored_screen_point(world: Point, scale: f64, anchor: Rect) -> Point {
    Point::new(
        anchor.left() + world.x * scale,
        anchor.top() + world.y * scale,
    )
}

/// Pick the zoom step for a wheel delta. Positive deltas zoom out.
#[inline]
#[must_use]
pub fn wheel_zoom_factor(delta_y: f64, zoom_in: f64, zoom_out: f64) -> f64 {
    if delta_y > 0.0 { zoom_out } else { zoom_in }
}

/// Outcome of an anchor-preserving zoom step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomSolution {
    /// New clamped scale.
    pub scale: f64,
    /// New pan offset that keeps `world_anchor` under the cursor.
    pub pan: Point,
    /// World point that was under the cursor before the zoom.
    pub world_anchor: Point,
}

/// Solve one zoom step around `cursor`.
///
/// The world point under the cursor is computed with the pre-zoom scale:
/// `world = (cursor - anchor.left) / old_scale`. The new pan is then
/// `(cursor - world * new_scale) / new_scale` on each axis, so that
/// `world_to_screen(world, pan, new_scale) == cursor`.
///
/// Returns `None` when clamping leaves the scale unchanged.
#[must_use]
pub fn zoom_about(
    cursor: Point,
    anchor: Rect,
    old_scale: f64,
    factor: f64,
    bounds: ScaleBounds,
) -> Option<ZoomSolution> {
    let world = screen_to_world(cursor, old_scale, anchor);
    let scale = bounds.clamp(old_scale * factor);
    #[allow(clippy::float_cmp)]
    if scale == old_scale {
        return None;
    }
    Some(ZoomSolution {
        scale,
        pan: Point::new(
            (cursor.x - world.x * scale) / scale,
            (cursor.y - world.y * scale) / scale,
        ),
        world_anchor: world,
    })
}
