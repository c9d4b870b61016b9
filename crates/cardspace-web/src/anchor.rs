#![forbid(unsafe_code)]

//! Screen measurement capability.
//!
//! The engine never measures the host surface itself. Hosts hand in a
//! [`ScreenAnchor`] that reports the on-screen rectangle of the world
//! element and the viewport size at the moment of the call. Either may be
//! unavailable (detached element, hidden tab); operations that need a
//! missing measurement are skipped.

use cardspace_core::{Point, Rect, Size};
use cardspace_layout::ViewState;

/// Host-provided screen measurements.
pub trait ScreenAnchor {
    /// Screen rectangle of the world element, if it can be measured.
    fn anchor_rect(&self) -> Option<Rect>;

    /// Size of the viewport in screen pixels, if known.
    fn viewport_size(&self) -> Option<Size>;
}

/// Anchor with fixed, caller-managed measurements.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedAnchor {
    rect: Option<Rect>,
    viewport: Option<Size>,
}

impl FixedAnchor {
    #[must_use]
    pub const fn new(rect: Rect, viewport: Size) -> Self {
        Self {
            rect: Some(rect),
            viewport: Some(viewport),
        }
    }

    /// Anchor that cannot measure anything.
    #[must_use]
    pub const fn detached() -> Self {
        Self {
            rect: None,
            viewport: None,
        }
    }

    pub fn set_rect(&mut self, rect: Option<Rect>) {
        self.rect = rect;
    }

    pub fn set_viewport(&mut self, viewport: Option<Size>) {
        self.viewport = viewport;
    }

    /// Re-measure as a host would after the view changed: the world element
    /// sits at `viewport_origin + pan * scale`.
    pub fn track_view(&mut self, view: &ViewState, viewport_origin: Point, world: Size) {
        self.rect = Some(world_rect_for_view(view, viewport_origin, world));
    }
}

impl ScreenAnchor for FixedAnchor {
    fn anchor_rect(&self) -> Option<Rect> {
        self.rect
    }

    fn viewport_size(&self) -> Option<Size> {
        self.viewport
    }
}

/// Screen rectangle a host would measure for the world element under `view`.
#[must_use]
pub fn world_rect_for_view(view: &ViewState, viewport_origin: Point, world: Size) -> Rect {
    Rect::new(
        viewport_origin.x + view.pan_x * view.scale,
        viewport_origin.y + view.pan_y * view.scale,
        world.width * view.scale,
        world.height * view.scale,
    )
}
