#![forbid(unsafe_code)]

//! Wheel routing between native scrolling and canvas zoom.
//!
//! A wheel over a card body belongs to the body's scroll containers first.
//! The host reports the scroll metrics of each ancestor between the event
//! target and the viewport; the canvas zooms only when every scrollable one
//! is already pinned at the edge the wheel is pushing toward.

/// Scroll state of one element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    #[must_use]
    pub const fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Content overflows by more than a pixel.
    #[must_use]
    pub fn is_scrollable(&self) -> bool {
        self.scroll_height > self.client_height + 1.0
    }

    /// Scrolled to the edge that `delta_y` pushes toward.
    ///
    /// A zero delta pushes toward neither edge.
    #[must_use]
    pub fn at_boundary(&self, delta_y: f64) -> bool {
        let at_top = self.scroll_top <= 0.0 && delta_y < 0.0;
        let at_bottom =
            self.scroll_top + self.client_height >= self.scroll_height - 1.0 && delta_y > 0.0;
        at_top || at_bottom
    }
}

/// Where a wheel event should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelRoute {
    /// Leave the event to the host's native scrolling.
    NativeScroll,
    /// Consume the event and zoom the canvas.
    CanvasZoom,
}

/// Route a wheel event given the scroll metrics of the target's ancestors.
///
/// Pass an empty slice when the target is not inside a card body.
#[must_use]
pub fn route_wheel(ancestors: &[ScrollMetrics], delta_y: f64) -> WheelRoute {
    let can_scroll = ancestors
        .iter()
        .any(|el| el.is_scrollable() && !el.at_boundary(delta_y));
    if can_scroll {
        WheelRoute::NativeScroll
    } else {
        WheelRoute::CanvasZoom
    }
}
