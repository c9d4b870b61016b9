#![forbid(unsafe_code)]

//! Proportional minimap of the world.
//!
//! The minimap maps the whole logical world onto a fixed-size rectangle:
//! `sx = minimap_w / world_w`, `sy = minimap_h / world_h`. Open cards are
//! drawn at their world rectangles times `(sx, sy)`, and the visible region
//! of the canvas is drawn as a viewport rectangle. Projection is recomputed
//! on every call; nothing is cached.

use cardspace_core::{CanvasConfig, CardId, Rect, Size};

use crate::store::LayoutStore;

/// One open card on the minimap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapCard {
    pub id: CardId,
    pub rect: Rect,
    pub focused: bool,
}

/// Minimap contents for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimapProjection {
    /// Visible canvas region, in minimap pixels.
    pub viewport: Rect,
    /// Open cards in catalog order.
    pub cards: Vec<MinimapCard>,
}

/// Projects a layout onto the minimap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapProjector {
    sx: f64,
    sy: f64,
    chrome_height: f64,
}

impl MinimapProjector {
    #[must_use]
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            sx: config.minimap.width / config.world.width,
            sy: config.minimap.height / config.world.height,
            chrome_height: config.minimap.chrome_height,
        }
    }

    /// Horizontal and vertical world-to-minimap factors.
    #[must_use]
    pub const fn factors(&self) -> (f64, f64) {
        (self.sx, self.sy)
    }

    /// Minimap rectangle of a world rectangle.
    #[must_use]
    pub fn project_rect(&self, world: Rect) -> Rect {
        Rect::new(
            world.x * self.sx,
            world.y * self.sy,
            world.width * self.sx,
            world.height * self.sy,
        )
    }

    /// Visible region for a viewport of `viewport` pixels.
    #[must_use]
    pub fn viewport_rect(&self, store: &LayoutStore, viewport: Size) -> Rect {
        let view = store.view();
        let visible_w = viewport.width / view.scale;
        let visible_h = (viewport.height - self.chrome_height) / view.scale;
        Rect::new(
            -view.pan_x * self.sx,
            -view.pan_y * self.sy,
            visible_w * self.sx,
            visible_h * self.sy,
        )
    }

    /// Full projection. Closed cards are omitted.
    #[must_use]
    pub fn project(&self, store: &LayoutStore, viewport: Size) -> MinimapProjection {
        let focused = store.view().focused_card;
        MinimapProjection {
            viewport: self.viewport_rect(store, viewport),
            cards: store
                .open_card_ids()
                .into_iter()
                .map(|id| MinimapCard {
                    id,
                    rect: self.project_rect(store.card(id).rect()),
                    focused: focused == Some(id),
                })
                .collect(),
        }
    }
}
