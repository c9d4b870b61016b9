#![forbid(unsafe_code)]

//! In-memory layout model.
//!
//! [`LayoutStore`] owns one [`CardState`] per [`CardId`] plus the shared
//! [`ViewState`]. Every mutation goes through a method here so that the
//! model invariants hold after each call:
//!
//! 1. Every card has a state, from construction to drop. Cards are toggled,
//!    never removed.
//! 2. Card width/height never drop below the configured floor.
//! 3. View scale stays within the configured bounds.
//! 4. `next_z` is always above every card's z and only grows, except that
//!    reaching [`MAX_Z`] renumbers every card in stacking order first.
//!
//! [`LayoutState`] is the serializable form used for persistence and
//! workspace snapshots.

use std::collections::BTreeMap;
use std::fmt;

use cardspace_core::{CanvasConfig, CardId, MAX_Z, Point, Rect, Size, z_in_range};
use serde::{Deserialize, Serialize};

/// Current layout schema version.
pub const LAYOUT_SCHEMA_VERSION: u16 = 1;

fn default_layout_version() -> u16 {
    LAYOUT_SCHEMA_VERSION
}

// =========================================================================
// Persisted types
// =========================================================================

/// Per-card placement and visibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardState {
    /// World-space left edge. Unbounded.
    pub x: f64,
    /// World-space top edge. Unbounded.
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub open: bool,
    /// Stacking order; higher is in front.
    pub z: i64,
}

impl CardState {
    /// Catalog default for `id` under `config`.
    #[must_use]
    pub fn catalog_default(id: CardId, config: &CanvasConfig) -> Self {
        let def = id.definition();
        let size = config.size_floor().clamp(def.default_size);
        Self {
            x: def.default_position.x,
            y: def.default_position.y,
            w: size.width,
            h: size.height,
            open: def.initially_open,
            z: config
                .cards
                .default_z_base
                .saturating_add(id.catalog_index() as i64),
        }
    }

    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// World-space bounds.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// All geometry fields are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.origin().is_finite() && self.size().is_finite()
    }

    /// Finite geometry and a z within [`MAX_Z`].
    #[must_use]
    pub fn is_restorable(&self) -> bool {
        self.is_finite() && z_in_range(self.z)
    }
}

/// Current gesture mode of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    #[default]
    Idle,
    Panning,
    Dragging,
    Resizing,
}

impl InteractionMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Panning => "panning",
            Self::Dragging => "dragging",
            Self::Resizing => "resizing",
        }
    }

    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared view state: pan, zoom, focus, and the z counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub pan_x: f64,
    pub pan_y: f64,
    pub scale: f64,
    /// Transient; always idle after a restore.
    #[serde(default)]
    pub interaction_mode: InteractionMode,
    /// Per session; a restore starts with nothing focused.
    #[serde(default)]
    pub focused_card: Option<CardId>,
    /// Next z value handed out by a focus.
    pub next_z: i64,
}

impl ViewState {
    /// View of a fresh layout.
    #[must_use]
    pub fn initial(config: &CanvasConfig) -> Self {
        Self {
            pan_x: config.view.initial_pan_x,
            pan_y: config.view.initial_pan_y,
            scale: config.view.initial_scale,
            interaction_mode: InteractionMode::Idle,
            focused_card: None,
            next_z: config.cards.initial_next_z,
        }
    }

    #[must_use]
    pub const fn pan(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }
}

/// Complete layout: the unit of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    /// Schema version for migration detection.
    #[serde(default = "default_layout_version")]
    pub schema_version: u16,
    pub cards: BTreeMap<CardId, CardState>,
    pub view: ViewState,
}

impl LayoutState {
    /// Fresh layout built from catalog defaults.
    #[must_use]
    pub fn initial(config: &CanvasConfig) -> Self {
        Self {
            schema_version: LAYOUT_SCHEMA_VERSION,
            cards: CardId::ALL
                .iter()
                .map(|&id| (id, CardState::catalog_default(id, config)))
                .collect(),
            view: ViewState::initial(config),
        }
    }

    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&CardState> {
        self.cards.get(&id)
    }
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::initial(&CanvasConfig::default())
    }
}

// =========================================================================
// Patches and outcomes
// =========================================================================

/// Partial card update. `None` and non-finite fields leave the card as is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CardPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub w: Option<f64>,
    pub h: Option<f64>,
}

impl CardPatch {
    #[must_use]
    pub const fn position(origin: Point) -> Self {
        Self {
            x: Some(origin.x),
            y: Some(origin.y),
            w: None,
            h: None,
        }
    }

    #[must_use]
    pub const fn size(size: Size) -> Self {
        Self {
            x: None,
            y: None,
            w: Some(size.width),
            h: Some(size.height),
        }
    }
}

/// Partial view update. `None` and non-finite fields leave the view as is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewPatch {
    pub pan_x: Option<f64>,
    pub pan_y: Option<f64>,
    pub scale: Option<f64>,
}

impl ViewPatch {
    #[must_use]
    pub const fn pan(pan: Point) -> Self {
        Self {
            pan_x: Some(pan.x),
            pan_y: Some(pan.y),
            scale: None,
        }
    }

    #[must_use]
    pub const fn zoom(scale: f64, pan: Point) -> Self {
        Self {
            pan_x: Some(pan.x),
            pan_y: Some(pan.y),
            scale: Some(scale),
        }
    }
}

/// Result of [`LayoutStore::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The card went from closed to open and was focused.
    Opened,
    /// The card went from open to closed.
    Closed,
}

impl ToggleOutcome {
    #[must_use]
    pub const fn is_opened(self) -> bool {
        matches!(self, Self::Opened)
    }
}

/// Where a restored layout came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSource {
    /// Nothing was persisted; catalog defaults were used.
    Fresh,
    /// A persisted layout was loaded (possibly with repairs).
    Persisted,
}

/// Repairs applied while restoring a persisted layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub source: RestoreSource,
    /// Cards missing or malformed, replaced by catalog defaults.
    pub defaulted: Vec<CardId>,
    /// Cards whose size was raised to the floor.
    pub clamped: Vec<CardId>,
    pub pan_reset: bool,
    pub scale_adjusted: bool,
    /// Persisted `nextZ` was out of range and reset.
    pub next_z_reset: bool,
}

impl RestoreReport {
    fn fresh() -> Self {
        Self {
            source: RestoreSource::Fresh,
            defaulted: Vec::new(),
            clamped: Vec::new(),
            pan_reset: false,
            scale_adjusted: false,
            next_z_reset: false,
        }
    }

    /// No repair was needed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.defaulted.is_empty() && self.clamped.is_empty() && !self.pan_reset
            && !self.scale_adjusted
            && !self.next_z_reset
    }
}

// =========================================================================
// LayoutStore
// =========================================================================

/// Owner of the live layout.
#[derive(Debug, Clone)]
pub struct LayoutStore {
    config: CanvasConfig,
    cards: [CardState; CardId::COUNT],
    view: ViewState,
}

impl LayoutStore {
    /// Store holding a fresh default layout.
    #[must_use]
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            config: config.clone(),
            cards: CardId::ALL.map(|id| CardState::catalog_default(id, config)),
            view: ViewState::initial(config),
        }
    }

    /// Build a store from a persisted layout, repairing anything malformed.
    ///
    /// Missing cards, non-finite cards and cards with a z beyond [`MAX_Z`]
    /// fall back to their catalog defaults; undersized cards are raised to
    /// the floor; a non-finite pan resets to the initial pan; an unusable
    /// scale resets to the initial scale and a usable one is clamped. The
    /// interaction mode is always idle and nothing is focused. An
    /// out-of-range `next_z` resets to the initial counter, which is then
    /// raised above every restored z.
    #[must_use]
    pub fn restore(config: &CanvasConfig, persisted: Option<LayoutState>) -> (Self, RestoreReport) {
        let mut store = Self::new(config);
        let Some(state) = persisted else {
            tracing::debug!(
                target: "cardspace.layout",
                next_z = store.view.next_z,
                "no persisted layout, using defaults"
            );
            return (store, RestoreReport::fresh());
        };

        let mut report = RestoreReport {
            source: RestoreSource::Persisted,
            ..RestoreReport::fresh()
        };
        let floor = config.size_floor();
        for id in CardId::ALL {
            match state.cards.get(&id) {
                Some(card) if card.is_restorable() => {
                    let size = floor.clamp(card.size());
                    if size != card.size() {
                        report.clamped.push(id);
                    }
                    store.cards[id.catalog_index()] = CardState {
                        w: size.width,
                        h: size.height,
                        ..*card
                    };
                }
                _ => report.defaulted.push(id),
            }
        }

        let view = state.view;
        if view.pan().is_finite() {
            store.view.pan_x = view.pan_x;
            store.view.pan_y = view.pan_y;
        } else {
            report.pan_reset = true;
        }
        if view.scale.is_finite() && view.scale > 0.0 {
            store.view.scale = config.scale_bounds().clamp(view.scale);
            #[allow(clippy::float_cmp)]
            if store.view.scale != view.scale {
                report.scale_adjusted = true;
            }
        } else {
            report.scale_adjusted = true;
        }
        if z_in_range(view.next_z) {
            store.view.next_z = view.next_z;
        } else {
            report.next_z_reset = true;
        }
        store.raise_next_z();

        if report.is_clean() {
            tracing::debug!(target: "cardspace.layout", next_z = store.view.next_z, "persisted layout restored");
        } else {
            tracing::warn!(
                target: "cardspace.layout",
                defaulted = ?report.defaulted,
                clamped = ?report.clamped,
                pan_reset = report.pan_reset,
                scale_adjusted = report.scale_adjusted,
                next_z_reset = report.next_z_reset,
                "persisted layout repaired"
            );
        }
        (store, report)
    }

    /// Configuration the store clamps with.
    #[must_use]
    pub const fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Serializable copy of the whole layout.
    #[must_use]
    pub fn layout_state(&self) -> LayoutState {
        LayoutState {
            schema_version: LAYOUT_SCHEMA_VERSION,
            cards: CardId::ALL
                .iter()
                .map(|&id| (id, *self.card(id)))
                .collect(),
            view: self.view.clone(),
        }
    }

    #[must_use]
    pub fn card(&self, id: CardId) -> &CardState {
        &self.cards[id.catalog_index()]
    }

    /// Merge `patch` into the card, then clamp its size to the floor.
    pub fn set_card(&mut self, id: CardId, patch: CardPatch) {
        let floor = self.config.size_floor();
        let card = &mut self.cards[id.catalog_index()];
        let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
        if let Some(x) = finite(patch.x) {
            card.x = x;
        }
        if let Some(y) = finite(patch.y) {
            card.y = y;
        }
        if let Some(w) = finite(patch.w) {
            card.w = w;
        }
        if let Some(h) = finite(patch.h) {
            card.h = h;
        }
        let size = floor.clamp(card.size());
        card.w = size.width;
        card.h = size.height;
    }

    #[must_use]
    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    /// Merge `patch` into the view, then clamp the scale.
    pub fn set_view(&mut self, patch: ViewPatch) {
        let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
        if let Some(pan_x) = finite(patch.pan_x) {
            self.view.pan_x = pan_x;
        }
        if let Some(pan_y) = finite(patch.pan_y) {
            self.view.pan_y = pan_y;
        }
        if let Some(scale) = finite(patch.scale) {
            self.view.scale = self.config.scale_bounds().clamp(scale);
        }
    }

    pub fn set_interaction_mode(&mut self, mode: InteractionMode) {
        self.view.interaction_mode = mode;
    }

    /// Bring `id` to the front.
    ///
    /// Returns `false` without consuming a z value when `id` is already the
    /// focused card.
    pub fn focus(&mut self, id: CardId) -> bool {
        if self.view.focused_card == Some(id) {
            return false;
        }
        let z = match self.view.next_z.checked_add(1) {
            Some(next) if next <= MAX_Z => {
                self.view.next_z = next;
                next - 1
            }
            _ => {
                self.compact_z();
                let z = self.view.next_z;
                self.view.next_z = z.saturating_add(1);
                z
            }
        };
        self.view.focused_card = Some(id);
        self.cards[id.catalog_index()].z = z;
        tracing::debug!(target: "cardspace.layout", card = %id, z, "card focused");
        true
    }

    /// Flip the card's visibility. Opening also focuses it.
    pub fn toggle(&mut self, id: CardId) -> ToggleOutcome {
        let card = &mut self.cards[id.catalog_index()];
        card.open = !card.open;
        let outcome = if card.open {
            self.focus(id);
            ToggleOutcome::Opened
        } else {
            ToggleOutcome::Closed
        };
        tracing::debug!(target: "cardspace.layout", card = %id, outcome = ?outcome, "card toggled");
        outcome
    }

    /// Open and focus a closed card. Returns `false` if it was already open.
    pub fn open(&mut self, id: CardId) -> bool {
        if self.card(id).open {
            return false;
        }
        self.toggle(id).is_opened()
    }

    /// Close an open card. Returns `false` if it was already closed.
    pub fn close(&mut self, id: CardId) -> bool {
        if !self.card(id).open {
            return false;
        }
        self.toggle(id);
        true
    }

    /// Replace cards and pan/zoom from a snapshot.
    ///
    /// Cards absent from `cards` keep their live state; malformed ones reset
    /// to their catalog default but keep the saved visibility. Returns the cards
    /// that went from closed to open, in catalog order. Focus is untouched;
    /// `next_z` is raised above every applied z.
    pub fn apply_snapshot(
        &mut self,
        cards: &BTreeMap<CardId, CardState>,
        pan: Point,
        scale: f64,
    ) -> Vec<CardId> {
        let floor = self.config.size_floor();
        let mut newly_opened = Vec::new();
        for id in CardId::ALL {
            let Some(saved) = cards.get(&id) else {
                continue;
            };
            let slot = &mut self.cards[id.catalog_index()];
            let was_open = slot.open;
            *slot = if saved.is_restorable() {
                let size = floor.clamp(saved.size());
                CardState {
                    w: size.width,
                    h: size.height,
                    ..*saved
                }
            } else {
                CardState {
                    open: saved.open,
                    ..CardState::catalog_default(id, &self.config)
                }
            };
            if slot.open && !was_open {
                newly_opened.push(id);
            }
        }
        self.set_view(ViewPatch::zoom(scale, pan));
        self.raise_next_z();
        newly_opened
    }

    /// Open cards sorted by z ascending, ties in catalog order.
    #[must_use]
    pub fn open_cards_by_z(&self) -> Vec<CardId> {
        let mut ids = self.open_card_ids();
        ids.sort_by_key(|&id| self.card(id).z);
        ids
    }

    /// Open cards in catalog order.
    #[must_use]
    pub fn open_card_ids(&self) -> Vec<CardId> {
        CardId::ALL
            .iter()
            .copied()
            .filter(|&id| self.card(id).open)
            .collect()
    }

    /// Renumber every card by stacking order from the configured base.
    fn compact_z(&mut self) {
        let base = self
            .config
            .cards
            .default_z_base
            .clamp(-MAX_Z, MAX_Z - CardId::COUNT as i64);
        let mut order: Vec<usize> = (0..CardId::COUNT).collect();
        order.sort_by_key(|&i| self.cards[i].z);
        for (rank, i) in order.into_iter().enumerate() {
            self.cards[i].z = base + rank as i64;
        }
        self.view.next_z = base + CardId::COUNT as i64;
        tracing::info!(target: "cardspace.layout", next_z = self.view.next_z, "z order compacted");
    }

    fn raise_next_z(&mut self) {
        if let Some(max_z) = self.cards.iter().map(|c| c.z).max() {
            self.view.next_z = self.view.next_z.max(max_z.saturating_add(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> LayoutStore {
        LayoutStore::new(&CanvasConfig::default())
    }

    #[test]
    fn fresh_layout_matches_catalog() {
        let s = store();
        assert_eq!(s.card(CardId::Chat).rect(), Rect::new(1800.0, 800.0, 520.0, 580.0));
        assert_eq!(s.card(CardId::Chat).z, 10);
        assert_eq!(s.card(CardId::Debug).z, 20);
        assert_eq!(s.view().next_z, 100);
        assert_eq!(s.view().pan(), Point::new(-1600.0, -600.0));
        assert_eq!(s.view().scale, 1.0);
        assert_eq!(
            s.open_card_ids(),
            vec![CardId::Chat, CardId::System, CardId::Channels, CardId::Sessions]
        );
    }

    #[test]
    fn focus_consumes_one_z() {
        let mut s = store();
        assert!(s.focus(CardId::Log));
        assert_eq!(s.card(CardId::Log).z, 100);
        assert_eq!(s.view().next_z, 101);
        assert_eq!(s.view().focused_card, Some(CardId::Log));
        assert!(!s.focus(CardId::Log));
        assert_eq!(s.view().next_z, 101);
        assert!(s.focus(CardId::Chat));
        assert_eq!(s.card(CardId::Chat).z, 101);
    }

    #[test]
    fn toggle_open_focuses_and_close_keeps_focus() {
        let mut s = store();
        assert_eq!(s.toggle(CardId::Cron), ToggleOutcome::Opened);
        assert!(s.card(CardId::Cron).open);
        assert_eq!(s.view().focused_card, Some(CardId::Cron));
        assert_eq!(s.toggle(CardId::Cron), ToggleOutcome::Closed);
        assert!(!s.card(CardId::Cron).open);
        assert_eq!(s.view().focused_card, Some(CardId::Cron));
    }

    #[test]
    fn open_is_idempotent() {
        let mut s = store();
        assert!(s.open(CardId::Nodes));
        let snapshot = s.layout_state();
        assert!(!s.open(CardId::Nodes));
        assert_eq!(s.layout_state(), snapshot);
    }

    #[test]
    fn close_is_idempotent() {
        let mut s = store();
        assert!(s.close(CardId::Chat));
        assert!(!s.close(CardId::Chat));
        assert!(!s.card(CardId::Chat).open);
    }

    #[test]
    fn set_card_clamps_size_and_ignores_nan() {
        let mut s = store();
        s.set_card(
            CardId::Chat,
            CardPatch {
                x: Some(f64::NAN),
                y: Some(-40.0),
                w: Some(10.0),
                h: Some(900.0),
            },
        );
        let card = s.card(CardId::Chat);
        assert_eq!(card.x, 1800.0);
        assert_eq!(card.y, -40.0);
        assert_eq!(card.w, 200.0);
        assert_eq!(card.h, 900.0);
    }

    #[test]
    fn set_view_clamps_scale() {
        let mut s = store();
        s.set_view(ViewPatch {
            scale: Some(9.0),
            ..ViewPatch::default()
        });
        assert_eq!(s.view().scale, 3.0);
        s.set_view(ViewPatch::pan(Point::new(5.0, f64::INFINITY)));
        assert_eq!(s.view().pan(), Point::new(5.0, -600.0));
    }

    #[test]
    fn open_cards_by_z_breaks_ties_in_catalog_order() {
        let mut s = store();
        s.cards[CardId::Sessions.catalog_index()].z = 10;
        let order = s.open_cards_by_z();
        assert_eq!(
            order,
            vec![CardId::Chat, CardId::Sessions, CardId::System, CardId::Channels]
        );
    }

    #[test]
    fn restore_none_is_fresh() {
        let (s, report) = LayoutStore::restore(&CanvasConfig::default(), None);
        assert_eq!(report.source, RestoreSource::Fresh);
        assert!(report.is_clean());
        assert_eq!(s.layout_state(), LayoutState::default());
    }

    #[test]
    fn restore_repairs_malformed_state() {
        let config = CanvasConfig::default();
        let mut state = LayoutState::initial(&config);
        state.cards.remove(&CardId::Log);
        state.cards.get_mut(&CardId::Chat).unwrap().x = f64::NAN;
        state.cards.get_mut(&CardId::Cron).unwrap().w = 50.0;
        state.cards.get_mut(&CardId::Skills).unwrap().z = 500;
        state.view.scale = 0.0;
        state.view.pan_x = f64::NEG_INFINITY;
        state.view.interaction_mode = InteractionMode::Dragging;

        let (s, report) = LayoutStore::restore(&config, Some(state));
        assert_eq!(report.defaulted, vec![CardId::Chat, CardId::Log]);
        assert_eq!(report.clamped, vec![CardId::Cron]);
        assert!(report.pan_reset);
        assert!(report.scale_adjusted);
        assert_eq!(s.card(CardId::Chat).x, 1800.0);
        assert_eq!(s.card(CardId::Cron).w, 200.0);
        assert_eq!(s.view().scale, 1.0);
        assert_eq!(s.view().pan(), Point::new(-1600.0, -600.0));
        assert_eq!(s.view().interaction_mode, InteractionMode::Idle);
        assert_eq!(s.view().next_z, 501);
    }

    #[test]
    fn restore_defaults_cards_with_huge_z_and_keeps_focusing() {
        let config = CanvasConfig::default();
        let mut state = LayoutState::initial(&config);
        state.cards.get_mut(&CardId::Chat).unwrap().z = i64::MAX;
        state.cards.get_mut(&CardId::Log).unwrap().z = i64::MIN;
        state.view.next_z = i64::MAX;
        state.view.focused_card = Some(CardId::Chat);

        let (mut s, report) = LayoutStore::restore(&config, Some(state));
        assert_eq!(report.defaulted, vec![CardId::Chat, CardId::Log]);
        assert!(report.next_z_reset);
        assert_eq!(s.card(CardId::Chat).z, 10);
        assert_eq!(s.view().next_z, 100);
        assert_eq!(s.view().focused_card, None);

        assert_eq!(s.toggle(CardId::Log), ToggleOutcome::Opened);
        assert_eq!(s.card(CardId::Log).z, 100);
        assert_eq!(s.view().next_z, 101);
    }

    #[test]
    fn focus_at_ceiling_renumbers_in_stacking_order() {
        let mut s = store();
        s.cards[CardId::Chat.catalog_index()].z = MAX_Z - 1;
        s.cards[CardId::System.catalog_index()].z = MAX_Z - 2;
        s.view.next_z = MAX_Z;

        assert!(s.focus(CardId::Log));
        let by_z: Vec<_> = CardId::ALL.iter().map(|&id| (s.card(id).z, id)).collect();
        let top = by_z.iter().max().unwrap().1;
        assert_eq!(top, CardId::Log);
        assert!(s.card(CardId::System).z < s.card(CardId::Chat).z);
        assert!(s.card(CardId::Chat).z < s.card(CardId::Log).z);
        assert_eq!(s.card(CardId::Log).z, 10 + CardId::COUNT as i64);
        assert_eq!(s.view().next_z, s.card(CardId::Log).z + 1);
        assert!(CardId::ALL.iter().all(|&id| s.card(id).z < s.view().next_z));
    }

    #[test]
    fn apply_snapshot_defaults_huge_z_but_keeps_visibility() {
        let mut s = store();
        let mut cards = BTreeMap::new();
        let mut debug = *s.card(CardId::Debug);
        debug.open = true;
        debug.z = i64::MAX;
        cards.insert(CardId::Debug, debug);
        assert_eq!(s.apply_snapshot(&cards, Point::ORIGIN, 1.0), vec![CardId::Debug]);
        let debug = s.card(CardId::Debug);
        assert!(debug.open);
        assert_eq!(debug.z, 10 + CardId::Debug.catalog_index() as i64);
        assert!(s.focus(CardId::Debug));
    }

    #[test]
    fn restore_clamps_out_of_range_scale() {
        let config = CanvasConfig::default();
        let mut state = LayoutState::initial(&config);
        state.view.scale = 0.05;
        let (s, report) = LayoutStore::restore(&config, Some(state));
        assert!(report.scale_adjusted);
        assert_eq!(s.view().scale, 0.2);
    }

    #[test]
    fn apply_snapshot_reports_newly_opened_in_catalog_order() {
        let mut s = store();
        let mut cards = s.layout_state().cards;
        for id in [CardId::Debug, CardId::Activity] {
            cards.get_mut(&id).unwrap().open = true;
        }
        cards.get_mut(&CardId::Chat).unwrap().open = false;
        let opened = s.apply_snapshot(&cards, Point::new(1.0, 2.0), 0.5);
        assert_eq!(opened, vec![CardId::Activity, CardId::Debug]);
        assert!(!s.card(CardId::Chat).open);
        assert_eq!(s.view().pan(), Point::new(1.0, 2.0));
        assert_eq!(s.view().scale, 0.5);
    }

    #[test]
    fn apply_snapshot_skips_missing_and_raises_next_z() {
        let mut s = store();
        s.set_card(CardId::Log, CardPatch::position(Point::new(7.0, 8.0)));
        let mut cards = BTreeMap::new();
        let mut chat = *s.card(CardId::Chat);
        chat.z = 4000;
        cards.insert(CardId::Chat, chat);
        s.apply_snapshot(&cards, Point::ORIGIN, 1.0);
        assert_eq!(s.card(CardId::Log).origin(), Point::new(7.0, 8.0));
        assert_eq!(s.view().next_z, 4001);
    }

    #[test]
    fn layout_state_json_uses_camel_case() {
        let json = serde_json::to_value(store().layout_state()).unwrap();
        assert_eq!(json["schemaVersion"], 1);
        assert_eq!(json["view"]["panX"], -1600.0);
        assert_eq!(json["view"]["nextZ"], 100);
        assert_eq!(json["view"]["interactionMode"], "idle");
        assert_eq!(json["cards"]["chat"]["w"], 520.0);
    }
}
