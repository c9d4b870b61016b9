#![forbid(unsafe_code)]

//! `CanvasEngine`: the single entry point hosts talk to.
//!
//! The engine owns the live [`LayoutStore`], the [`CanvasInteraction`]
//! machine, and the [`WorkspaceManager`], and it is the only place that
//! talks to the [`PersistenceBridge`] and the [`CardOpenHook`].
//!
//! # Persistence points
//!
//! The layout is saved after:
//! - every toggle, and every `open`/`close` that changed something,
//! - the end (or cancellation) of a drag or resize,
//! - applying a workspace.
//!
//! Pan and zoom alone never save; call [`CanvasEngine::save_layout`] for
//! that. The workspace list is saved after every save, apply, and delete.

use cardspace_core::{CanvasConfig, CardId, Point, Size};
use cardspace_layout::{
    CardOpenHook, CardPatch, LayoutState, LayoutStore, MinimapProjection, MinimapProjector,
    PersistenceBridge, RestoreReport, ToggleOutcome, ViewPatch, Workspace, WorkspaceId,
    WorkspaceManager,
};

use crate::anchor::ScreenAnchor;
use crate::interaction::{CanvasInteraction, InteractionDispatch, PointerTarget};
use crate::shortcuts::{KeyInput, ShortcutAction, resolve_shortcut};
use crate::wheel::ScrollMetrics;

/// Canvas engine bound to one persistence bridge and one open hook.
#[derive(Debug)]
pub struct CanvasEngine<B, H> {
    store: LayoutStore,
    interaction: CanvasInteraction,
    workspaces: WorkspaceManager,
    minimap: MinimapProjector,
    restore_report: RestoreReport,
    bridge: B,
    hook: H,
}

impl<B: PersistenceBridge, H: CardOpenHook> CanvasEngine<B, H> {
    /// Build an engine, restoring the layout and workspace list from
    /// `bridge`. Missing or malformed data falls back to defaults.
    pub fn new(config: CanvasConfig, mut bridge: B, hook: H) -> Self {
        let (store, restore_report) = LayoutStore::restore(&config, bridge.load_layout());
        let workspaces = match bridge.load_workspaces() {
            Some(list) => WorkspaceManager::from_list(config.workspaces.clone(), list),
            None => WorkspaceManager::new(config.workspaces.clone()),
        };
        tracing::info!(
            target: "cardspace.layout",
            source = ?restore_report.source,
            clean = restore_report.is_clean(),
            open = store.open_card_ids().len(),
            workspaces = workspaces.len(),
            "canvas engine ready"
        );
        Self {
            interaction: CanvasInteraction::new(&config),
            minimap: MinimapProjector::new(&config),
            store,
            workspaces,
            restore_report,
            bridge,
            hook,
        }
    }

    // ---------------------------------------------------------------------
    // Read side
    // ---------------------------------------------------------------------

    #[must_use]
    pub const fn store(&self) -> &LayoutStore {
        &self.store
    }

    /// Owned copy of the live layout.
    #[must_use]
    pub fn layout_state(&self) -> LayoutState {
        self.store.layout_state()
    }

    #[must_use]
    pub const fn interaction(&self) -> &CanvasInteraction {
        &self.interaction
    }

    #[must_use]
    pub const fn workspaces(&self) -> &WorkspaceManager {
        &self.workspaces
    }

    /// What happened when the layout was restored at construction.
    #[must_use]
    pub const fn restore_report(&self) -> &RestoreReport {
        &self.restore_report
    }

    /// Open cards in paint order (z ascending).
    #[must_use]
    pub fn open_cards_by_z(&self) -> Vec<CardId> {
        self.store.open_cards_by_z()
    }

    /// Open cards in catalog order, e.g. for reloading their content after
    /// a reconnect.
    #[must_use]
    pub fn open_card_ids(&self) -> Vec<CardId> {
        self.store.open_card_ids()
    }

    #[must_use]
    pub fn minimap(&self, viewport: Size) -> MinimapProjection {
        self.minimap.project(&self.store, viewport)
    }

    /// Minimap using the anchor's viewport measurement, if it has one.
    #[must_use]
    pub fn minimap_for(&self, anchor: &dyn ScreenAnchor) -> Option<MinimapProjection> {
        anchor.viewport_size().map(|viewport| self.minimap(viewport))
    }

    #[must_use]
    pub const fn bridge(&self) -> &B {
        &self.bridge
    }

    #[must_use]
    pub const fn hook(&self) -> &H {
        &self.hook
    }

    // ---------------------------------------------------------------------
    // Card operations
    // ---------------------------------------------------------------------

    /// Bring a card to the front. Not persisted.
    pub fn focus(&mut self, id: CardId) -> bool {
        self.store.focus(id)
    }

    /// Flip a card open or closed, then persist.
    pub fn toggle(&mut self, id: CardId) -> ToggleOutcome {
        let outcome = self.store.toggle(id);
        if outcome.is_opened() {
            self.hook.on_card_open(id);
        }
        self.persist();
        outcome
    }

    /// Open a card if it is closed. Opening an open card does nothing.
    pub fn open(&mut self, id: CardId) -> bool {
        if self.store.card(id).open {
            return false;
        }
        self.toggle(id);
        true
    }

    /// Close a card if it is open.
    pub fn close(&mut self, id: CardId) -> bool {
        if !self.store.card(id).open {
            return false;
        }
        self.toggle(id);
        true
    }

    /// Patch a card's geometry. Not persisted.
    pub fn set_card(&mut self, id: CardId, patch: CardPatch) {
        self.store.set_card(id, patch);
    }

    /// Patch the view. Not persisted.
    pub fn set_view(&mut self, patch: ViewPatch) {
        self.store.set_view(patch);
    }

    /// Persist the layout as it stands, pan and zoom included.
    pub fn save_layout(&mut self) {
        self.persist();
    }

    // ---------------------------------------------------------------------
    // Pointer and wheel input
    // ---------------------------------------------------------------------

    pub fn pointer_down(
        &mut self,
        anchor: &dyn ScreenAnchor,
        target: PointerTarget,
        pointer_id: u32,
        position: Point,
    ) -> InteractionDispatch {
        let dispatch =
            self.interaction
                .pointer_down(&mut self.store, anchor, target, pointer_id, position);
        self.after_dispatch(dispatch)
    }

    pub fn capture_acquired(&mut self, pointer_id: u32) -> InteractionDispatch {
        self.interaction.capture_acquired(pointer_id)
    }

    pub fn pointer_move(
        &mut self,
        anchor: &dyn ScreenAnchor,
        pointer_id: u32,
        position: Point,
    ) -> InteractionDispatch {
        let dispatch = self
            .interaction
            .pointer_move(&mut self.store, anchor, pointer_id, position);
        self.after_dispatch(dispatch)
    }

    pub fn pointer_up(&mut self, pointer_id: u32) -> InteractionDispatch {
        let dispatch = self.interaction.pointer_up(&mut self.store, pointer_id);
        self.after_dispatch(dispatch)
    }

    pub fn pointer_cancel(&mut self, pointer_id: Option<u32>) -> InteractionDispatch {
        let dispatch = self.interaction.pointer_cancel(&mut self.store, pointer_id);
        self.after_dispatch(dispatch)
    }

    pub fn pointer_leave(&mut self, pointer_id: u32) -> InteractionDispatch {
        let dispatch = self.interaction.pointer_leave(&mut self.store, pointer_id);
        self.after_dispatch(dispatch)
    }

    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> InteractionDispatch {
        let dispatch = self
            .interaction
            .lost_pointer_capture(&mut self.store, pointer_id);
        self.after_dispatch(dispatch)
    }

    pub fn blur(&mut self) -> InteractionDispatch {
        let dispatch = self.interaction.blur(&mut self.store);
        self.after_dispatch(dispatch)
    }

    pub fn visibility_hidden(&mut self) -> InteractionDispatch {
        let dispatch = self.interaction.visibility_hidden(&mut self.store);
        self.after_dispatch(dispatch)
    }

    pub fn wheel(
        &mut self,
        anchor: &dyn ScreenAnchor,
        cursor: Point,
        delta_y: f64,
        ancestors: &[ScrollMetrics],
    ) -> InteractionDispatch {
        self.interaction
            .wheel(&mut self.store, anchor, cursor, delta_y, ancestors)
    }

    // ---------------------------------------------------------------------
    // Keyboard
    // ---------------------------------------------------------------------

    /// Resolve and apply a global shortcut. Returns the applied action so
    /// the host can follow up (e.g. focus the chat input).
    pub fn handle_key(&mut self, input: &KeyInput) -> Option<ShortcutAction> {
        let action = resolve_shortcut(input, &self.store)?;
        match action {
            ShortcutAction::ToggleCard(id) => {
                self.toggle(id);
            }
            ShortcutAction::OpenChatAndFocusInput => {
                if !self.open(CardId::Chat) {
                    self.focus(CardId::Chat);
                }
            }
            ShortcutAction::CloseFocused(id) => {
                self.close(id);
            }
        }
        tracing::debug!(target: "cardspace.interaction", action = ?action, "shortcut applied");
        Some(action)
    }

    // ---------------------------------------------------------------------
    // Workspaces
    // ---------------------------------------------------------------------

    /// Snapshot the live layout under `label` and persist the list.
    pub fn save_workspace(&mut self, label: &str) -> WorkspaceId {
        let id = self.workspaces.save(&self.store, label);
        self.persist_workspaces();
        id
    }

    /// Replace the live layout with a saved workspace.
    ///
    /// Cards the workspace opened are announced to the hook after the whole
    /// replacement, in catalog order. Returns `None` for an unknown id.
    pub fn apply_workspace(&mut self, id: &WorkspaceId) -> Option<Vec<CardId>> {
        let opened = self.workspaces.apply(id, &mut self.store)?;
        for &card in &opened {
            self.hook.on_card_open(card);
        }
        self.persist();
        self.persist_workspaces();
        Some(opened)
    }

    /// Delete a saved workspace. The live layout is untouched.
    pub fn delete_workspace(&mut self, id: &WorkspaceId) -> Option<Workspace> {
        let removed = self.workspaces.delete(id)?;
        self.persist_workspaces();
        Some(removed)
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn after_dispatch(&mut self, dispatch: InteractionDispatch) -> InteractionDispatch {
        if dispatch.requires_persist() {
            self.persist();
        }
        dispatch
    }

    fn persist(&mut self) {
        let state = self.store.layout_state();
        tracing::trace!(target: "cardspace.persist", next_z = state.view.next_z, "saving layout");
        self.bridge.save_layout(&state);
    }

    fn persist_workspaces(&mut self) {
        let list = self.workspaces.to_list();
        tracing::trace!(
            target: "cardspace.persist",
            count = list.workspaces.len(),
            "saving workspaces"
        );
        self.bridge.save_workspaces(&list);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::FixedAnchor;
    use crate::shortcuts::Key;
    use cardspace_core::Rect;
    use cardspace_layout::{MemoryBridge, RecordingHook};

    type TestEngine = CanvasEngine<MemoryBridge, RecordingHook>;

    fn engine() -> TestEngine {
        CanvasEngine::new(
            CanvasConfig::default(),
            MemoryBridge::new(),
            RecordingHook::default(),
        )
    }

    fn anchor() -> FixedAnchor {
        FixedAnchor::new(
            Rect::new(0.0, 0.0, 6000.0, 4000.0),
            Size::new(1280.0, 800.0),
        )
    }

    #[test]
    fn fresh_engine_uses_defaults_and_does_not_save() {
        let engine = engine();
        assert_eq!(
            engine.open_card_ids(),
            vec![CardId::Chat, CardId::System, CardId::Channels, CardId::Sessions]
        );
        assert!(engine.restore_report().is_clean());
        assert_eq!(engine.bridge().layout_saves(), 0);
    }

    #[test]
    fn toggle_fires_hook_on_open_only_and_always_saves() {
        let mut engine = engine();
        engine.toggle(CardId::Cron);
        engine.toggle(CardId::Cron);
        assert_eq!(engine.hook().opened, vec![CardId::Cron]);
        assert_eq!(engine.bridge().layout_saves(), 2);
    }

    #[test]
    fn open_on_open_card_is_silent() {
        let mut engine = engine();
        assert!(!engine.open(CardId::Chat));
        assert!(engine.hook().opened.is_empty());
        assert_eq!(engine.bridge().layout_saves(), 0);
    }

    #[test]
    fn pan_end_does_not_save_but_drag_end_does() {
        let mut engine = engine();
        let anchor = anchor();
        engine.pointer_down(&anchor, PointerTarget::Background, 1, Point::ORIGIN);
        engine.pointer_move(&anchor, 1, Point::new(30.0, 30.0));
        engine.pointer_up(1);
        assert_eq!(engine.bridge().layout_saves(), 0);

        engine.pointer_down(
            &anchor,
            PointerTarget::CardHeader(CardId::Chat),
            2,
            Point::new(1810.0, 810.0),
        );
        engine.pointer_move(&anchor, 2, Point::new(1900.0, 900.0));
        engine.pointer_up(2);
        assert_eq!(engine.bridge().layout_saves(), 1);
        let saved = engine.bridge().layout().unwrap();
        assert_eq!(saved.cards[&CardId::Chat].x, 1890.0);
    }

    #[test]
    fn cancelled_resize_still_saves() {
        let mut engine = engine();
        let anchor = anchor();
        engine.pointer_down(
            &anchor,
            PointerTarget::ResizeHandle(CardId::System),
            5,
            Point::ORIGIN,
        );
        engine.pointer_move(&anchor, 5, Point::new(20.0, 20.0));
        engine.blur();
        assert_eq!(engine.bridge().layout_saves(), 1);
        assert!(engine.interaction().mode().is_idle());
    }

    #[test]
    fn slash_opens_chat_or_focuses_it() {
        let mut engine = engine();
        engine.close(CardId::Chat);
        let action = engine.handle_key(&KeyInput::char('/'));
        assert_eq!(action, Some(ShortcutAction::OpenChatAndFocusInput));
        assert!(engine.store().card(CardId::Chat).open);
        assert_eq!(engine.hook().opened, vec![CardId::Chat]);

        engine.focus(CardId::System);
        engine.handle_key(&KeyInput::char('/'));
        assert_eq!(engine.store().view().focused_card, Some(CardId::Chat));
        assert_eq!(engine.hook().opened.len(), 1);
    }

    #[test]
    fn escape_closes_focused_card_and_keeps_focus_marker() {
        let mut engine = engine();
        engine.focus(CardId::Sessions);
        engine.handle_key(&KeyInput::new(Key::Escape));
        assert!(!engine.store().card(CardId::Sessions).open);
        assert_eq!(engine.store().view().focused_card, Some(CardId::Sessions));
        assert_eq!(engine.handle_key(&KeyInput::new(Key::Escape)), None);
    }

    #[test]
    fn workspace_ops_save_the_list() {
        let mut engine = engine();
        let id = engine.save_workspace("  focus ");
        assert_eq!(engine.workspaces().get(&id).unwrap().label(), "FOCUS");
        assert!(engine.apply_workspace(&id).unwrap().is_empty());
        assert!(engine.delete_workspace(&id).is_some());
        assert!(engine.delete_workspace(&id).is_none());
        assert_eq!(engine.bridge().workspace_saves(), 3);
        assert!(engine.bridge().workspaces().unwrap().workspaces.is_empty());
    }

    #[test]
    fn engine_restores_from_bridge() {
        let mut first = engine();
        first.toggle(CardId::Debug);
        let id = first.save_workspace("dbg");
        let bridge = first.bridge().clone();

        let second = CanvasEngine::new(CanvasConfig::default(), bridge, RecordingHook::default());
        assert!(second.store().card(CardId::Debug).open);
        assert_eq!(second.workspaces().active_id(), Some(&id));
        assert!(second.hook().opened.is_empty());
    }

    #[test]
    fn minimap_for_detached_anchor_is_none() {
        let engine = engine();
        assert!(engine.minimap_for(&FixedAnchor::detached()).is_none());
        let projection = engine.minimap_for(&anchor()).unwrap();
        assert_eq!(projection.cards.len(), 4);
    }
}
