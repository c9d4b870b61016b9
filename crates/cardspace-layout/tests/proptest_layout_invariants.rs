#![forbid(unsafe_code)]

//! Property tests for [`LayoutStore`] and [`WorkspaceManager`] invariants.
//!
//! Validates:
//! - Card sizes never drop below the floor under arbitrary patches.
//! - View scale never leaves its bounds under arbitrary patches.
//! - `next_z` never decreases and stays above every card's z.
//! - `open` on an open card changes nothing.
//! - Saving then applying a workspace restores the saved cards and view.
//!
//! Run:
//!   cargo test -p cardspace-layout --test proptest_layout_invariants

use cardspace_core::{CanvasConfig, CardId, Point};
use cardspace_layout::{CardPatch, LayoutStore, ViewPatch, WorkspaceManager};
use proptest::prelude::*;

// ============================================================================
// Strategy helpers
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Focus(CardId),
    Toggle(CardId),
    Open(CardId),
    Close(CardId),
    Patch(CardId, CardPatch),
    View(ViewPatch),
}

fn card_strategy() -> impl Strategy<Value = CardId> {
    (0..CardId::COUNT).prop_map(|i| CardId::ALL[i])
}

fn coord_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -10_000.0f64..10_000.0,
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
    ]
}

fn opt_coord() -> impl Strategy<Value = Option<f64>> {
    prop::option::of(coord_strategy())
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => card_strategy().prop_map(Op::Focus),
        3 => card_strategy().prop_map(Op::Toggle),
        2 => card_strategy().prop_map(Op::Open),
        1 => card_strategy().prop_map(Op::Close),
        3 => (card_strategy(), opt_coord(), opt_coord(), opt_coord(), opt_coord())
            .prop_map(|(id, x, y, w, h)| Op::Patch(id, CardPatch { x, y, w, h })),
        2 => (opt_coord(), opt_coord(), prop::option::of(-1.0f64..10.0))
            .prop_map(|(pan_x, pan_y, scale)| Op::View(ViewPatch { pan_x, pan_y, scale })),
    ]
}

fn run(store: &mut LayoutStore, op: &Op) {
    match op {
        Op::Focus(id) => {
            store.focus(*id);
        }
        Op::Toggle(id) => {
            store.toggle(*id);
        }
        Op::Open(id) => {
            store.open(*id);
        }
        Op::Close(id) => {
            store.close(*id);
        }
        Op::Patch(id, patch) => store.set_card(*id, *patch),
        Op::View(patch) => store.set_view(*patch),
    }
}

// ============================================================================
// Invariant 1: geometry stays within bounds
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn sizes_and_scale_stay_in_bounds(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let config = CanvasConfig::default();
        let mut store = LayoutStore::new(&config);
        for op in &ops {
            run(&mut store, op);
            for id in CardId::ALL {
                let card = store.card(id);
                prop_assert!(card.w >= 200.0, "{id} width {}", card.w);
                prop_assert!(card.h >= 120.0, "{id} height {}", card.h);
                prop_assert!(card.is_finite());
            }
            let scale = store.view().scale;
            prop_assert!((0.2..=3.0).contains(&scale), "scale {scale}");
            prop_assert!(store.view().pan().is_finite());
        }
    }
}

// ============================================================================
// Invariant 2: z counter is monotonic and dominant
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn next_z_is_monotonic(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut store = LayoutStore::new(&CanvasConfig::default());
        let mut last = store.view().next_z;
        for op in &ops {
            let focused_before = store.view().focused_card;
            run(&mut store, op);
            let next = store.view().next_z;
            prop_assert!(next >= last);
            prop_assert!(next - last <= 1);
            if next > last {
                let focused = store.view().focused_card;
                prop_assert!(focused.is_some());
                prop_assert_ne!(focused, focused_before);
                prop_assert_eq!(store.card(focused.unwrap()).z, last);
            }
            for id in CardId::ALL {
                prop_assert!(store.card(id).z < next);
            }
            last = next;
        }
    }
}

// ============================================================================
// Invariant 3: open is idempotent
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn open_twice_equals_open_once(
        ops in prop::collection::vec(op_strategy(), 0..30),
        id in card_strategy(),
    ) {
        let mut store = LayoutStore::new(&CanvasConfig::default());
        for op in &ops {
            run(&mut store, op);
        }
        store.open(id);
        let once = store.layout_state();
        prop_assert!(!store.open(id));
        prop_assert_eq!(store.layout_state(), once);
    }
}

// ============================================================================
// Invariant 4: workspace round-trip identity
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(150))]

    #[test]
    fn apply_restores_saved_workspace(
        before in prop::collection::vec(op_strategy(), 0..30),
        after in prop::collection::vec(op_strategy(), 0..30),
    ) {
        let config = CanvasConfig::default();
        let mut store = LayoutStore::new(&config);
        let mut manager = WorkspaceManager::new(config.workspaces.clone());
        for op in &before {
            run(&mut store, op);
        }
        let saved = store.layout_state();
        let id = manager.save(&store, "prop");

        for op in &after {
            run(&mut store, op);
        }
        let open_before_apply: Vec<_> = store.open_card_ids();
        let opened = manager.apply(&id, &mut store).unwrap();

        let restored = store.layout_state();
        prop_assert_eq!(&restored.cards, &saved.cards);
        prop_assert_eq!(restored.view.pan(), saved.view.pan());
        prop_assert_eq!(restored.view.scale, saved.view.scale);

        let expected: Vec<CardId> = CardId::ALL
            .iter()
            .copied()
            .filter(|id| saved.cards[id].open && !open_before_apply.contains(id))
            .collect();
        prop_assert_eq!(opened, expected);
        prop_assert_eq!(manager.active_id(), Some(&id));
    }
}

#[test]
fn apply_keeps_pan_point_exact() {
    let config = CanvasConfig::default();
    let mut store = LayoutStore::new(&config);
    store.set_view(ViewPatch::zoom(1.25, Point::new(-321.5, 77.25)));
    let mut manager = WorkspaceManager::new(config.workspaces.clone());
    let id = manager.save(&store, "exact");
    store.set_view(ViewPatch::zoom(0.4, Point::ORIGIN));
    manager.apply(&id, &mut store);
    assert_eq!(store.view().pan(), Point::new(-321.5, 77.25));
    assert_eq!(store.view().scale, 1.25);
}
