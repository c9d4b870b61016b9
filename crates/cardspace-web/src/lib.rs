#![forbid(unsafe_code)]

//! Host-facing canvas engine.
//!
//! # Role in Cardspace
//! `cardspace-web` is the layer a host shell (browser, webview, desktop
//! wrapper) drives. It owns no rendering and no event loop: the host feeds
//! pointer, wheel, and key events plus a [`ScreenAnchor`] for measurements,
//! and reads back the layout, the minimap, and capture commands.
//!
//! # Primary responsibilities
//! - **Interaction**: pan, drag, resize, and wheel zoom as one
//!   pointer-capture state machine.
//! - **Wheel routing**: native scrolling inside card bodies versus canvas
//!   zoom.
//! - **Shortcuts**: digit toggles, chat focus, and escape-to-close.
//! - **Engine**: the [`CanvasEngine`] facade that decides when to persist and
//!   when to notify the card-open hook.
//!
//! # How it fits in the system
//! Geometry and configuration come from `cardspace-core`; the layout store,
//! workspaces, minimap, and persistence seams come from `cardspace-layout`.

pub mod anchor;
pub mod engine;
pub mod interaction;
pub mod shortcuts;
pub mod wheel;

pub use anchor::{FixedAnchor, ScreenAnchor, world_rect_for_view};
pub use engine::CanvasEngine;
pub use interaction::{
    CanvasInteraction, CaptureCommand, IgnoredReason, InteractionDispatch, InteractionEffect,
    LifecyclePhase, PointerTarget,
};
pub use shortcuts::{Key, KeyInput, Modifiers, ShortcutAction, resolve_shortcut};
pub use wheel::{ScrollMetrics, WheelRoute, route_wheel};
