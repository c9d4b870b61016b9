#![forbid(unsafe_code)]

//! Pointer-capture interaction machine for pan, drag, resize, and zoom.
//!
//! Host pointer lifecycle signals come in; [`LayoutStore`] mutations and
//! host capture commands come out. The machine enforces:
//! - one active gesture (and pointer) at a time,
//! - explicit capture acquire/release commands for the host, and
//! - cancellation on interruption paths (blur, visibility, lost capture).
//!
//! All gesture-local state lives in one private context that exists only
//! while a gesture is active, so a finished or cancelled gesture cannot leak
//! stale offsets into the next one.
//!
//! # Modes
//!
//! ```text
//!            pointer_down(Background)    ┌──────────┐
//!        ┌──────────────────────────────►│ Panning  │──┐
//!        │   pointer_down(CardHeader)    ├──────────┤  │ up / cancel /
//!   Idle ├──────────────────────────────►│ Dragging │──┤ blur / hidden /
//!        │   pointer_down(ResizeHandle)  ├──────────┤  │ lost capture
//!        └──────────────────────────────►│ Resizing │──┤
//!        ▲                               └──────────┘  │
//!        └─────────────────────────────────────────────┘
//! ```
//!
//! Wheel zoom is only accepted while idle.

use cardspace_core::geometry::{anchored_screen_point, wheel_zoom_factor, zoom_about};
use cardspace_core::{CanvasConfig, CardId, Point, ScaleBounds, Size};
use cardspace_layout::{CardPatch, InteractionMode, LayoutStore, ViewPatch};

use crate::anchor::ScreenAnchor;
use crate::wheel::{ScrollMetrics, WheelRoute, route_wheel};

// =========================================================================
// Public vocabulary
// =========================================================================

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty canvas; starts a pan.
    Background,
    /// A card's title bar; starts a drag.
    CardHeader(CardId),
    /// A card's resize grip; starts a resize.
    ResizeHandle(CardId),
    /// A card's content area; left to the card.
    CardBody(CardId),
}

/// Host command for pointer-capture control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureCommand {
    Acquire { pointer_id: u32 },
    Release { pointer_id: u32 },
}

/// Lifecycle phase recorded for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    PointerLeave,
    Blur,
    VisibilityHidden,
    LostPointerCapture,
    CaptureAcquired,
    Wheel,
    ForceCancel,
}

/// Reason an incoming signal changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    GestureInProgress,
    NoActiveGesture,
    PointerMismatch,
    LeaveWhileCaptured,
    NonInteractiveTarget,
    CardClosed,
    MissingAnchor,
    ScaleAtBound,
}

/// Observable result of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEffect {
    GestureStarted {
        mode: InteractionMode,
        card: Option<CardId>,
    },
    Panned {
        pan: Point,
    },
    CardMoved {
        card: CardId,
        position: Point,
    },
    CardResized {
        card: CardId,
        size: Size,
    },
    Zoomed {
        scale: f64,
        pan: Point,
    },
    GestureEnded {
        mode: InteractionMode,
        card: Option<CardId>,
        canceled: bool,
    },
    CaptureAcknowledged,
    WheelPassedThrough,
    Ignored(IgnoredReason),
}

impl InteractionEffect {
    /// A drag or resize just finished (normally or not).
    #[must_use]
    pub const fn requires_persist(&self) -> bool {
        matches!(
            self,
            Self::GestureEnded {
                mode: InteractionMode::Dragging | InteractionMode::Resizing,
                ..
            }
        )
    }
}

/// Result of one lifecycle dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionDispatch {
    pub phase: LifecyclePhase,
    /// Set when the dispatch changed machine or layout state.
    pub sequence: Option<u64>,
    pub pointer_id: Option<u32>,
    pub effect: InteractionEffect,
    pub capture_command: Option<CaptureCommand>,
}

impl InteractionDispatch {
    fn ignored(phase: LifecyclePhase, reason: IgnoredReason, pointer_id: Option<u32>) -> Self {
        tracing::trace!(
            target: "cardspace.interaction",
            phase = ?phase,
            reason = ?reason,
            pointer_id = ?pointer_id,
            "input ignored"
        );
        Self {
            phase,
            sequence: None,
            pointer_id,
            effect: InteractionEffect::Ignored(reason),
            capture_command: None,
        }
    }

    fn passive(phase: LifecyclePhase, pointer_id: Option<u32>, effect: InteractionEffect) -> Self {
        Self {
            phase,
            sequence: None,
            pointer_id,
            effect,
            capture_command: None,
        }
    }

    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self.effect, InteractionEffect::Ignored(_))
    }

    #[must_use]
    pub const fn requires_persist(&self) -> bool {
        self.effect.requires_persist()
    }
}

// =========================================================================
// Gesture context
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureState {
    Requested,
    Acquired,
}

impl CaptureState {
    const fn is_acquired(self) -> bool {
        matches!(self, Self::Acquired)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GestureKind {
    Pan {
        start_screen: Point,
        start_pan: Point,
    },
    Drag {
        card: CardId,
        /// Cursor minus the card's screen top-left at pointer-down.
        grab_offset: Point,
    },
    Resize {
        card: CardId,
        start_size: Size,
        start_screen: Point,
    },
}

impl GestureKind {
    const fn mode(&self) -> InteractionMode {
        match self {
            Self::Pan { .. } => InteractionMode::Panning,
            Self::Drag { .. } => InteractionMode::Dragging,
            Self::Resize { .. } => InteractionMode::Resizing,
        }
    }

    const fn card(&self) -> Option<CardId> {
        match self {
            Self::Pan { .. } => None,
            Self::Drag { card, .. } | Self::Resize { card, .. } => Some(*card),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct GestureContext {
    pointer_id: u32,
    capture: CaptureState,
    kind: GestureKind,
}

// =========================================================================
// Machine
// =========================================================================

/// Interaction machine for one canvas.
#[derive(Debug, Clone)]
pub struct CanvasInteraction {
    bounds: ScaleBounds,
    zoom_in_factor: f64,
    zoom_out_factor: f64,
    cancel_on_leave_without_capture: bool,
    active: Option<GestureContext>,
    next_sequence: u64,
    transition_count: u64,
}

impl CanvasInteraction {
    #[must_use]
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            bounds: config.scale_bounds(),
            zoom_in_factor: config.zoom.zoom_in_factor,
            zoom_out_factor: config.zoom.zoom_out_factor,
            cancel_on_leave_without_capture: true,
            active: None,
            next_sequence: 1,
            transition_count: 0,
        }
    }

    /// Whether pointer-leave cancels a gesture whose capture was never
    /// acknowledged. On by default.
    #[must_use]
    pub const fn with_cancel_on_leave(mut self, enabled: bool) -> Self {
        self.cancel_on_leave_without_capture = enabled;
        self
    }

    /// Current gesture mode.
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.active
            .map_or(InteractionMode::Idle, |active| active.kind.mode())
    }

    #[must_use]
    pub fn active_pointer_id(&self) -> Option<u32> {
        self.active.map(|active| active.pointer_id)
    }

    /// Card being dragged or resized, if any.
    #[must_use]
    pub fn active_card(&self) -> Option<CardId> {
        self.active.and_then(|active| active.kind.card())
    }

    /// Number of mode transitions so far.
    #[must_use]
    pub const fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Handle pointer-down on `target`.
    ///
    /// A header press focuses the card even when the anchor cannot be
    /// measured; the drag itself only starts with a measured anchor.
    pub fn pointer_down(
        &mut self,
        store: &mut LayoutStore,
        anchor: &dyn ScreenAnchor,
        target: PointerTarget,
        pointer_id: u32,
        position: Point,
    ) -> InteractionDispatch {
        const PHASE: LifecyclePhase = LifecyclePhase::PointerDown;
        if self.active.is_some() {
            return InteractionDispatch::ignored(
                PHASE,
                IgnoredReason::GestureInProgress,
                Some(pointer_id),
            );
        }

        let kind = match target {
            PointerTarget::Background => GestureKind::Pan {
                start_screen: position,
                start_pan: store.view().pan(),
            },
            PointerTarget::CardHeader(card) => {
                if !store.card(card).open {
                    return InteractionDispatch::ignored(
                        PHASE,
                        IgnoredReason::CardClosed,
                        Some(pointer_id),
                    );
                }
                store.focus(card);
                let Some(rect) = anchor.anchor_rect() else {
                    return InteractionDispatch::ignored(
                        PHASE,
                        IgnoredReason::MissingAnchor,
                        Some(pointer_id),
                    );
                };
                let top_left =
                    anchored_screen_point(store.card(card).origin(), store.view().scale, rect);
                GestureKind::Drag {
                    card,
                    grab_offset: position.delta_from(top_left),
                }
            }
            PointerTarget::ResizeHandle(card) => {
                if !store.card(card).open {
                    return InteractionDispatch::ignored(
                        PHASE,
                        IgnoredReason::CardClosed,
                        Some(pointer_id),
                    );
                }
                GestureKind::Resize {
                    card,
                    start_size: store.card(card).size(),
                    start_screen: position,
                }
            }
            PointerTarget::CardBody(_) => {
                return InteractionDispatch::ignored(
                    PHASE,
                    IgnoredReason::NonInteractiveTarget,
                    Some(pointer_id),
                );
            }
        };

        let mode = kind.mode();
        let card = kind.card();
        store.set_interaction_mode(mode);
        self.active = Some(GestureContext {
            pointer_id,
            capture: CaptureState::Requested,
            kind,
        });
        self.transition_count += 1;
        tracing::debug!(
            target: "cardspace.interaction",
            mode = %mode,
            card = ?card,
            pointer_id,
            "gesture started"
        );
        self.dispatched(
            PHASE,
            Some(pointer_id),
            InteractionEffect::GestureStarted { mode, card },
            Some(CaptureCommand::Acquire { pointer_id }),
        )
    }

    /// Mark host pointer capture as acquired.
    pub fn capture_acquired(&mut self, pointer_id: u32) -> InteractionDispatch {
        const PHASE: LifecyclePhase = LifecyclePhase::CaptureAcquired;
        let Some(mut active) = self.active else {
            return InteractionDispatch::ignored(
                PHASE,
                IgnoredReason::NoActiveGesture,
                Some(pointer_id),
            );
        };
        if active.pointer_id != pointer_id {
            return InteractionDispatch::ignored(
                PHASE,
                IgnoredReason::PointerMismatch,
                Some(pointer_id),
            );
        }
        active.capture = CaptureState::Acquired;
        self.active = Some(active);
        InteractionDispatch::passive(
            PHASE,
            Some(pointer_id),
            InteractionEffect::CaptureAcknowledged,
        )
    }

    /// Handle pointer-move during a gesture.
    ///
    /// A move on a card that has been closed, or a drag move without a
    /// measured anchor, changes nothing and keeps the gesture alive.
    pub fn pointer_move(
        &mut self,
        store: &mut LayoutStore,
        anchor: &dyn ScreenAnchor,
        pointer_id: u32,
        position: Point,
    ) -> InteractionDispatch {
        const PHASE: LifecyclePhase = LifecyclePhase::PointerMove;
        let Some(active) = self.active else {
            return InteractionDispatch::ignored(
                PHASE,
                IgnoredReason::NoActiveGesture,
                Some(pointer_id),
            );
        };
        if active.pointer_id != pointer_id {
            return InteractionDispatch::ignored(
                PHASE,
                IgnoredReason::PointerMismatch,
                Some(pointer_id),
            );
        }

        let scale = store.view().scale;
        let effect = match active.kind {
            GestureKind::Pan {
                start_screen,
                start_pan,
            } => {
                let delta = position.delta_from(start_screen);
                store.set_view(ViewPatch::pan(Point::new(
                    start_pan.x + delta.x / scale,
                    start_pan.y + delta.y / scale,
                )));
                InteractionEffect::Panned {
                    pan: store.view().pan(),
                }
            }
            GestureKind::Drag { card, grab_offset } => {
                if !store.card(card).open {
                    return InteractionDispatch::ignored(
                        PHASE,
                        IgnoredReason::CardClosed,
                        Some(pointer_id),
                    );
                }
                let Some(rect) = anchor.anchor_rect() else {
                    return InteractionDispatch::ignored(
                        PHASE,
                        IgnoredReason::MissingAnchor,
                        Some(pointer_id),
                    );
                };
                store.set_card(
                    card,
                    CardPatch::position(Point::new(
                        (position.x - rect.left() - grab_offset.x) / scale,
                        (position.y - rect.top() - grab_offset.y) / scale,
                    )),
                );
                InteractionEffect::CardMoved {
                    card,
                    position: store.card(card).origin(),
                }
            }
            GestureKind::Resize {
                card,
                start_size,
                start_screen,
            } => {
                if !store.card(card).open {
                    return InteractionDispatch::ignored(
                        PHASE,
                        IgnoredReason::CardClosed,
                        Some(pointer_id),
                    );
                }
                let delta = position.delta_from(start_screen);
                store.set_card(
                    card,
                    CardPatch::size(Size::new(
                        start_size.width + delta.x / scale,
                        start_size.height + delta.y / scale,
                    )),
                );
                InteractionEffect::CardResized {
                    card,
                    size: store.card(card).size(),
                }
            }
        };
        tracing::trace!(target: "cardspace.interaction", effect = ?effect, "gesture moved");
        self.dispatched(PHASE, Some(pointer_id), effect, None)
    }

    /// Handle pointer-up: end the gesture and release capture.
    pub fn pointer_up(&mut self, store: &mut LayoutStore, pointer_id: u32) -> InteractionDispatch {
        const PHASE: LifecyclePhase = LifecyclePhase::PointerUp;
        let Some(active) = self.active else {
            return InteractionDispatch::ignored(
                PHASE,
                IgnoredReason::NoActiveGesture,
                Some(pointer_id),
            );
        };
        if active.pointer_id != pointer_id {
            return InteractionDispatch::ignored(
                PHASE,
                IgnoredReason::PointerMismatch,
                Some(pointer_id),
            );
        }
        self.finish(store, active, PHASE, false, true)
    }

    /// Handle host pointer-cancel.
    pub fn pointer_cancel(
        &mut self,
        store: &mut LayoutStore,
        pointer_id: Option<u32>,
    ) -> InteractionDispatch {
        self.cancel_active(store, LifecyclePhase::PointerCancel, pointer_id, true)
    }

    /// Handle pointer-leave. Cancels only if capture was never acknowledged.
    pub fn pointer_leave(&mut self, store: &mut LayoutStore, pointer_id: u32) -> InteractionDispatch {
        const PHASE: LifecyclePhase = LifecyclePhase::PointerLeave;
        let Some(active) = self.active else {
            return InteractionDispatch::ignored(
                PHASE,
                IgnoredReason::NoActiveGesture,
                Some(pointer_id),
            );
        };
        if active.pointer_id != pointer_id {
            return InteractionDispatch::ignored(
                PHASE,
                IgnoredReason::PointerMismatch,
                Some(pointer_id),
            );
        }
        if !active.capture.is_acquired() && self.cancel_on_leave_without_capture {
            self.finish(store, active, PHASE, true, true)
        } else {
            InteractionDispatch::ignored(PHASE, IgnoredReason::LeaveWhileCaptured, Some(pointer_id))
        }
    }

    /// Handle host window blur.
    pub fn blur(&mut self, store: &mut LayoutStore) -> InteractionDispatch {
        self.cancel_active(store, LifecyclePhase::Blur, None, true)
    }

    /// Handle the host page becoming hidden.
    pub fn visibility_hidden(&mut self, store: &mut LayoutStore) -> InteractionDispatch {
        self.cancel_active(store, LifecyclePhase::VisibilityHidden, None, true)
    }

    /// Handle lost pointer capture. The host already released it, so no
    /// release command is emitted.
    pub fn lost_pointer_capture(
        &mut self,
        store: &mut LayoutStore,
        pointer_id: u32,
    ) -> InteractionDispatch {
        self.cancel_active(store, LifecyclePhase::LostPointerCapture, Some(pointer_id), false)
    }

    /// Cancel whatever gesture is active, from any source.
    pub fn force_cancel(&mut self, store: &mut LayoutStore) -> InteractionDispatch {
        self.cancel_active(store, LifecyclePhase::ForceCancel, None, true)
    }

    /// Handle a wheel event at `cursor`.
    ///
    /// `ancestors` are the scroll metrics between the event target and the
    /// viewport (empty outside card bodies).
    pub fn wheel(
        &mut self,
        store: &mut LayoutStore,
        anchor: &dyn ScreenAnchor,
        cursor: Point,
        delta_y: f64,
        ancestors: &[ScrollMetrics],
    ) -> InteractionDispatch {
        const PHASE: LifecyclePhase = LifecyclePhase::Wheel;
        if let Some(active) = self.active {
            return InteractionDispatch::ignored(
                PHASE,
                IgnoredReason::GestureInProgress,
                Some(active.pointer_id),
            );
        }
        if route_wheel(ancestors, delta_y) == WheelRoute::NativeScroll {
            return InteractionDispatch::passive(PHASE, None, InteractionEffect::WheelPassedThrough);
        }
        let Some(rect) = anchor.anchor_rect() else {
            return InteractionDispatch::ignored(PHASE, IgnoredReason::MissingAnchor, None);
        };
        let factor = wheel_zoom_factor(delta_y, self.zoom_in_factor, self.zoom_out_factor);
        let Some(solution) = zoom_about(cursor, rect, store.view().scale, factor, self.bounds)
        else {
            return InteractionDispatch::ignored(PHASE, IgnoredReason::ScaleAtBound, None);
        };
        store.set_view(ViewPatch::zoom(solution.scale, solution.pan));
        tracing::trace!(
            target: "cardspace.interaction",
            scale = solution.scale,
            world_x = solution.world_anchor.x,
            world_y = solution.world_anchor.y,
            "zoomed"
        );
        self.dispatched(
            PHASE,
            None,
            InteractionEffect::Zoomed {
                scale: store.view().scale,
                pan: store.view().pan(),
            },
            None,
        )
    }

    fn cancel_active(
        &mut self,
        store: &mut LayoutStore,
        phase: LifecyclePhase,
        pointer_id: Option<u32>,
        release_capture: bool,
    ) -> InteractionDispatch {
        let Some(active) = self.active else {
            return InteractionDispatch::ignored(phase, IgnoredReason::NoActiveGesture, pointer_id);
        };
        if let Some(id) = pointer_id
            && id != active.pointer_id
        {
            return InteractionDispatch::ignored(phase, IgnoredReason::PointerMismatch, Some(id));
        }
        self.finish(store, active, phase, true, release_capture)
    }

    fn finish(
        &mut self,
        store: &mut LayoutStore,
        active: GestureContext,
        phase: LifecyclePhase,
        canceled: bool,
        release_capture: bool,
    ) -> InteractionDispatch {
        self.active = None;
        store.set_interaction_mode(InteractionMode::Idle);
        self.transition_count += 1;

        let mode = active.kind.mode();
        let card = active.kind.card();
        let command = (release_capture && active.capture.is_acquired()).then_some(
            CaptureCommand::Release {
                pointer_id: active.pointer_id,
            },
        );
        tracing::debug!(
            target: "cardspace.interaction",
            mode = %mode,
            card = ?card,
            canceled,
            phase = ?phase,
            "gesture ended"
        );
        self.dispatched(
            phase,
            Some(active.pointer_id),
            InteractionEffect::GestureEnded {
                mode,
                card,
                canceled,
            },
            command,
        )
    }

    fn dispatched(
        &mut self,
        phase: LifecyclePhase,
        pointer_id: Option<u32>,
        effect: InteractionEffect,
        capture_command: Option<CaptureCommand>,
    ) -> InteractionDispatch {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        InteractionDispatch {
            phase,
            sequence: Some(sequence),
            pointer_id,
            effect,
            capture_command,
        }
    }
}
