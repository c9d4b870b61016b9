#![forbid(unsafe_code)]

//! Core: canvas geometry, the card catalog, and engine configuration.
//!
//! # Role in Cardspace
//! `cardspace-core` holds the pure, dependency-light pieces every other crate
//! builds on. Nothing here owns mutable state.
//!
//! # Primary responsibilities
//! - **Geometry**: world/screen transforms, scale and size clamps, and the
//!   anchor-preserving zoom solver.
//! - **Card catalog**: the closed [`CardId`] set, its static definitions, and
//!   dock grouping.
//! - **Configuration**: [`CanvasConfig`], loadable from TOML or JSON.
//!
//! # How it fits in the system
//! `cardspace-layout` stores per-card state keyed by [`CardId`] and clamps it
//! with the bounds from [`CanvasConfig`]. `cardspace-web` drives gestures
//! through the geometry functions.

pub mod card;
pub mod config;
pub mod geometry;

pub use card::{CARD_CATALOG, CardDefinition, CardId, DOCK_GROUPS, DockGroup, UnknownCardId, dock_order};
pub use config::{CanvasConfig, ConfigError, MAX_Z, z_in_range};
pub use geometry::{Point, Rect, ScaleBounds, Size, SizeFloor, ZoomSolution};
