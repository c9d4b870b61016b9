#![forbid(unsafe_code)]

//! Static card catalog.
//!
//! The set of cards is closed: every [`CardId`] has exactly one
//! [`CardDefinition`] in [`CARD_CATALOG`], stored in catalog order so that
//! `CARD_CATALOG[id.catalog_index()].id == id`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Size};

/// Identifier of a card in the fixed catalog.
///
/// Ordering follows catalog order, which is also the tie-break order for
/// equal z values and the firing order of open hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardId {
    Chat,
    System,
    Channels,
    Sessions,
    Activity,
    Log,
    Skills,
    Cron,
    Config,
    Nodes,
    Debug,
}

impl CardId {
    /// Every card, in catalog order.
    pub const ALL: [CardId; 11] = [
        CardId::Chat,
        CardId::System,
        CardId::Channels,
        CardId::Sessions,
        CardId::Activity,
        CardId::Log,
        CardId::Skills,
        CardId::Cron,
        CardId::Config,
        CardId::Nodes,
        CardId::Debug,
    ];

    /// Number of cards in the catalog.
    pub const COUNT: usize = Self::ALL.len();

    /// Stable lower-case name, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::System => "system",
            Self::Channels => "channels",
            Self::Sessions => "sessions",
            Self::Activity => "activity",
            Self::Log => "log",
            Self::Skills => "skills",
            Self::Cron => "cron",
            Self::Config => "config",
            Self::Nodes => "nodes",
            Self::Debug => "debug",
        }
    }

    /// Position of this card in catalog order.
    #[must_use]
    pub const fn catalog_index(self) -> usize {
        self as usize
    }

    /// Static definition for this card.
    #[must_use]
    pub fn definition(self) -> &'static CardDefinition {
        &CARD_CATALOG[self.catalog_index()]
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown card name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCardId(pub String);

impl fmt::Display for UnknownCardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown card id: {:?}", self.0)
    }
}

impl std::error::Error for UnknownCardId {}

impl FromStr for CardId {
    type Err = UnknownCardId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownCardId(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Dock groups
// ---------------------------------------------------------------------------

/// Dock section a card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockGroup {
    Command,
    Control,
    Agent,
    Settings,
}

impl DockGroup {
    /// Human-facing section label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Command => "Command",
            Self::Control => "Control",
            Self::Agent => "Agent",
            Self::Settings => "Settings",
        }
    }

    /// Cards shown in this dock section, in dock order.
    #[must_use]
    pub const fn cards(self) -> &'static [CardId] {
        match self {
            Self::Command => &[CardId::Chat, CardId::System],
            Self::Control => &[
                CardId::Channels,
                CardId::Sessions,
                CardId::Activity,
                CardId::Log,
            ],
            Self::Agent => &[CardId::Skills, CardId::Cron, CardId::Nodes],
            Self::Settings => &[CardId::Config, CardId::Debug],
        }
    }
}

/// Dock sections in display order.
pub const DOCK_GROUPS: [DockGroup; 4] = [
    DockGroup::Command,
    DockGroup::Control,
    DockGroup::Agent,
    DockGroup::Settings,
];

/// All cards flattened in dock order. Digit shortcuts index into this.
#[must_use]
pub fn dock_order() -> Vec<CardId> {
    DOCK_GROUPS
        .iter()
        .flat_map(|group| group.cards().iter().copied())
        .collect()
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Static description of a card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardDefinition {
    pub id: CardId,
    pub title: &'static str,
    pub icon_key: &'static str,
    pub default_position: Point,
    pub default_size: Size,
    pub group: DockGroup,
    /// Open in a fresh layout.
    pub initially_open: bool,
}

const fn def(
    id: CardId,
    title: &'static str,
    icon_key: &'static str,
    position: (f64, f64),
    size: (f64, f64),
    group: DockGroup,
    initially_open: bool,
) -> CardDefinition {
    CardDefinition {
        id,
        title,
        icon_key,
        default_position: Point::new(position.0, position.1),
        default_size: Size::new(size.0, size.1),
        group,
        initially_open,
    }
}

/// The card catalog, in [`CardId`] order.
pub static CARD_CATALOG: [CardDefinition; CardId::COUNT] = [
    def(CardId::Chat, "CHAT", "message-square", (1800.0, 800.0), (520.0, 580.0), DockGroup::Command, true),
    def(CardId::System, "SYSTEM", "monitor", (1400.0, 800.0), (280.0, 400.0), DockGroup::Command, true),
    def(CardId::Channels, "CHANNELS", "link", (2440.0, 800.0), (260.0, 200.0), DockGroup::Control, true),
    def(CardId::Sessions, "SESSIONS", "users", (2440.0, 1060.0), (260.0, 180.0), DockGroup::Control, true),
    def(CardId::Activity, "ACTIVITY", "activity", (1400.0, 1260.0), (280.0, 260.0), DockGroup::Control, false),
    def(CardId::Log, "LOG", "file-text", (2440.0, 1300.0), (340.0, 240.0), DockGroup::Control, false),
    def(CardId::Skills, "SKILLS", "zap", (2810.0, 800.0), (220.0, 200.0), DockGroup::Agent, false),
    def(CardId::Cron, "CRON", "clock", (2810.0, 1060.0), (220.0, 150.0), DockGroup::Agent, false),
    def(CardId::Config, "CONFIG", "settings", (1800.0, 1440.0), (500.0, 450.0), DockGroup::Settings, false),
    def(CardId::Nodes, "NODES", "server", (2810.0, 1280.0), (260.0, 200.0), DockGroup::Agent, false),
    def(CardId::Debug, "DEBUG", "terminal", (2360.0, 1580.0), (340.0, 260.0), DockGroup::Settings, false),
];
