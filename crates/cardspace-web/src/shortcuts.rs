#![forbid(unsafe_code)]

//! Global keyboard shortcuts.
//!
//! | Key        | Action                                              |
//! |------------|-----------------------------------------------------|
//! | `1`..=`9`  | Toggle the n-th card in dock order                  |
//! | `/`        | Open chat (or focus it) and focus the chat input    |
//! | `Escape`   | Close the focused card                              |
//!
//! Nothing resolves while a text field has focus or while ctrl, alt, or
//! meta is held. Shift is ignored.

use bitflags::bitflags;
use cardspace_core::CardId;
use cardspace_core::card::dock_order;
use cardspace_layout::LayoutStore;

bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        /// Meta/Command key.
        const META  = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Key identity, reduced to what the shortcuts care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    Other,
}

/// One key press as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Focus is in an input, textarea, select, or editable element.
    pub editing_text: bool,
}

impl KeyInput {
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            editing_text: false,
        }
    }

    #[must_use]
    pub const fn char(c: char) -> Self {
        Self::new(Key::Char(c))
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn while_editing(mut self) -> Self {
        self.editing_text = true;
        self
    }

    fn is_blocked(&self) -> bool {
        self.editing_text
            || self
                .modifiers
                .intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::META)
    }
}

/// Layout action a key press maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    ToggleCard(CardId),
    /// Open or focus chat; the host should then focus the chat input.
    OpenChatAndFocusInput,
    CloseFocused(CardId),
}

/// Map a key press to a layout action, if any.
#[must_use]
pub fn resolve_shortcut(input: &KeyInput, store: &LayoutStore) -> Option<ShortcutAction> {
    if input.is_blocked() {
        return None;
    }
    match input.key {
        Key::Char('/') => Some(ShortcutAction::OpenChatAndFocusInput),
        Key::Char(c @ '1'..='9') => {
            let index = c.to_digit(10)? as usize - 1;
            dock_order()
                .get(index)
                .copied()
                .map(ShortcutAction::ToggleCard)
        }
        Key::Escape => {
            let focused = store.view().focused_card?;
            store
                .card(focused)
                .open
                .then_some(ShortcutAction::CloseFocused(focused))
        }
        Key::Char(_) | Key::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardspace_core::CanvasConfig;

    fn store() -> LayoutStore {
        LayoutStore::new(&CanvasConfig::default())
    }

    #[test]
    fn digits_follow_dock_order() {
        let store = store();
        let cases = [
            ('1', CardId::Chat),
            ('2', CardId::System),
            ('3', CardId::Channels),
            ('7', CardId::Skills),
            ('9', CardId::Nodes),
        ];
        for (digit, card) in cases {
            assert_eq!(
                resolve_shortcut(&KeyInput::char(digit), &store),
                Some(ShortcutAction::ToggleCard(card)),
                "digit {digit}"
            );
        }
        assert_eq!(resolve_shortcut(&KeyInput::char('0'), &store), None);
    }

    #[test]
    fn editing_or_modifiers_block() {
        let store = store();
        assert_eq!(resolve_shortcut(&KeyInput::char('1').while_editing(), &store), None);
        for m in [Modifiers::CTRL, Modifiers::ALT, Modifiers::META] {
            let input = KeyInput::char('/').with_modifiers(m);
            assert_eq!(resolve_shortcut(&input, &store), None, "{m:?}");
        }
        let shifted = KeyInput::char('/').with_modifiers(Modifiers::SHIFT);
        assert_eq!(
            resolve_shortcut(&shifted, &store),
            Some(ShortcutAction::OpenChatAndFocusInput)
        );
    }

    #[test]
    fn escape_needs_an_open_focused_card() {
        let mut store = store();
        let esc = KeyInput::new(Key::Escape);
        assert_eq!(resolve_shortcut(&esc, &store), None);

        store.focus(CardId::System);
        assert_eq!(
            resolve_shortcut(&esc, &store),
            Some(ShortcutAction::CloseFocused(CardId::System))
        );

        store.close(CardId::System);
        assert_eq!(resolve_shortcut(&esc, &store), None);
    }

    #[test]
    fn other_keys_do_nothing() {
        let store = store();
        assert_eq!(resolve_shortcut(&KeyInput::char('q'), &store), None);
        assert_eq!(resolve_shortcut(&KeyInput::new(Key::Other), &store), None);
    }
}
