//! Key dispatch — which keystroke runs which command.
//!
//! Bindings are keyed by [`Key`]. Today a key is a raw byte; once escape
//! sequences are decoded the table keeps the same shape with richer keys.
//! Unbound keys, and [`Key::NoInput`], dispatch to nothing.

use std::collections::HashMap;

use liko_term::input::{Key, ctrl_key};

/// An editor command a key can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Clear the screen and leave the editor.
    Quit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keymap {
    bindings: HashMap<Key, Command>,
}

impl Keymap {
    /// An empty keymap: every key is a no-op.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The startup keymap: Ctrl+`quit_char` quits.
    #[must_use]
    pub fn with_quit(quit_char: u8) -> Self {
        let mut map = Self::new();
        map.bind(Key::Byte(ctrl_key(quit_char)), Command::Quit);
        map
    }

    /// Bind `key` to `command`, returning the previous binding.
    ///
    /// Binding [`Key::NoInput`] is ignored: a timeout never triggers anything.
    pub fn bind(&mut self, key: Key, command: Command) -> Option<Command> {
        if key == Key::NoInput {
            return None;
        }
        self.bindings.insert(key, command)
    }

    /// Remove the binding for `key`.
    pub fn unbind(&mut self, key: Key) -> Option<Command> {
        self.bindings.remove(&key)
    }

    /// The command bound to `key`, if any.
    #[must_use]
    pub fn lookup(&self, key: Key) -> Option<Command> {
        self.bindings.get(&key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
