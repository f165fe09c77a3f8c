use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

/// Discrete intents the embedding shell decodes from key events.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Rotate,
    Fire,
}

/// Pointer buttons, mapped to reveal/flag on the mine field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Held-intent tracking with press-edge detection, so holding fire does not
/// autofire and key repeat does not double-apply.
#[derive(Clone, Debug, Default)]
pub struct KeyState {
    held: HashSet<Intent>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true only on the initial press, not while held.
    pub fn press(&mut self, intent: Intent) -> bool {
        self.held.insert(intent)
    }

    pub fn release(&mut self, intent: Intent) {
        self.held.remove(&intent);
    }

    pub fn is_held(&self, intent: Intent) -> bool {
        self.held.contains(&intent)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}
