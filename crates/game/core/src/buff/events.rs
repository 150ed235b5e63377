//! Buff lifecycle notifications.

/// Emitted by a [`BuffManager`](super::BuffManager) to its listeners.
#[derive(Clone, Debug, PartialEq)]
pub enum BuffEvent {
    /// A new buff entry was created and its modifiers applied.
    Applied { name: String, is_debuff: bool },
    /// A slot's stack count changed.
    StackChanged { name: String, stacks: u32 },
    /// An existing entry had its remaining time restored.
    Refreshed { name: String },
    /// The entry reached the end of its duration and was reverted.
    Expired { name: String },
    /// The entry was removed explicitly and reverted.
    Removed { name: String },
    /// Every entry was reverted at once (death/reset).
    Cleared { count: usize },
}

impl BuffEvent {
    /// Buff name this event refers to, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Applied { name, .. }
            | Self::StackChanged { name, .. }
            | Self::Refreshed { name }
            | Self::Expired { name }
            | Self::Removed { name } => Some(name),
            Self::Cleared { .. } => None,
        }
    }
}

/// Callback registered through [`BuffManager::subscribe`](super::BuffManager::subscribe).
pub type BuffListener = Box<dyn FnMut(&BuffEvent)>;
