/// Active-sound tracker
///
/// The only mutable state in the router: the set of exclusive sounds that
/// are currently sounding. Owned by the dispatcher and mutated on its single
/// dispatch path, so no locking is involved.
use std::collections::HashSet;

/// Set of currently-active exclusive sound identifiers
///
/// Non-exclusive sounds are stateless and must never be inserted here.
#[derive(Debug, Default)]
pub struct ActiveSounds {
    active: HashSet<String>,
}

impl ActiveSounds {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a sound is currently active
    pub fn is_active(&self, sound_id: &str) -> bool {
        self.active.contains(sound_id)
    }

    /// Mark a sound active; returns false if it already was (idempotent)
    pub fn activate(&mut self, sound_id: &str) -> bool {
        self.active.insert(sound_id.to_string())
    }

    /// Mark a sound inactive; returns false if it was not active (idempotent)
    pub fn deactivate(&mut self, sound_id: &str) -> bool {
        self.active.remove(sound_id)
    }

    /// Number of currently-active sounds
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
