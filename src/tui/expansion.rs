use std::collections::HashMap;

use crate::view::{CharacterKey, DungeonKey};

/// Characters at these roster positions start expanded.
pub const DEFAULT_OPEN_CHARACTERS: usize = 2;

/// Expand/collapse flags, kept in memory across refreshes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExpansionState {
    characters: HashMap<CharacterKey, bool>,
    dungeons: HashMap<DungeonKey, bool>,
}

impl ExpansionState {
    pub fn character(&self, key: &CharacterKey, index: usize) -> bool {
        self.characters
            .get(key)
            .copied()
            .unwrap_or(index < DEFAULT_OPEN_CHARACTERS)
    }

    pub fn dungeon(&self, key: &DungeonKey) -> bool {
        self.dungeons.get(key).copied().unwrap_or(false)
    }

    pub fn toggle_character(&mut self, key: &CharacterKey, index: usize) -> bool {
        let expanded = !self.character(key, index);
        self.characters.insert(key.clone(), expanded);
        expanded
    }

    pub fn toggle_dungeon(&mut self, key: &DungeonKey) -> bool {
        let expanded = !self.dungeon(key);
        self.dungeons.insert(key.clone(), expanded);
        expanded
    }
}
