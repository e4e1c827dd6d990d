//! The row of blocks the player can place, and which one is selected.

use crate::engine_state::voxels::block::Block;

/// The placeable blocks in slot order and the selected slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotbar {
    slots: Vec<Block>,
    selected: usize,
}

impl Hotbar {
    /// Creates a hotbar with the first slot selected. An empty list falls back to stone.
    pub fn new(slots: Vec<Block>) -> Self {
        let slots = if slots.is_empty() {
            vec![Block::Stone]
        } else {
            slots
        };
        Self { slots, selected: 0 }
    }

    /// Selects a slot by index. Out of range indices are ignored.
    pub fn select(&mut self, slot: usize) {
        if slot < self.slots.len() {
            self.selected = slot;
        }
    }

    /// Moves the selection by whole wheel steps, wrapping at both ends.
    ///
    /// Scrolling up (positive steps) moves towards the first slot.
    pub fn scroll(&mut self, steps: i32) {
        let len = self.slots.len() as i64;
        let next = (self.selected as i64 - i64::from(steps)).rem_euclid(len);
        self.selected = next as usize;
    }

    /// Index of the selected slot.
    pub fn selected_slot(&self) -> usize {
        self.selected
    }

    /// The block placed by the right mouse button.
    pub fn selected_block(&self) -> Block {
        self.slots[self.selected]
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always `false`, a hotbar keeps at least one slot.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotbar() -> Hotbar {
        Hotbar::new(vec![Block::Stone, Block::Dirt, Block::Bedrock])
    }

    #[test]
    fn number_keys_select_existing_slots() {
        let mut hotbar = hotbar();
        hotbar.select(2);
        assert_eq!(hotbar.selected_block(), Block::Bedrock);
        hotbar.select(7);
        assert_eq!(hotbar.selected_slot(), 2);
    }

    #[test]
    fn scrolling_wraps_around() {
        let mut hotbar = hotbar();
        hotbar.scroll(1);
        assert_eq!(hotbar.selected_slot(), 2);
        hotbar.scroll(-1);
        assert_eq!(hotbar.selected_slot(), 0);
        hotbar.scroll(-4);
        assert_eq!(hotbar.selected_slot(), 1);
    }

    #[test]
    fn empty_hotbars_hold_stone() {
        let hotbar = Hotbar::new(Vec::new());
        assert_eq!(hotbar.len(), 1);
        assert!(!hotbar.is_empty());
        assert_eq!(hotbar.selected_block(), Block::Stone);
    }
}
