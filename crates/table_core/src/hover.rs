//! Ephemeral "cell under the pointer" state.
//!
//! Hover is UI state, not game state: it lives outside [`TableStore`] so that
//! pointer movement never marks the authoritative table state as changed.
//! Only the hover highlight reads it.
//!
//! [`TableStore`]: crate::TableStore

use crate::grid::Cell;
use crate::store::TableEvent;
use bevy::prelude::*;

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct HoveredCells {
    cells: Vec<Option<Cell>>,
}

impl HoveredCells {
    pub fn new(table_count: usize) -> Self {
        Self {
            cells: vec![None; table_count],
        }
    }

    pub fn get(&self, table: usize) -> Option<Cell> {
        self.cells.get(table).copied().flatten()
    }

    /// Sets the hovered cell of `table`. Returns `true` if the value changed;
    /// an unknown table changes nothing.
    pub fn set(&mut self, table: usize, cell: Option<Cell>) -> bool {
        let Some(slot) = self.cells.get_mut(table) else {
            return false;
        };
        if *slot == cell {
            return false;
        }
        *slot = cell;
        true
    }

    pub fn clear(&mut self, table: usize) -> bool {
        self.set(table, None)
    }

    /// Clears every table except `table`; a pointer hovers at most one grid.
    pub fn clear_others(&mut self, table: Option<usize>) -> bool {
        let mut changed = false;
        for (index, slot) in self.cells.iter_mut().enumerate() {
            if Some(index) != table && slot.take().is_some() {
                changed = true;
            }
        }
        changed
    }

    /// Applies the hover side effect of a store event.
    pub fn apply(&mut self, event: &TableEvent) -> bool {
        if event.clears_hover() {
            self.clear(event.table())
        } else {
            false
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(table, cell)| cell.map(|cell| (table, cell)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardId;

    #[test]
    fn set_reports_changes_only() {
        let mut hover = HoveredCells::new(2);
        assert!(hover.set(1, Some(Cell::new(1, 1))));
        assert!(!hover.set(1, Some(Cell::new(1, 1))));
        assert_eq!(hover.get(1), Some(Cell::new(1, 1)));
        assert_eq!(hover.get(0), None);
    }

    #[test]
    fn unknown_table_is_ignored() {
        let mut hover = HoveredCells::new(2);
        assert!(!hover.set(5, Some(Cell::new(0, 0))));
        assert_eq!(hover.get(5), None);
        assert_eq!(hover.iter().count(), 0);
        assert!(!hover.clear(7));
    }

    #[test]
    fn move_event_clears_table_hover() {
        let mut hover = HoveredCells::new(2);
        hover.set(0, Some(Cell::new(2, 2)));
        hover.set(1, Some(Cell::new(3, 3)));
        let event = TableEvent::CardMoved {
            table: 0,
            card: CardId::new("x"),
            from: Cell::new(0, 0),
            to: Cell::new(2, 2),
        };
        assert!(hover.apply(&event));
        assert_eq!(hover.get(0), None);
        assert_eq!(hover.get(1), Some(Cell::new(3, 3)));
    }

    #[test]
    fn clear_others_keeps_current_table() {
        let mut hover = HoveredCells::new(3);
        hover.set(0, Some(Cell::new(0, 1)));
        hover.set(2, Some(Cell::new(0, 2)));
        assert!(hover.clear_others(Some(2)));
        assert_eq!(hover.iter().collect::<Vec<_>>(), vec![(2, Cell::new(0, 2))]);
    }
}
