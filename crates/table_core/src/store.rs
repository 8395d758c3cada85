//! Authoritative card placement and selection for every table.
//!
//! The store is the single owner of table state. All mutations go through its
//! commands, which validate first and mutate second: a command that returns an
//! error has changed nothing.
//!
//! Invariants held after every command:
//!   * no two cards of one table share a cell,
//!   * a table's selection, if any, names a card on that table,
//!   * tables never see each other's cards.

use crate::LOG_TABLE;
use crate::card::{Card, CardId, NewCard, SEED_CARD_FRONT};
use crate::error::TableError;
use crate::grid::{Cell, GridLayout};
use crate::settings::TableSettings;
use crate::table::Table;
use bevy::prelude::*;
use tracing::debug;

/// Change applied by a successful command.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    CardSelected {
        table: usize,
        card: CardId,
    },
    CardDeselected {
        table: usize,
        card: Option<CardId>,
    },
    CardMoved {
        table: usize,
        card: CardId,
        from: Cell,
        to: Cell,
    },
    CardAdded {
        table: usize,
        card: CardId,
    },
    CardRemoved {
        table: usize,
        card: CardId,
        was_selected: bool,
    },
}

impl TableEvent {
    pub fn table(&self) -> usize {
        match self {
            Self::CardSelected { table, .. }
            | Self::CardDeselected { table, .. }
            | Self::CardMoved { table, .. }
            | Self::CardAdded { table, .. }
            | Self::CardRemoved { table, .. } => *table,
        }
    }

    /// Deselecting and moving also drop the table's hover highlight.
    pub fn clears_hover(&self) -> bool {
        matches!(self, Self::CardDeselected { .. } | Self::CardMoved { .. })
    }
}

/// Commands accepted by [`TableStore::apply`].
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    SelectCard { table: usize, card: CardId },
    DeselectCard { table: usize },
    MoveCard { table: usize, card: CardId, cell: Cell },
    AddCard { table: usize, card: NewCard },
    RemoveCard { table: usize, card: CardId },
    /// A click on a card: toggles its selection.
    ClickCard { table: usize, card: CardId },
    /// A click on an empty grid cell: moves the selected card there.
    ClickCell { table: usize, cell: Cell },
}

impl TableCommand {
    pub fn table(&self) -> usize {
        match self {
            Self::SelectCard { table, .. }
            | Self::DeselectCard { table }
            | Self::MoveCard { table, .. }
            | Self::AddCard { table, .. }
            | Self::RemoveCard { table, .. }
            | Self::ClickCard { table, .. }
            | Self::ClickCell { table, .. } => *table,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TableStore {
    tables: Vec<Table>,
    grid: GridLayout,
}

impl Default for TableStore {
    fn default() -> Self {
        Self::from_settings(&TableSettings::default())
    }
}

impl TableStore {
    /// Creates `table_count` tables, each seeded with one card in cell `(0, 0)`.
    pub fn new(table_count: usize, grid: GridLayout) -> Self {
        let tables = (0..table_count)
            .map(|index| {
                let seed = Card::new(
                    CardId::generated(index, 1),
                    SEED_CARD_FRONT,
                    None,
                    Cell::new(0, 0),
                );
                Table {
                    cards: vec![seed],
                    selected: None,
                    next_serial: 2,
                }
            })
            .collect();
        Self { tables, grid }
    }

    pub fn from_settings(settings: &TableSettings) -> Self {
        Self::new(settings.table_count, settings.grid())
    }

    pub fn grid(&self) -> &GridLayout {
        &self.grid
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, table: usize) -> Option<&Table> {
        self.tables.get(table)
    }

    pub fn selected_card(&self, table: usize) -> Option<&CardId> {
        self.table(table).and_then(Table::selected)
    }

    pub fn card_at(&self, table: usize, cell: Cell) -> Option<&Card> {
        self.table(table).and_then(|t| t.card_at(cell))
    }

    /// Dispatches a command to the matching operation.
    pub fn apply(&mut self, command: TableCommand) -> Result<Option<TableEvent>, TableError> {
        match command {
            TableCommand::SelectCard { table, card } => self.select_card(table, &card).map(Some),
            TableCommand::DeselectCard { table } => self.deselect_card(table).map(Some),
            TableCommand::MoveCard { table, card, cell } => {
                self.move_card(table, &card, cell).map(Some)
            }
            TableCommand::AddCard { table, card } => self
                .add_card(table, card)
                .map(|card| Some(TableEvent::CardAdded { table, card })),
            TableCommand::RemoveCard { table, card } => self.remove_card(table, &card),
            TableCommand::ClickCard { table, card } => self.click_card(table, &card).map(Some),
            TableCommand::ClickCell { table, cell } => self.click_cell(table, cell),
        }
    }

    /// Selects `card`. Selecting the already selected card changes nothing.
    pub fn select_card(&mut self, table: usize, card: &CardId) -> Result<TableEvent, TableError> {
        let entry = self.table_mut(table)?;
        if !entry.contains(card) {
            return Err(TableError::CardNotFound {
                table,
                card: card.clone(),
            });
        }
        if !entry.is_selected(card) {
            entry.selected = Some(card.clone());
            debug!(target: LOG_TABLE, table, card = %card, "card selected");
        }
        Ok(TableEvent::CardSelected {
            table,
            card: card.clone(),
        })
    }

    /// Clears the selection of `table`. Succeeds when nothing is selected.
    pub fn deselect_card(&mut self, table: usize) -> Result<TableEvent, TableError> {
        let entry = self.table_mut(table)?;
        let card = entry.selected.take();
        if let Some(card) = &card {
            debug!(target: LOG_TABLE, table, card = %card, "card deselected");
        }
        Ok(TableEvent::CardDeselected { table, card })
    }

    /// Moves `card` to `cell` and clears the table's selection.
    ///
    /// Requires a selection on the table and a target cell that is inside the
    /// grid and not held by another card.
    pub fn move_card(
        &mut self,
        table: usize,
        card: &CardId,
        cell: Cell,
    ) -> Result<TableEvent, TableError> {
        let grid = self.grid;
        let entry = self.table_mut(table)?;
        if entry.selected.is_none() {
            return Err(TableError::NothingSelected(table));
        }
        check_bounds(&grid, cell)?;
        let Some(index) = entry.position(card) else {
            return Err(TableError::CardNotFound {
                table,
                card: card.clone(),
            });
        };
        if let Some(occupant) = entry.occupant_other_than(cell, card) {
            return Err(TableError::CellOccupied {
                table,
                cell,
                occupant: occupant.id().clone(),
            });
        }

        let from = entry.cards[index].cell();
        entry.cards[index] = entry.cards[index].with_cell(cell);
        entry.selected = None;
        debug!(target: LOG_TABLE, table, card = %card, %from, to = %cell, "card moved");
        Ok(TableEvent::CardMoved {
            table,
            card: card.clone(),
            from,
            to: cell,
        })
    }

    /// Appends a card and returns its id, generating one when none is given.
    pub fn add_card(&mut self, table: usize, new_card: NewCard) -> Result<CardId, TableError> {
        let grid = self.grid;
        let cell = new_card.cell();
        let entry = self.table_mut(table)?;
        check_bounds(&grid, cell)?;
        if let Some(occupant) = entry.card_at(cell) {
            return Err(TableError::CellOccupied {
                table,
                cell,
                occupant: occupant.id().clone(),
            });
        }

        let id = match new_card.id {
            Some(id) if entry.contains(&id) => {
                return Err(TableError::DuplicateCardId { table, card: id });
            }
            Some(id) => id,
            None => loop {
                let candidate = CardId::generated(table, entry.next_serial);
                entry.next_serial += 1;
                if !entry.contains(&candidate) {
                    break candidate;
                }
            },
        };

        entry
            .cards
            .push(Card::new(id.clone(), new_card.front, new_card.back, cell));
        debug!(target: LOG_TABLE, table, card = %id, %cell, "card added");
        Ok(id)
    }

    /// Removes `card`. Missing cards are ignored.
    ///
    /// The selection survives unless it named the removed card.
    pub fn remove_card(
        &mut self,
        table: usize,
        card: &CardId,
    ) -> Result<Option<TableEvent>, TableError> {
        let entry = self.table_mut(table)?;
        let Some(index) = entry.position(card) else {
            return Ok(None);
        };
        entry.cards.remove(index);
        let was_selected = entry.is_selected(card);
        if was_selected {
            entry.selected = None;
        }
        debug!(target: LOG_TABLE, table, card = %card, was_selected, "card removed");
        Ok(Some(TableEvent::CardRemoved {
            table,
            card: card.clone(),
            was_selected,
        }))
    }

    /// Toggles the selection of a clicked card.
    pub fn click_card(&mut self, table: usize, card: &CardId) -> Result<TableEvent, TableError> {
        let already_selected = self
            .table(table)
            .is_some_and(|entry| entry.is_selected(card));
        if already_selected {
            self.deselect_card(table)
        } else {
            self.select_card(table, card)
        }
    }

    /// Moves the selected card to a clicked cell. Without a selection this does nothing.
    pub fn click_cell(&mut self, table: usize, cell: Cell) -> Result<Option<TableEvent>, TableError> {
        let Some(selected) = self.table_mut(table)?.selected.clone() else {
            return Ok(None);
        };
        self.move_card(table, &selected, cell).map(Some)
    }

    fn table_mut(&mut self, table: usize) -> Result<&mut Table, TableError> {
        let count = self.tables.len();
        self.tables
            .get_mut(table)
            .ok_or(TableError::UnknownTable { table, count })
    }
}

fn check_bounds(grid: &GridLayout, cell: Cell) -> Result<(), TableError> {
    if grid.contains(cell) {
        Ok(())
    } else {
        Err(TableError::CellOutOfBounds {
            cell,
            cols: grid.cols(),
            rows: grid.rows(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TableStore {
        TableStore::new(5, GridLayout::default())
    }

    fn seed(table: usize) -> CardId {
        CardId::generated(table, 1)
    }

    #[test]
    fn tables_are_seeded_with_one_card() {
        let store = store();
        assert_eq!(store.table_count(), 5);
        for (index, table) in store.tables().iter().enumerate() {
            assert_eq!(table.len(), 1);
            let card = &table.cards()[0];
            assert_eq!(card.id(), &seed(index));
            assert_eq!(card.cell(), Cell::new(0, 0));
            assert_eq!(card.front, SEED_CARD_FRONT);
            assert!(table.selected().is_none());
        }
    }

    #[test]
    fn select_is_idempotent() {
        let mut store = store();
        store.select_card(0, &seed(0)).unwrap();
        store.select_card(0, &seed(0)).unwrap();
        assert_eq!(store.selected_card(0), Some(&seed(0)));
    }

    #[test]
    fn select_rejects_unknown_card() {
        let mut store = store();
        let err = store.select_card(0, &seed(1)).unwrap_err();
        assert_eq!(
            err,
            TableError::CardNotFound {
                table: 0,
                card: seed(1)
            }
        );
        assert!(store.selected_card(0).is_none());
    }

    #[test]
    fn deselect_without_selection_succeeds() {
        let mut store = store();
        let event = store.deselect_card(2).unwrap();
        assert_eq!(event, TableEvent::CardDeselected { table: 2, card: None });
        assert!(event.clears_hover());
    }

    #[test]
    fn move_requires_selection() {
        let mut store = store();
        let err = store.move_card(0, &seed(0), Cell::new(1, 1)).unwrap_err();
        assert_eq!(err, TableError::NothingSelected(0));
        assert_eq!(store.card_at(0, Cell::new(0, 0)).map(Card::id), Some(&seed(0)));
    }

    #[test]
    fn move_rejects_out_of_bounds() {
        let mut store = store();
        store.select_card(0, &seed(0)).unwrap();
        let err = store.move_card(0, &seed(0), Cell::new(4, 0)).unwrap_err();
        assert!(matches!(err, TableError::CellOutOfBounds { .. }));
        assert_eq!(store.selected_card(0), Some(&seed(0)));
    }

    #[test]
    fn move_onto_own_cell_clears_selection() {
        let mut store = store();
        store.select_card(0, &seed(0)).unwrap();
        let event = store.move_card(0, &seed(0), Cell::new(0, 0)).unwrap();
        assert!(matches!(event, TableEvent::CardMoved { from, to, .. } if from == to));
        assert!(store.selected_card(0).is_none());
    }

    #[test]
    fn tables_do_not_interfere() {
        let mut store = store();
        store.select_card(1, &seed(1)).unwrap();
        store.move_card(1, &seed(1), Cell::new(3, 9)).unwrap();
        for table in [0, 2, 3, 4] {
            assert_eq!(store.card_at(table, Cell::new(0, 0)).map(Card::id), Some(&seed(table)));
        }
        assert_eq!(store.card_at(1, Cell::new(3, 9)).map(Card::id), Some(&seed(1)));
    }

    #[test]
    fn unknown_table_is_rejected() {
        let mut store = store();
        assert_eq!(
            store.deselect_card(9).unwrap_err(),
            TableError::UnknownTable { table: 9, count: 5 }
        );
    }

    #[test]
    fn add_rejects_duplicate_and_occupied() {
        let mut store = store();
        let dup = NewCard::new("a.jpg", 1, 1).with_id(seed(0));
        assert!(matches!(
            store.add_card(0, dup),
            Err(TableError::DuplicateCardId { .. })
        ));
        let occupied = NewCard::new("a.jpg", 0, 0);
        assert!(matches!(
            store.add_card(0, occupied),
            Err(TableError::CellOccupied { .. })
        ));
        assert_eq!(store.table(0).unwrap().len(), 1);
    }

    #[test]
    fn generated_ids_skip_taken_ones() {
        let mut store = store();
        store
            .add_card(0, NewCard::new("a.jpg", 1, 0).with_id("table-0-card-2"))
            .unwrap();
        let id = store.add_card(0, NewCard::new("b.jpg", 1, 1)).unwrap();
        assert_eq!(id.as_str(), "table-0-card-3");
    }

    #[test]
    fn remove_keeps_other_selection() {
        let mut store = store();
        let other = store.add_card(0, NewCard::new("b.jpg", 2, 2)).unwrap();
        store.select_card(0, &seed(0)).unwrap();
        let event = store.remove_card(0, &other).unwrap();
        assert!(matches!(
            event,
            Some(TableEvent::CardRemoved { was_selected: false, .. })
        ));
        assert_eq!(store.selected_card(0), Some(&seed(0)));
    }

    #[test]
    fn remove_selected_card_clears_selection() {
        let mut store = store();
        store.select_card(0, &seed(0)).unwrap();
        store.remove_card(0, &seed(0)).unwrap();
        assert!(store.selected_card(0).is_none());
        assert!(store.table(0).unwrap().is_empty());
    }

    #[test]
    fn remove_missing_card_is_silent() {
        let mut store = store();
        assert_eq!(store.remove_card(0, &CardId::new("nope")).unwrap(), None);
    }

    #[test]
    fn click_card_toggles_selection() {
        let mut store = store();
        store.click_card(3, &seed(3)).unwrap();
        assert_eq!(store.selected_card(3), Some(&seed(3)));
        store.click_card(3, &seed(3)).unwrap();
        assert!(store.selected_card(3).is_none());
    }

    #[test]
    fn click_cell_without_selection_is_noop() {
        let mut store = store();
        assert_eq!(store.click_cell(0, Cell::new(2, 2)).unwrap(), None);
        assert_eq!(store.card_at(0, Cell::new(0, 0)).map(Card::id), Some(&seed(0)));
    }

    #[test]
    fn apply_dispatches_commands() {
        let mut store = store();
        store
            .apply(TableCommand::SelectCard {
                table: 0,
                card: seed(0),
            })
            .unwrap();
        let event = store
            .apply(TableCommand::ClickCell {
                table: 0,
                cell: Cell::new(1, 1),
            })
            .unwrap();
        assert_eq!(
            event,
            Some(TableEvent::CardMoved {
                table: 0,
                card: seed(0),
                from: Cell::new(0, 0),
                to: Cell::new(1, 1),
            })
        );
    }
}
