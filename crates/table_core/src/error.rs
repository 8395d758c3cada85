use crate::card::CardId;
use crate::grid::Cell;
use thiserror::Error;

/// Reasons a table command is rejected. A rejected command leaves the store untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("table {table} does not exist ({count} tables)")]
    UnknownTable { table: usize, count: usize },

    #[error("card {card} is not on table {table}")]
    CardNotFound { table: usize, card: CardId },

    #[error("card id {card} is already used on table {table}")]
    DuplicateCardId { table: usize, card: CardId },

    #[error("cell {cell} is outside the {cols}x{rows} grid")]
    CellOutOfBounds { cell: Cell, cols: u32, rows: u32 },

    #[error("cell {cell} on table {table} is occupied by card {occupant}")]
    CellOccupied {
        table: usize,
        cell: Cell,
        occupant: CardId,
    },

    #[error("no card is selected on table {0}")]
    NothingSelected(usize),
}
