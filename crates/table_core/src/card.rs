use crate::grid::Cell;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Texture shown on the back of a card when none is given.
pub const DEFAULT_CARD_BACK: &str = "textures/crypt-background.jpg";
/// Front texture of the card every table starts with.
pub const SEED_CARD_FRONT: &str = "textures/44magnum.jpg";

/// Identifier of a card, unique within its table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id of the `serial`-th generated card of table `table`.
    pub fn generated(table: usize, serial: u64) -> Self {
        Self(format!("table-{table}-card-{serial}"))
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CardId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A card lying on a table grid.
///
/// `front` and `back` are opaque texture identifiers; nothing in the core
/// looks inside them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    pub front: String,
    pub back: String,
    cell: Cell,
}

impl Card {
    pub fn new(id: CardId, front: impl Into<String>, back: Option<String>, cell: Cell) -> Self {
        Self {
            id,
            front: front.into(),
            back: back.unwrap_or_else(|| DEFAULT_CARD_BACK.to_string()),
            cell,
        }
    }

    pub fn id(&self) -> &CardId {
        &self.id
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }

    pub fn row(&self) -> u32 {
        self.cell.row
    }

    pub fn col(&self) -> u32 {
        self.cell.col
    }

    pub(crate) fn with_cell(&self, cell: Cell) -> Self {
        Self {
            cell,
            ..self.clone()
        }
    }
}

/// Payload for adding a card; the id is generated when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewCard {
    #[serde(default)]
    pub id: Option<CardId>,
    pub front: String,
    #[serde(default)]
    pub back: Option<String>,
    pub row: u32,
    pub col: u32,
}

impl NewCard {
    pub fn new(front: impl Into<String>, row: u32, col: u32) -> Self {
        Self {
            front: front.into(),
            row,
            col,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<CardId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_back(mut self, back: impl Into<String>) -> Self {
        self.back = Some(back.into());
        self
    }

    pub fn cell(&self) -> Cell {
        Cell::new(self.row, self.col)
    }
}
