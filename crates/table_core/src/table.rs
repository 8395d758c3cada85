use crate::card::{Card, CardId};
use crate::grid::Cell;
use serde::{Deserialize, Serialize};

/// One seat's table: its cards and the (at most one) selected card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub(crate) cards: Vec<Card>,
    pub(crate) selected: Option<CardId>,
    #[serde(skip)]
    pub(crate) next_serial: u64,
}

impl Table {
    /// Cards in insertion order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn selected(&self) -> Option<&CardId> {
        self.selected.as_ref()
    }

    pub fn selected_card(&self) -> Option<&Card> {
        self.selected.as_ref().and_then(|id| self.card(id))
    }

    pub fn is_selected(&self, id: &CardId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id() == id)
    }

    pub fn contains(&self, id: &CardId) -> bool {
        self.card(id).is_some()
    }

    pub fn card_at(&self, cell: Cell) -> Option<&Card> {
        self.cards.iter().find(|card| card.cell() == cell)
    }

    /// Card occupying `cell`, ignoring `mover` itself.
    pub fn occupant_other_than(&self, cell: Cell, mover: &CardId) -> Option<&Card> {
        self.cards
            .iter()
            .find(|card| card.cell() == cell && card.id() != mover)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub(crate) fn position(&self, id: &CardId) -> Option<usize> {
        self.cards.iter().position(|card| card.id() == id)
    }
}
