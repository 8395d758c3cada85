//! State of the per-card context menu.

use crate::card::CardId;
use crate::store::{TableCommand, TableStore};
use bevy::prelude::*;

/// Distance kept between the menu and the viewport edge when it would overflow.
pub const VIEWPORT_MARGIN: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuTarget {
    pub table: usize,
    pub card: CardId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItemKind {
    Select,
    Deselect,
    ZoomTo,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemVariant {
    #[default]
    Default,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub kind: MenuItemKind,
    pub label: &'static str,
    pub enabled: bool,
    pub variant: ItemVariant,
}

impl MenuItem {
    fn new(kind: MenuItemKind, label: &'static str) -> Self {
        Self {
            kind,
            label,
            enabled: true,
            variant: ItemVariant::Default,
        }
    }

    fn danger(mut self) -> Self {
        self.variant = ItemVariant::Danger;
        self
    }

    fn enabled_if(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// What activating a menu item asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextAction {
    Table(TableCommand),
    ZoomTo(MenuTarget),
}

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct ContextMenu {
    open: bool,
    position: Vec2,
    target: Option<MenuTarget>,
    /// Camera items stay disabled until the running camera transition settles.
    camera_moving: bool,
}

impl ContextMenu {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Screen position of the menu's top-left corner.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn target(&self) -> Option<&MenuTarget> {
        self.target.as_ref()
    }

    pub fn camera_moving(&self) -> bool {
        self.camera_moving
    }

    /// Returns `true` if the flag changed.
    pub fn set_camera_moving(&mut self, moving: bool) -> bool {
        let changed = self.camera_moving != moving;
        self.camera_moving = moving;
        changed
    }

    pub fn open_at(&mut self, position: Vec2, table: usize, card: CardId) {
        self.open = true;
        self.position = position;
        self.target = Some(MenuTarget { table, card });
    }

    pub fn close(&mut self) {
        self.open = false;
        self.target = None;
    }

    /// Shifts the menu back inside `viewport` if it would overflow the right or bottom edge.
    pub fn clamp_to_viewport(&mut self, menu_size: Vec2, viewport: Vec2) -> Vec2 {
        let mut position = self.position;
        if position.x + menu_size.x > viewport.x {
            position.x = viewport.x - menu_size.x - VIEWPORT_MARGIN;
        }
        if position.y + menu_size.y > viewport.y {
            position.y = viewport.y - menu_size.y - VIEWPORT_MARGIN;
        }
        self.position = position.max(Vec2::ZERO);
        self.position
    }

    /// Items for the current target. Empty when closed or the card is gone.
    pub fn items(&self, store: &TableStore) -> Vec<MenuItem> {
        if !self.open {
            return Vec::new();
        }
        let Some(target) = self.target.as_ref() else {
            return Vec::new();
        };
        let Some(table) = store.table(target.table) else {
            return Vec::new();
        };
        if !table.contains(&target.card) {
            return Vec::new();
        }

        let toggle = if table.is_selected(&target.card) {
            MenuItem::new(MenuItemKind::Deselect, "Deselect")
        } else {
            MenuItem::new(MenuItemKind::Select, "Select")
        };
        vec![
            toggle,
            MenuItem::new(MenuItemKind::ZoomTo, "Zoom to card").enabled_if(!self.camera_moving),
            MenuItem::new(MenuItemKind::Remove, "Remove card").danger(),
        ]
    }

    /// Runs the item at `index` and closes the menu. Disabled or missing items do nothing.
    pub fn activate(&mut self, index: usize, store: &TableStore) -> Option<ContextAction> {
        let item = self.items(store).into_iter().nth(index)?;
        if !item.enabled {
            return None;
        }
        let target = self.target.take()?;
        self.close();

        let MenuTarget { table, card } = target;
        Some(match item.kind {
            MenuItemKind::Select => ContextAction::Table(TableCommand::SelectCard { table, card }),
            MenuItemKind::Deselect => ContextAction::Table(TableCommand::DeselectCard { table }),
            MenuItemKind::Remove => ContextAction::Table(TableCommand::RemoveCard { table, card }),
            MenuItemKind::ZoomTo => ContextAction::ZoomTo(MenuTarget { table, card }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridLayout;

    fn seed() -> CardId {
        CardId::generated(0, 1)
    }

    #[test]
    fn items_follow_selection_state() {
        let mut store = TableStore::new(1, GridLayout::default());
        let mut menu = ContextMenu::default();
        assert!(menu.items(&store).is_empty());

        menu.open_at(Vec2::new(5.0, 5.0), 0, seed());
        let kinds: Vec<_> = menu.items(&store).iter().map(|item| item.kind).collect();
        assert_eq!(kinds, [MenuItemKind::Select, MenuItemKind::ZoomTo, MenuItemKind::Remove]);

        store.select_card(0, &seed()).unwrap();
        let items = menu.items(&store);
        assert_eq!(items[0].kind, MenuItemKind::Deselect);
        assert_eq!(items[2].variant, ItemVariant::Danger);
    }

    #[test]
    fn activate_closes_menu() {
        let store = TableStore::new(1, GridLayout::default());
        let mut menu = ContextMenu::default();
        menu.open_at(Vec2::ZERO, 0, seed());
        let action = menu.activate(2, &store);
        assert_eq!(
            action,
            Some(ContextAction::Table(TableCommand::RemoveCard {
                table: 0,
                card: seed()
            }))
        );
        assert!(!menu.is_open());
        assert_eq!(menu.activate(0, &store), None);
    }

    #[test]
    fn zoom_waits_for_camera() {
        let store = TableStore::new(1, GridLayout::default());
        let mut menu = ContextMenu::default();
        assert!(menu.set_camera_moving(true));
        assert!(!menu.set_camera_moving(true));
        menu.open_at(Vec2::ZERO, 0, seed());

        let items = menu.items(&store);
        assert!(!items[1].enabled);
        assert!(items[0].enabled && items[2].enabled);
        assert_eq!(menu.activate(1, &store), None);
        assert!(menu.is_open());

        menu.set_camera_moving(false);
        assert_eq!(
            menu.activate(1, &store),
            Some(ContextAction::ZoomTo(MenuTarget {
                table: 0,
                card: seed()
            }))
        );
    }

    #[test]
    fn missing_card_has_no_items() {
        let store = TableStore::new(1, GridLayout::default());
        let mut menu = ContextMenu::default();
        menu.open_at(Vec2::ZERO, 0, CardId::new("gone"));
        assert!(menu.items(&store).is_empty());
        assert_eq!(menu.activate(0, &store), None);
    }

    #[test]
    fn overflowing_menu_is_pulled_inside() {
        let mut menu = ContextMenu::default();
        menu.open_at(Vec2::new(790.0, 100.0), 0, seed());
        let position = menu.clamp_to_viewport(Vec2::new(200.0, 120.0), Vec2::new(800.0, 600.0));
        assert_eq!(position, Vec2::new(590.0, 100.0));

        menu.open_at(Vec2::new(50.0, 580.0), 0, seed());
        let position = menu.clamp_to_viewport(Vec2::new(200.0, 120.0), Vec2::new(800.0, 600.0));
        assert_eq!(position, Vec2::new(50.0, 470.0));
    }
}
