//! Pointer picking and keyboard shortcuts.
//!
//! Picking casts the cursor ray onto the grid plane and asks [`TableLayout`]
//! which table and cell it hit, so a click always lands on the same cell the
//! card is drawn in.

use crate::camera::{ActiveSeat, CameraRequest, TableCamera};
use crate::context_menu::{MenuButton, MenuItemChosen};
use crate::table::TableSystems;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use table_core::layout::GRID_HEIGHT;
use table_core::{
    CardId, Cell, ContextMenu, HoveredCells, LOG_INPUT, SelectionSettings, TableCommand,
    TableLayout, TableStore,
};

/// What the cursor is over this frame.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct PointerTarget {
    pub hit: Option<(usize, Cell)>,
    pub card: Option<CardId>,
    /// Cursor position in window coordinates.
    pub cursor: Option<Vec2>,
}

impl PointerTarget {
    /// Resolves a world point on the grid plane against the layout and store.
    pub fn from_world_point(layout: &TableLayout, store: &TableStore, point: Vec3) -> Self {
        let hit = layout.cell_at_world(point);
        let card = hit.and_then(|(table, cell)| store.card_at(table, cell).map(|c| c.id().clone()));
        Self {
            hit,
            card,
            cursor: None,
        }
    }

    pub fn table(&self) -> Option<usize> {
        self.hit.map(|(table, _)| table)
    }
}

const MENU_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerTarget>()
            .init_resource::<SelectionSettings>()
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<ButtonInput<MouseButton>>()
            .add_systems(
                Update,
                (
                    update_pointer_target,
                    handle_mouse_buttons,
                    handle_keyboard,
                )
                    .chain()
                    .in_set(TableSystems::Input),
            );
    }
}

fn update_pointer_target(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<TableCamera>>,
    layout: Res<TableLayout>,
    store: Res<TableStore>,
    mut pointer: ResMut<PointerTarget>,
    mut hover: ResMut<HoveredCells>,
) {
    let cursor = windows.single().ok().and_then(Window::cursor_position);
    let point = cursor.and_then(|cursor| {
        let (camera, camera_transform) = cameras.single().ok()?;
        let ray = camera.viewport_to_world(camera_transform, cursor).ok()?;
        let distance =
            ray.intersect_plane(Vec3::Y * GRID_HEIGHT, InfinitePlane3d::new(Vec3::Y))?;
        Some(ray.get_point(distance))
    });

    let mut target = point
        .map(|point| PointerTarget::from_world_point(&layout, &store, point))
        .unwrap_or_default();
    target.cursor = cursor;
    pointer.set_if_neq(target);

    // Hover ist flüchtiger UI-Zustand und löst nur bei echter Änderung Change-Detection aus.
    let hit = pointer.hit;
    let cells = hover.bypass_change_detection();
    let mut changed = cells.clear_others(hit.map(|(table, _)| table));
    if let Some((table, cell)) = hit {
        changed |= cells.set(table, Some(cell));
    }
    if changed {
        hover.set_changed();
    }
}

fn handle_mouse_buttons(
    mouse: Res<ButtonInput<MouseButton>>,
    pointer: Res<PointerTarget>,
    mut menu: ResMut<ContextMenu>,
    menu_buttons: Query<&Interaction, With<MenuButton>>,
    mut commands: MessageWriter<TableCommand>,
) {
    if mouse.just_pressed(MouseButton::Left) {
        if menu.is_open() {
            let over_menu = menu_buttons
                .iter()
                .any(|interaction| *interaction != Interaction::None);
            if !over_menu {
                menu.close();
            }
            return;
        }
        match (&pointer.hit, &pointer.card) {
            (Some((table, _)), Some(card)) => {
                commands.write(TableCommand::ClickCard {
                    table: *table,
                    card: card.clone(),
                });
            }
            (Some((table, cell)), None) => {
                commands.write(TableCommand::ClickCell {
                    table: *table,
                    cell: *cell,
                });
            }
            _ => {}
        }
    }

    if mouse.just_pressed(MouseButton::Right) {
        match (pointer.table(), &pointer.card, pointer.cursor) {
            (Some(table), Some(card), Some(cursor)) => {
                debug!(target: LOG_INPUT, table, %card, "open context menu");
                menu.open_at(cursor, table, card.clone());
            }
            _ => menu.close(),
        }
    }
}

fn handle_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    seat: Res<ActiveSeat>,
    store: Res<TableStore>,
    mut menu: ResMut<ContextMenu>,
    mut selection: ResMut<SelectionSettings>,
    mut camera_requests: MessageWriter<CameraRequest>,
    mut table_commands: MessageWriter<TableCommand>,
    mut chosen: MessageWriter<MenuItemChosen>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        camera_requests.write(CameraRequest::NextSeat);
    }
    if keys.just_pressed(KeyCode::KeyC) {
        camera_requests.write(CameraRequest::TogglePreset);
    }
    if keys.just_pressed(KeyCode::KeyR) {
        camera_requests.write(CameraRequest::Reset);
    }
    if keys.just_pressed(KeyCode::KeyZ) {
        let selected = store
            .table(seat.0)
            .and_then(|table| table.selected_card())
            .map(|card| card.cell());
        match selected {
            Some(cell) => {
                camera_requests.write(CameraRequest::ZoomTo {
                    table: seat.0,
                    cell,
                });
            }
            None => debug!(target: LOG_INPUT, seat = seat.0, "nothing selected to zoom to"),
        }
    }
    if keys.just_pressed(KeyCode::KeyT) {
        selection.theme = selection.theme.next();
        info!(target: LOG_INPUT, theme = %selection.theme, "selection theme");
    }
    if keys.just_pressed(KeyCode::Escape) {
        if menu.is_open() {
            menu.close();
        } else {
            table_commands.write(TableCommand::DeselectCard { table: seat.0 });
        }
    }
    if menu.is_open() {
        for (index, key) in MENU_KEYS.iter().enumerate() {
            if keys.just_pressed(*key) {
                chosen.write(MenuItemChosen(index));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraRigPlugin;
    use crate::context_menu::ContextMenuPlugin;
    use crate::table::TablePlugin;
    use table_core::SelectionTheme;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            TablePlugin,
            CameraRigPlugin,
            ContextMenuPlugin,
            InputPlugin,
        ));
        app.update();
        app
    }

    fn press(app: &mut App, key: KeyCode) {
        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.release_all();
        keys.clear();
        keys.press(key);
    }

    #[test]
    fn test_world_point_resolves_card() {
        let layout = TableLayout::default();
        let store = TableStore::default();
        let point = layout.card_world_position(2, Cell::new(0, 0)).unwrap();
        let target = PointerTarget::from_world_point(&layout, &store, point);
        assert_eq!(target.hit, Some((2, Cell::new(0, 0))));
        assert_eq!(target.card, Some(CardId::generated(2, 1)));

        let empty = layout.card_world_position(2, Cell::new(1, 0)).unwrap();
        let target = PointerTarget::from_world_point(&layout, &store, empty);
        assert_eq!(target.card, None);
        assert_eq!(PointerTarget::from_world_point(&layout, &store, Vec3::ZERO).hit, None);
    }

    #[test]
    fn test_tab_switches_seat() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        app.update();
        assert_eq!(*app.world().resource::<ActiveSeat>(), ActiveSeat(1));
    }

    #[test]
    fn test_theme_key_cycles_theme() {
        let mut app = app();
        press(&mut app, KeyCode::KeyT);
        app.update();
        assert_eq!(
            app.world().resource::<SelectionSettings>().theme,
            SelectionTheme::Blood.next()
        );
    }

    #[test]
    fn test_escape_deselects_on_active_table() {
        let mut app = app();
        app.world_mut().write_message(TableCommand::SelectCard {
            table: 0,
            card: CardId::generated(0, 1),
        });
        app.update();
        assert!(app.world().resource::<TableStore>().selected_card(0).is_some());

        press(&mut app, KeyCode::Escape);
        app.update();
        assert!(app.world().resource::<TableStore>().selected_card(0).is_none());
    }

    #[test]
    fn test_left_click_on_card_selects_it() {
        let mut app = app();
        app.insert_resource(PointerTarget {
            hit: Some((0, Cell::new(0, 0))),
            card: Some(CardId::generated(0, 1)),
            cursor: None,
        });
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        // Ohne Fenster überschreibt die Picking-Abfrage das Ziel, daher direkt auswerten.
        app.world_mut()
            .run_system_cached(handle_mouse_buttons)
            .unwrap();
        app.update();
        assert_eq!(
            app.world().resource::<TableStore>().selected_card(0),
            Some(&CardId::generated(0, 1))
        );
    }
}
