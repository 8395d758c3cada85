use crate::camera::{
    CameraRequest, CameraSettled, CameraTransitionState, handle_camera_requests,
};
use crate::table::{TableSystems, apply_table_commands};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use table_core::context_menu::ItemVariant;
use table_core::{ContextAction, ContextMenu, LOG_INPUT, TableCommand, TableStore};

const MENU_WIDTH: f32 = 200.0;
const ITEM_HEIGHT: f32 = 32.0;
const MENU_PADDING: f32 = 4.0;

/// A menu entry was chosen, by click or digit key.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItemChosen(pub usize);

/// Root node of the spawned menu.
#[derive(Component)]
struct MenuRoot;

/// Button of the menu item at this index.
#[derive(Component, Debug, Clone, Copy)]
pub struct MenuButton(pub usize);

pub struct ContextMenuPlugin;

impl Plugin for ContextMenuPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ContextMenu>()
            .add_message::<MenuItemChosen>()
            .add_systems(Update, choose_from_buttons.in_set(TableSystems::Input))
            .add_systems(
                Update,
                apply_menu_choice
                    .in_set(TableSystems::Apply)
                    .before(apply_table_commands)
                    .before(handle_camera_requests),
            )
            .add_systems(
                Update,
                (
                    track_camera_motion,
                    render_menu.run_if(
                        resource_changed::<ContextMenu>.or(resource_changed::<TableStore>),
                    ),
                )
                    .chain()
                    .in_set(TableSystems::Sync),
            );
    }
}

fn choose_from_buttons(
    buttons: Query<(&Interaction, &MenuButton), Changed<Interaction>>,
    mut chosen: MessageWriter<MenuItemChosen>,
) {
    for (interaction, button) in &buttons {
        if *interaction == Interaction::Pressed {
            chosen.write(MenuItemChosen(button.0));
        }
    }
}

fn apply_menu_choice(
    mut chosen: MessageReader<MenuItemChosen>,
    mut menu: ResMut<ContextMenu>,
    store: Res<TableStore>,
    mut table_commands: MessageWriter<TableCommand>,
    mut camera_requests: MessageWriter<CameraRequest>,
) {
    for MenuItemChosen(index) in chosen.read() {
        match menu.activate(*index, &store) {
            Some(ContextAction::Table(command)) => {
                table_commands.write(command);
            }
            Some(ContextAction::ZoomTo(target)) => {
                let cell = store
                    .table(target.table)
                    .and_then(|table| table.card(&target.card))
                    .map(|card| card.cell());
                if let Some(cell) = cell {
                    camera_requests.write(CameraRequest::ZoomTo {
                        table: target.table,
                        cell,
                    });
                }
            }
            None => debug!(target: LOG_INPUT, index, "menu item unavailable"),
        }
    }
}

/// Disables camera items from the start of a transition until [`CameraSettled`].
fn track_camera_motion(
    transition: Res<CameraTransitionState>,
    mut settled: MessageReader<CameraSettled>,
    mut menu: ResMut<ContextMenu>,
) {
    let mut moving = menu.camera_moving();
    if settled.read().count() > 0 {
        moving = false;
    }
    if transition.is_changed() && transition.active {
        moving = true;
    }
    if menu.camera_moving() != moving {
        menu.set_camera_moving(moving);
    }
}

fn render_menu(
    mut commands: Commands,
    mut menu: ResMut<ContextMenu>,
    store: Res<TableStore>,
    roots: Query<Entity, With<MenuRoot>>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    for root in &roots {
        commands.entity(root).despawn();
    }

    let items = menu.items(&store);
    if items.is_empty() {
        return;
    }

    let size = Vec2::new(
        MENU_WIDTH,
        items.len() as f32 * ITEM_HEIGHT + 2.0 * MENU_PADDING,
    );
    let position = match windows.single() {
        Ok(window) => menu
            .bypass_change_detection()
            .clamp_to_viewport(size, Vec2::new(window.width(), window.height())),
        Err(_) => menu.position(),
    };

    commands
        .spawn((
            MenuRoot,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(position.x),
                top: Val::Px(position.y),
                width: Val::Px(size.x),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(MENU_PADDING)),
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.9)),
            BorderColor::all(Color::srgb_u8(0x4b, 0x55, 0x63)),
            GlobalZIndex(50),
            Name::new("Context Menu"),
        ))
        .with_children(|parent| {
            for (index, item) in items.iter().enumerate() {
                let color = match item.variant {
                    ItemVariant::Default => Color::WHITE,
                    ItemVariant::Danger => Color::srgb_u8(0xf8, 0x71, 0x71),
                };
                parent
                    .spawn((
                        Button,
                        MenuButton(index),
                        Node {
                            height: Val::Px(ITEM_HEIGHT),
                            align_items: AlignItems::Center,
                            padding: UiRect::horizontal(Val::Px(12.0)),
                            ..default()
                        },
                    ))
                    .with_child((
                        Text::new(format!("{}  {}", index + 1, item.label)),
                        TextFont::from_font_size(14.0),
                        TextColor(if item.enabled { color } else { color.with_alpha(0.5) }),
                    ));
            }
        });
}
