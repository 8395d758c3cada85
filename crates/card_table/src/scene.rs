use crate::table::TableSystems;
use bevy::prelude::*;
use std::collections::HashSet;
use std::f32::consts::FRAC_PI_2;
use table_core::grid::{CARD_HEIGHT, CARD_WIDTH};
use table_core::layout::{GRID_HEIGHT, TABLE_SIZE, TABLE_THICKNESS};
use table_core::{CardId, Cell, HoveredCells, LOG_TABLE, SelectionSettings, TableLayout, TableStore};

const CARD_THICKNESS: f32 = 0.01;
const GRID_COLOR: Color = Color::srgb(0.435, 0.435, 0.435);
const HOVER_COLOR: Color = Color::srgba(1.0, 1.0, 0.0, 0.3);
/// Hover outline relative to the cell size.
const HOVER_SCALE: f32 = 0.92;

/// Scene entity mirroring one card of the store.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct CardVisual {
    pub table: usize,
    pub card: CardId,
}

#[derive(Resource)]
struct CardAssets {
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
    selected: Handle<StandardMaterial>,
}

/// Tables, cards, lights and the grid overlay.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SelectionSettings>()
            .add_systems(Startup, (setup_lighting, setup_tables))
            .add_systems(
                Update,
                (
                    sync_cards.run_if(resource_changed::<TableStore>),
                    apply_selection_theme.run_if(resource_changed::<SelectionSettings>),
                    (draw_grids, draw_hover),
                )
                    .in_set(TableSystems::Sync),
            );
    }
}

/// Card pose on its table: centred in the cell, lying flat on the grid plane.
pub fn card_transform(layout: &TableLayout, table: usize, cell: Cell) -> Option<Transform> {
    let position = layout.card_world_position(table, cell)?;
    let rotation = layout.table_rotation(table)?;
    Some(
        Transform::from_translation(position + Vec3::Y * (CARD_THICKNESS / 2.0))
            .with_rotation(rotation),
    )
}

fn setup_lighting(mut commands: Commands, ambient_light: Option<ResMut<AmbientLight>>) {
    if let Some(mut ambient_light) = ambient_light {
        ambient_light.brightness = 700.0;
        ambient_light.color = Color::WHITE;
    }

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(5.0, 20.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
        Name::new("Main Directional Light"),
    ));
}

fn setup_tables(
    mut commands: Commands,
    layout: Res<TableLayout>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    selection: Res<SelectionSettings>,
) {
    let table_mesh = meshes.add(Cuboid::new(TABLE_SIZE, TABLE_THICKNESS, TABLE_SIZE / 2.0));
    let table_material = materials.add(Color::srgb_u8(0x44, 0x44, 0x44));
    for (index, seat) in layout.seats().iter().enumerate() {
        commands.spawn((
            Mesh3d(table_mesh.clone()),
            MeshMaterial3d(table_material.clone()),
            seat.table_transform(),
            Name::new(format!("Table {}", index + 1)),
        ));
    }

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(80.0, 80.0))),
        MeshMaterial3d(materials.add(Color::srgb_u8(0x22, 0x22, 0x22))),
        Transform::from_xyz(0.0, -TABLE_THICKNESS, 0.0),
        Name::new("Floor"),
    ));

    let palette = selection.theme.palette();
    commands.insert_resource(CardAssets {
        mesh: meshes.add(Cuboid::new(CARD_WIDTH, CARD_THICKNESS, CARD_HEIGHT)),
        material: materials.add(Color::srgb_u8(0xf5, 0xf5, 0xdc)),
        selected: materials.add(StandardMaterial {
            base_color: palette.card_glow_color(),
            emissive: palette.glow_color().to_linear(),
            ..default()
        }),
    });
}

fn sync_cards(
    mut commands: Commands,
    store: Res<TableStore>,
    layout: Res<TableLayout>,
    assets: Option<Res<CardAssets>>,
    mut visuals: Query<(
        Entity,
        &CardVisual,
        &mut Transform,
        &mut MeshMaterial3d<StandardMaterial>,
    )>,
) {
    let Some(assets) = assets else {
        return;
    };
    let material_for = |table: usize, card: &CardId| {
        let selected = store.selected_card(table) == Some(card);
        if selected {
            assets.selected.clone()
        } else {
            assets.material.clone()
        }
    };

    let mut seen = HashSet::new();
    for (entity, visual, mut transform, mut material) in &mut visuals {
        let card = store
            .table(visual.table)
            .and_then(|table| table.card(&visual.card));
        let Some(card) = card else {
            commands.entity(entity).despawn();
            continue;
        };
        if let Some(target) = card_transform(&layout, visual.table, card.cell()) {
            transform.set_if_neq(target);
        }
        material.0 = material_for(visual.table, &visual.card);
        seen.insert((visual.table, visual.card.clone()));
    }

    for (index, table) in store.tables().iter().enumerate() {
        for card in table.cards() {
            if seen.contains(&(index, card.id().clone())) {
                continue;
            }
            let Some(transform) = card_transform(&layout, index, card.cell()) else {
                continue;
            };
            debug!(target: LOG_TABLE, table = index, card = %card.id(), "spawning card");
            commands.spawn((
                CardVisual {
                    table: index,
                    card: card.id().clone(),
                },
                Mesh3d(assets.mesh.clone()),
                MeshMaterial3d(material_for(index, card.id())),
                transform,
                Name::new(format!("Card {}", card.id())),
            ));
        }
    }
}

fn apply_selection_theme(
    selection: Res<SelectionSettings>,
    assets: Option<Res<CardAssets>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(assets) = assets else {
        return;
    };
    let palette = selection.theme.palette();
    if let Some(material) = materials.get_mut(&assets.selected) {
        material.base_color = palette.card_glow_color();
        material.emissive = palette.glow_color().to_linear();
    }
}

fn draw_grids(mut gizmos: Gizmos, layout: Res<TableLayout>) {
    let lines = layout.grid().lines();
    for table in 0..layout.seat_count() {
        for line in &lines {
            let start = layout.table_to_world(table, line.start, GRID_HEIGHT);
            let end = layout.table_to_world(table, line.end, GRID_HEIGHT);
            if let (Some(start), Some(end)) = (start, end) {
                gizmos.line(start, end, GRID_COLOR);
            }
        }
    }
}

fn draw_hover(mut gizmos: Gizmos, layout: Res<TableLayout>, hover: Res<HoveredCells>) {
    let grid = layout.grid();
    let size = Vec2::new(grid.cell_width(), grid.cell_height()) * HOVER_SCALE;
    for (table, cell) in hover.iter() {
        let (Some(center), Some(rotation)) = (
            layout.card_world_position(table, cell),
            layout.table_rotation(table),
        ) else {
            continue;
        };
        // Rechteck liegt in der XY-Ebene, auf die Tischebene kippen.
        let isometry = Isometry3d::new(
            center + Vec3::Y * 0.01,
            rotation * Quat::from_rotation_x(FRAC_PI_2),
        );
        gizmos.rect(isometry, size, HOVER_COLOR);
    }
}
