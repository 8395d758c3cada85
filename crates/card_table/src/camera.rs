use crate::table::TableSystems;
use bevy::prelude::*;
use bevy::transform::TransformSystems;
use table_core::{
    CameraPose, CameraRig, CameraSettings, Cell, LOG_CAMERA, TableLayout, TableSettings,
};

/// Marker for the single scene camera driven by [`CameraRig`].
#[derive(Component)]
pub struct TableCamera;

/// Seat whose camera position the rig heads for.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveSeat(pub usize);

/// Tracks whether the rig is still moving toward a requested pose.
#[derive(Resource, Default)]
pub struct CameraTransitionState {
    pub active: bool,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraRequest {
    NextSeat,
    Seat(usize),
    TogglePreset,
    /// Look down at a card from its seat side.
    ZoomTo { table: usize, cell: Cell },
    /// Back to the active seat with the preset's look-at.
    Reset,
}

/// Sent once when the rig arrives at its desired pose.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct CameraSettled {
    pub pose: CameraPose,
}

pub struct CameraRigPlugin;

impl Plugin for CameraRigPlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<CameraSettings>()
            .cloned()
            .unwrap_or_default();
        if !app.world().contains_resource::<TableLayout>() {
            let table = app
                .world()
                .get_resource::<TableSettings>()
                .cloned()
                .unwrap_or_default();
            app.insert_resource(TableLayout::from_settings(&table, &settings));
        }
        let start = app
            .world()
            .resource::<TableLayout>()
            .camera_position(0)
            .unwrap_or(Vec3::ZERO);

        app.insert_resource(CameraRig::new(
            start,
            settings.initial_preset,
            settings.smoothing,
        ))
        .insert_resource(settings)
        .init_resource::<ActiveSeat>()
        .init_resource::<CameraTransitionState>()
        .add_message::<CameraRequest>()
        .add_message::<CameraSettled>()
        .add_systems(Startup, spawn_camera)
        .add_systems(Update, handle_camera_requests.in_set(TableSystems::Apply))
        .add_systems(
            PostUpdate,
            step_camera_rig.before(TransformSystems::Propagate),
        );
    }
}

fn spawn_camera(mut commands: Commands, rig: Res<CameraRig>) {
    let pose = rig.current();
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: pose.fov.to_radians(),
            ..default()
        }),
        pose.transform(),
        TableCamera,
        Name::new("Table Camera"),
    ));
}

pub(crate) fn handle_camera_requests(
    mut requests: MessageReader<CameraRequest>,
    mut rig: ResMut<CameraRig>,
    mut seat: ResMut<ActiveSeat>,
    mut transition: ResMut<CameraTransitionState>,
    layout: Res<TableLayout>,
) {
    for request in requests.read() {
        match *request {
            CameraRequest::NextSeat => {
                let count = layout.seat_count().max(1);
                let next = (seat.0 + 1) % count;
                move_to_seat(&mut rig, &mut seat, &layout, next);
            }
            CameraRequest::Seat(index) => {
                if index >= layout.seat_count() {
                    warn!(target: LOG_CAMERA, index, "no such seat");
                    continue;
                }
                move_to_seat(&mut rig, &mut seat, &layout, index);
            }
            CameraRequest::TogglePreset => {
                let preset = rig.toggle_preset();
                info!(target: LOG_CAMERA, %preset, "camera preset");
            }
            CameraRequest::ZoomTo { table, cell } => {
                let Some(pose) = layout.zoom_pose(table, cell) else {
                    warn!(target: LOG_CAMERA, table, %cell, "cannot zoom to card");
                    continue;
                };
                rig.set_desired_position(pose.position);
                rig.set_desired_look_at(Some(pose.look_at));
                rig.set_desired_fov(pose.fov);
                debug!(target: LOG_CAMERA, table, %cell, "zoom to card");
            }
            CameraRequest::Reset => {
                let index = seat.0;
                move_to_seat(&mut rig, &mut seat, &layout, index);
            }
        }
        transition.active = true;
    }
}

fn move_to_seat(rig: &mut CameraRig, seat: &mut ActiveSeat, layout: &TableLayout, index: usize) {
    let Some(position) = layout.camera_position(index) else {
        return;
    };
    seat.0 = index;
    rig.set_desired_position(position);
    rig.set_desired_look_at(None);
    rig.set_desired_fov(rig.preset().fov());
    info!(target: LOG_CAMERA, seat = index + 1, "switching seat");
}

fn step_camera_rig(
    mut rig: ResMut<CameraRig>,
    mut transition: ResMut<CameraTransitionState>,
    settings: Res<CameraSettings>,
    mut settled: MessageWriter<CameraSettled>,
    mut cameras: Query<(&mut Transform, &mut Projection), With<TableCamera>>,
) {
    let pose = *rig.step();
    for (mut transform, mut projection) in &mut cameras {
        *transform = pose.transform();
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.fov = pose.fov.to_radians();
        }
    }

    if transition.active && rig.is_settled(settings.arrival_epsilon) {
        transition.active = false;
        settled.write(CameraSettled { pose });
        debug!(target: LOG_CAMERA, position = ?pose.position, "camera settled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TablePlugin;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, TablePlugin, CameraRigPlugin));
        app
    }

    fn camera_translation(app: &mut App) -> Vec3 {
        let mut query = app
            .world_mut()
            .query_filtered::<&Transform, With<TableCamera>>();
        query.single(app.world()).unwrap().translation
    }

    #[test]
    fn test_camera_spawns_at_first_seat() {
        let mut app = app();
        app.update();
        let expected = app.world().resource::<TableLayout>().camera_position(0).unwrap();
        assert!((camera_translation(&mut app) - expected).length() < 1e-4);
    }

    #[test]
    fn test_next_seat_moves_camera_toward_it() {
        let mut app = app();
        app.update();
        let target = app.world().resource::<TableLayout>().camera_position(1).unwrap();
        let before = camera_translation(&mut app).distance(target);

        app.world_mut().write_message(CameraRequest::NextSeat);
        app.update();

        assert_eq!(*app.world().resource::<ActiveSeat>(), ActiveSeat(1));
        assert!(app.world().resource::<CameraTransitionState>().active);
        assert_eq!(app.world().resource::<CameraRig>().desired().position, target);
        let after = camera_translation(&mut app).distance(target);
        assert!(after < before);
    }

    #[test]
    fn test_transition_ends_when_settled() {
        let mut app = app();
        app.update();
        let mut cursor = app
            .world()
            .resource::<Messages<CameraSettled>>()
            .get_cursor();

        app.world_mut().write_message(CameraRequest::TogglePreset);
        app.update();
        assert!(app.world().resource::<CameraTransitionState>().active);
        let messages = app.world().resource::<Messages<CameraSettled>>();
        assert_eq!(cursor.read(messages).count(), 0);

        app.world_mut().resource_mut::<CameraRig>().snap_to_desired();
        app.update();
        assert!(!app.world().resource::<CameraTransitionState>().active);
        let messages = app.world().resource::<Messages<CameraSettled>>();
        let settled: Vec<_> = cursor.read(messages).copied().collect();
        assert_eq!(settled.len(), 1);
        assert_eq!(settled[0].pose, *app.world().resource::<CameraRig>().desired());

        app.update();
        let messages = app.world().resource::<Messages<CameraSettled>>();
        assert_eq!(cursor.read(messages).count(), 0);
    }

    #[test]
    fn test_unknown_seat_is_ignored() {
        let mut app = app();
        app.update();
        app.world_mut().write_message(CameraRequest::Seat(42));
        app.update();
        assert_eq!(*app.world().resource::<ActiveSeat>(), ActiveSeat(0));
    }
}
