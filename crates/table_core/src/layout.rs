//! Placement of the tables around the room and of the seat cameras.
//!
//! Tables sit evenly spaced on a circle (a pentagon for five tables), each
//! turned so that its local +Z axis points toward the centre. Table-local
//! coordinates are the XZ plane of that rotated frame, the same plane
//! [`GridLayout`] works in.

use crate::camera::CameraPose;
use crate::grid::{Cell, GridLayout};
use crate::settings::{CameraSettings, TableSettings};
use bevy::prelude::*;
use std::f32::consts::TAU;

/// Height of the grid plane (and of the card faces) above the floor.
pub const GRID_HEIGHT: f32 = 0.1;
/// Edge length of the square-ish table top (X); depth is half of it.
pub const TABLE_SIZE: f32 = 15.0;
pub const TABLE_THICKNESS: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seat {
    pub table_position: Vec3,
    /// Rotation about Y in radians.
    pub yaw: f32,
    pub camera_position: Vec3,
}

impl Seat {
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    pub fn table_transform(&self) -> Transform {
        Transform::from_translation(self.table_position).with_rotation(self.rotation())
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TableLayout {
    seats: Vec<Seat>,
    grid: GridLayout,
    zoom_height: f32,
    zoom_fov: f32,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self::from_settings(&TableSettings::default(), &CameraSettings::default())
    }
}

impl TableLayout {
    pub fn from_settings(table: &TableSettings, camera: &CameraSettings) -> Self {
        let count = table.table_count;
        let seats = (0..count)
            .map(|index| {
                let angle = TAU * index as f32 / count as f32;
                let (sin, cos) = angle.sin_cos();
                let table_position = Vec3::new(cos * table.table_radius, 0.0, sin * table.table_radius);
                Seat {
                    table_position,
                    yaw: (-table_position.x).atan2(-table_position.z),
                    camera_position: Vec3::new(
                        cos * camera.camera_radius,
                        camera.camera_height,
                        sin * camera.camera_radius,
                    ),
                }
            })
            .collect();
        Self {
            seats,
            grid: table.grid(),
            zoom_height: camera.zoom_height,
            zoom_fov: camera.zoom_fov,
        }
    }

    pub fn grid(&self) -> &GridLayout {
        &self.grid
    }

    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, table: usize) -> Option<&Seat> {
        self.seats.get(table)
    }

    pub fn table_position(&self, table: usize) -> Option<Vec3> {
        self.seat(table).map(|seat| seat.table_position)
    }

    pub fn table_rotation(&self, table: usize) -> Option<Quat> {
        self.seat(table).map(Seat::rotation)
    }

    pub fn camera_position(&self, table: usize) -> Option<Vec3> {
        self.seat(table).map(|seat| seat.camera_position)
    }

    /// Projects a world point into the table's local XZ plane.
    pub fn world_to_table(&self, table: usize, world: Vec3) -> Option<Vec2> {
        let seat = self.seat(table)?;
        let local = seat.rotation().inverse() * (world - seat.table_position);
        Some(Vec2::new(local.x, local.z))
    }

    /// Lifts a table-local XZ point back into the world at `height`.
    pub fn table_to_world(&self, table: usize, local: Vec2, height: f32) -> Option<Vec3> {
        let seat = self.seat(table)?;
        Some(seat.table_position + seat.rotation() * Vec3::new(local.x, height, local.y))
    }

    /// World-space centre of a grid cell, on the grid plane.
    pub fn card_world_position(&self, table: usize, cell: Cell) -> Option<Vec3> {
        self.table_to_world(table, self.grid.cell_center(cell), GRID_HEIGHT)
    }

    /// First table whose grid contains the world point, with the cell hit.
    pub fn cell_at_world(&self, world: Vec3) -> Option<(usize, Cell)> {
        (0..self.seats.len()).find_map(|table| {
            let local = self.world_to_table(table, world)?;
            self.grid.cell_at(local).map(|cell| (table, cell))
        })
    }

    /// Pose that looks down at a card from above its seat side.
    pub fn zoom_pose(&self, table: usize, cell: Cell) -> Option<CameraPose> {
        let seat = self.seat(table)?;
        let card = self.card_world_position(table, cell)?;
        let toward_seat = Vec3::new(
            seat.camera_position.x - card.x,
            0.0,
            seat.camera_position.z - card.z,
        )
        .normalize_or_zero();
        let position = card + toward_seat * (self.zoom_height * 0.5) + Vec3::Y * self.zoom_height;
        Some(CameraPose::new(position, card, self.zoom_fov))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{a} != {b}");
    }

    #[test]
    fn five_tables_form_a_pentagon() {
        let layout = TableLayout::default();
        assert_eq!(layout.seat_count(), 5);
        assert_close(layout.table_position(0).unwrap(), Vec3::new(10.0, 0.0, 0.0));
        let second = 72.0_f32.to_radians();
        assert_close(
            layout.table_position(1).unwrap(),
            Vec3::new(second.cos() * 10.0, 0.0, second.sin() * 10.0),
        );
        assert_close(layout.camera_position(0).unwrap(), Vec3::new(13.0, 8.0, 0.0));
    }

    #[test]
    fn tables_face_the_centre() {
        let layout = TableLayout::default();
        for seat in layout.seats() {
            let forward = seat.rotation() * Vec3::Z;
            let to_centre = (-seat.table_position).normalize();
            assert!(forward.dot(to_centre) > 0.999);
        }
    }

    #[test]
    fn local_world_round_trip() {
        let layout = TableLayout::default();
        let local = Vec2::new(1.5, -0.75);
        for table in 0..layout.seat_count() {
            let world = layout.table_to_world(table, local, GRID_HEIGHT).unwrap();
            let back = layout.world_to_table(table, world).unwrap();
            assert!((back - local).length() < 1e-4);
        }
        assert_eq!(layout.world_to_table(7, Vec3::ZERO), None);
    }

    #[test]
    fn card_positions_pick_back_to_their_cell() {
        let layout = TableLayout::default();
        for table in 0..layout.seat_count() {
            for cell in layout.grid().cells() {
                let world = layout.card_world_position(table, cell).unwrap();
                assert_eq!(layout.cell_at_world(world), Some((table, cell)));
            }
        }
        assert_eq!(layout.cell_at_world(Vec3::ZERO), None);
    }

    #[test]
    fn zoom_pose_looks_at_the_card() {
        let layout = TableLayout::default();
        let cell = Cell::new(2, 3);
        let pose = layout.zoom_pose(1, cell).unwrap();
        assert_close(pose.look_at, layout.card_world_position(1, cell).unwrap());
        assert!(pose.position.y > pose.look_at.y);
        assert_eq!(pose.fov, CameraSettings::default().zoom_fov);
    }
}
