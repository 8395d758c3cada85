//! Exponentially smoothed camera pose.
//!
//! Each frame the current pose closes a fixed fraction of the distance to the
//! desired pose. There is no duration and no easing curve: re-targeting simply
//! overwrites the desired values and the next step heads for them.

use crate::LOG_CAMERA;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::warn;

pub const DEFAULT_SMOOTHING: f32 = 0.08;
pub const DEFAULT_ARRIVAL_EPSILON: f32 = 1e-3;

/// Named look-at target plus field of view.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum CameraPreset {
    /// Blick schräg nach unten auf den eigenen Tisch.
    #[default]
    LookAtTable,
    /// Blick in die Raummitte.
    LookAtCenter,
}

impl CameraPreset {
    pub fn look_at(self) -> Vec3 {
        match self {
            Self::LookAtTable => Vec3::new(0.0, -20.0, 0.0),
            Self::LookAtCenter => Vec3::ZERO,
        }
    }

    /// Vertical field of view in degrees.
    pub fn fov(self) -> f32 {
        match self {
            Self::LookAtTable => 65.0,
            Self::LookAtCenter => 75.0,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::LookAtTable => Self::LookAtCenter,
            Self::LookAtCenter => Self::LookAtTable,
        }
    }
}

/// Position, look-at point and vertical fov (degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
    pub fov: f32,
}

impl CameraPose {
    pub fn new(position: Vec3, look_at: Vec3, fov: f32) -> Self {
        Self {
            position,
            look_at,
            fov,
        }
    }

    /// `self + (target - self) * alpha`, component-wise.
    pub fn lerp(&self, target: &Self, alpha: f32) -> Self {
        Self {
            position: self.position + (target.position - self.position) * alpha,
            look_at: self.look_at + (target.look_at - self.look_at) * alpha,
            fov: self.fov + (target.fov - self.fov) * alpha,
        }
    }

    /// Largest per-component distance to `other`.
    pub fn max_delta(&self, other: &Self) -> f32 {
        let position = (self.position - other.position).abs().max_element();
        let look_at = (self.look_at - other.look_at).abs().max_element();
        position.max(look_at).max((self.fov - other.fov).abs())
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.look_at.is_finite() && self.fov.is_finite()
    }

    /// Transform at `position` facing `look_at`.
    pub fn transform(&self) -> Transform {
        let transform = Transform::from_translation(self.position);
        if (self.look_at - self.position).length_squared() <= f32::EPSILON {
            return transform;
        }
        transform.looking_at(self.look_at, Vec3::Y)
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CameraRig {
    current: CameraPose,
    desired: CameraPose,
    preset: CameraPreset,
    look_at_override: Option<Vec3>,
    smoothing: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(Vec3::ZERO, CameraPreset::default(), DEFAULT_SMOOTHING)
    }
}

impl CameraRig {
    /// Starts at rest at `position` with the look-at and fov of `preset`.
    ///
    /// `smoothing` is clamped into `(0, 1]`; non-finite values fall back to the default.
    pub fn new(position: Vec3, preset: CameraPreset, smoothing: f32) -> Self {
        let smoothing = if smoothing.is_finite() {
            smoothing.clamp(f32::EPSILON, 1.0)
        } else {
            warn!(target: LOG_CAMERA, smoothing, "ignoring non-finite smoothing");
            DEFAULT_SMOOTHING
        };
        let position = if position.is_finite() {
            position
        } else {
            Vec3::ZERO
        };
        let pose = CameraPose::new(position, preset.look_at(), preset.fov());
        Self {
            current: pose,
            desired: pose,
            preset,
            look_at_override: None,
            smoothing,
        }
    }

    pub fn current(&self) -> &CameraPose {
        &self.current
    }

    pub fn desired(&self) -> &CameraPose {
        &self.desired
    }

    pub fn preset(&self) -> CameraPreset {
        self.preset
    }

    pub fn look_at_override(&self) -> Option<Vec3> {
        self.look_at_override
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Advances the current pose one frame toward the desired pose.
    pub fn step(&mut self) -> &CameraPose {
        self.current = self.current.lerp(&self.desired, self.smoothing);
        &self.current
    }

    pub fn set_desired_position(&mut self, position: Vec3) {
        if !position.is_finite() {
            warn!(target: LOG_CAMERA, ?position, "ignoring non-finite camera position");
            return;
        }
        self.desired.position = position;
    }

    /// Overrides the look-at point; `None` falls back to the preset's.
    pub fn set_desired_look_at(&mut self, look_at: Option<Vec3>) {
        if let Some(point) = look_at
            && !point.is_finite()
        {
            warn!(target: LOG_CAMERA, ?point, "ignoring non-finite look-at");
            return;
        }
        self.look_at_override = look_at;
        self.desired.look_at = look_at.unwrap_or_else(|| self.preset.look_at());
    }

    pub fn set_desired_fov(&mut self, fov: f32) {
        if !fov.is_finite() || fov <= 0.0 {
            warn!(target: LOG_CAMERA, fov, "ignoring invalid fov");
            return;
        }
        self.desired.fov = fov;
    }

    /// Switches preset; retargets fov, and look-at unless overridden.
    pub fn set_preset(&mut self, preset: CameraPreset) {
        self.preset = preset;
        self.desired.fov = preset.fov();
        if self.look_at_override.is_none() {
            self.desired.look_at = preset.look_at();
        }
    }

    pub fn toggle_preset(&mut self) -> CameraPreset {
        self.set_preset(self.preset.toggle());
        self.preset
    }

    /// Jumps to the desired pose without smoothing.
    pub fn snap_to_desired(&mut self) {
        self.current = self.desired;
    }

    pub fn is_settled(&self, epsilon: f32) -> bool {
        self.current.max_delta(&self.desired) <= epsilon
    }
}
