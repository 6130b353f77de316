//! Cross-section clipping.
//!
//! A single half-space plane `normal·P = offset` derived from an axis and an
//! offset. Geometry with `normal·P > offset` is cut away.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::{ClipAxis, CLIP_OFFSET_MAX, CLIP_OFFSET_MIN};

use crate::normalize::MeshSet;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipPlane {
    pub normal: Vec3,
    pub offset: f32,
}

impl ClipPlane {
    pub fn new(normal: Vec3, offset: f32) -> Self {
        Self { normal, offset }
    }

    pub fn from_axis(axis: ClipAxis, offset: f32) -> Self {
        Self::new(Vec3::from(axis.unit()), offset)
    }

    /// Positive on the side that gets cut away
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) - self.offset
    }

    pub fn clips(&self, p: Vec3) -> bool {
        self.signed_distance(p) > 0.0
    }

    /// (a, b, c, d) with a·x + b·y + c·z + d = 0, as the shader takes it
    pub fn equation(&self) -> [f32; 4] {
        [self.normal.x, self.normal.y, self.normal.z, -self.offset]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipState {
    pub axis: ClipAxis,
    pub offset: f32,
    pub enabled: bool,
}

impl Default for ClipState {
    fn default() -> Self {
        Self {
            axis: ClipAxis::X,
            offset: 0.0,
            enabled: false,
        }
    }
}

/// Clamp into the slider range. NaN yields `None`.
pub fn clamp_offset(offset: f32) -> Option<f32> {
    if offset.is_nan() {
        None
    } else {
        Some(offset.clamp(CLIP_OFFSET_MIN, CLIP_OFFSET_MAX))
    }
}

/// Owns the clip state and pushes it onto every record on each change
#[derive(Default)]
pub struct ClippingController {
    state: ClipState,
}

impl ClippingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ClipState {
        self.state
    }

    /// Plane for the current axis and offset, whether or not it is enabled
    pub fn plane(&self) -> ClipPlane {
        ClipPlane::from_axis(self.state.axis, self.state.offset)
    }

    /// Plane as applied to materials: `None` while disabled
    pub fn active_plane(&self) -> Option<ClipPlane> {
        self.state.enabled.then(|| self.plane())
    }

    pub fn set_axis(&mut self, axis: ClipAxis, meshes: &mut MeshSet) {
        self.state.axis = axis;
        self.apply(meshes);
    }

    /// Returns the stored offset. Out-of-range input is clamped; NaN is ignored.
    pub fn set_offset(&mut self, offset: f32, meshes: &mut MeshSet) -> f32 {
        match clamp_offset(offset) {
            Some(o) => {
                self.state.offset = o;
                self.apply(meshes);
            }
            None => tracing::warn!("Ignoring NaN clip offset"),
        }
        self.state.offset
    }

    pub fn set_enabled(&mut self, enabled: bool, meshes: &mut MeshSet) {
        self.state.enabled = enabled;
        self.apply(meshes);
    }

    /// Push the current plane (or its absence) onto every record in one pass
    pub fn apply(&self, meshes: &mut MeshSet) {
        meshes.set_clip_plane(self.active_plane());
    }
}
