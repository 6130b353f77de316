use glam::{Mat4, Vec2, Vec3, Vec4};

use super::picking::{intersect_meshes, Intersection, Ray};
use crate::normalize::MeshSet;

/// Screen-space pointer position in logical pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Viewport rectangle in the same space as [`ScreenPoint`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Screen → NDC. `None` for a degenerate rect.
    pub fn to_ndc(&self, p: ScreenPoint) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let c = self.center();
        Some(Vec2::new(
            (p.x - c.x) / (self.width * 0.5),
            -(p.y - c.y) / (self.height * 0.5),
        ))
    }
}

/// "Cast a ray from normalized device coordinates and return sorted intersections"
pub trait RayCaster {
    fn cast(&self, ndc: Vec2, aspect: f32) -> Ray;

    /// Hits on pickable meshes, nearest first
    fn intersections(&self, ndc: Vec2, aspect: f32, meshes: &MeshSet) -> Vec<Intersection> {
        intersect_meshes(&self.cast(ndc, aspect), meshes)
    }
}

/// Camera pose snapshot
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
}

/// Orbit controller capability the viewer is handed
pub trait CameraController {
    /// Back to the default pose
    fn reset(&mut self);
    fn pose(&self) -> CameraPose;
}

const DEFAULT_DISTANCE: f32 = 5.0;
const DEFAULT_FOV_DEG: f32 = 75.0;
pub const DEFAULT_DAMPING: f32 = 0.05;

/// Arc-ball camera for 3D viewport
pub struct ArcBallCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
    /// Fraction of the pending rotation applied per tick; 0 applies it at once
    pub damping: f32,
    pending_yaw: f32,
    pending_pitch: f32,
}

impl Default for ArcBallCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl ArcBallCamera {
    /// Looking at the origin from (0, 0, 5)
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: DEFAULT_DISTANCE,
            target: Vec3::ZERO,
            fov: DEFAULT_FOV_DEG.to_radians(),
            damping: DEFAULT_DAMPING,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
        }
    }

    pub fn with_damping(damping: f32) -> Self {
        Self {
            damping: damping.clamp(0.0, 1.0),
            ..Self::new()
        }
    }

    /// Queue a rotation in degrees. Applied gradually by [`tick`](Self::tick).
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        if self.damping <= 0.0 {
            self.apply_rotation(dx.to_radians(), dy.to_radians());
        } else {
            self.pending_yaw += dx.to_radians();
            self.pending_pitch += dy.to_radians();
        }
    }

    /// Advance damped rotation by one frame. Returns true while still moving.
    pub fn tick(&mut self) -> bool {
        if self.damping <= 0.0 {
            return false;
        }
        // Apply a slice, keep the rest for the next frame
        let dy = self.pending_yaw * self.damping;
        let dp = self.pending_pitch * self.damping;
        self.apply_rotation(dy, dp);
        self.pending_yaw -= dy;
        self.pending_pitch -= dp;

        if self.pending_yaw.abs() < 1e-5 && self.pending_pitch.abs() < 1e-5 {
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
            return false;
        }
        true
    }

    fn apply_rotation(&mut self, dyaw: f32, dpitch: f32) {
        self.yaw += dyaw;
        self.pitch = (self.pitch + dpitch).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta)).clamp(0.5, 100.0);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let right = self.right_vector();
        let up = self.up_vector();
        let offset = right * dx + up * dy;
        self.target += offset;
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let cy = self.yaw.cos();
        let sy = self.yaw.sin();
        let cp = self.pitch.cos();
        let sp = self.pitch.sin();

        self.target
            + Vec3::new(
                self.distance * cp * sy,
                self.distance * sp,
                self.distance * cp * cy,
            )
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, aspect, 0.1, 200.0)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    fn right_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        fwd.cross(Vec3::Y).normalize_or_zero()
    }

    fn up_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        let right = self.right_vector();
        right.cross(fwd).normalize_or_zero()
    }

    /// Project a world point to screen coords. `None` behind the camera.
    pub fn project(&self, point: Vec3, rect: ViewportRect) -> Option<ScreenPoint> {
        let p = self.view_projection(rect.aspect()) * point.extend(1.0);
        if p.w <= 0.0 {
            return None;
        }
        let ndc = p.truncate() / p.w;
        let c = rect.center();
        Some(ScreenPoint::new(
            c.x + ndc.x * rect.width * 0.5,
            c.y - ndc.y * rect.height * 0.5,
        ))
    }

    /// Cast a ray from a screen position into the 3D scene
    pub fn screen_ray(&self, point: ScreenPoint, rect: ViewportRect) -> Option<Ray> {
        let ndc = rect.to_ndc(point)?;
        Some(self.cast(ndc, rect.aspect()))
    }
}

impl RayCaster for ArcBallCamera {
    fn cast(&self, ndc: Vec2, aspect: f32) -> Ray {
        // Inverse view-projection
        let vp_inv = self.view_projection(aspect).inverse();

        // Unproject near and far points
        let near_world = vp_inv * Vec4::new(ndc.x, ndc.y, -1.0, 1.0);
        let far_world = vp_inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

        let near = near_world.truncate() / near_world.w;
        let far = far_world.truncate() / far_world.w;

        Ray {
            origin: self.eye_position(),
            direction: (far - near).normalize_or_zero(),
        }
    }
}

impl CameraController for ArcBallCamera {
    fn reset(&mut self) {
        *self = Self::with_damping(self.damping);
    }

    fn pose(&self) -> CameraPose {
        CameraPose {
            eye: self.eye_position(),
            target: self.target,
            fov: self.fov,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pose() {
        let cam = ArcBallCamera::new();
        let pose = cam.pose();
        assert!((pose.eye - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
        assert_eq!(pose.target, Vec3::ZERO);
        assert!((pose.fov.to_degrees() - 75.0).abs() < 1e-4);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let cam = ArcBallCamera::new();
        let ray = cam.cast(Vec2::ZERO, 1.0);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_screen_to_ndc() {
        let rect = ViewportRect::new(100.0, 50.0, 200.0, 100.0);
        assert_eq!(rect.to_ndc(ScreenPoint::new(200.0, 100.0)), Some(Vec2::ZERO));
        assert_eq!(rect.to_ndc(ScreenPoint::new(300.0, 50.0)), Some(Vec2::new(1.0, 1.0)));
        assert_eq!(rect.to_ndc(ScreenPoint::new(100.0, 150.0)), Some(Vec2::new(-1.0, -1.0)));
        assert!(ViewportRect::new(0.0, 0.0, 0.0, 10.0).to_ndc(ScreenPoint::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_damped_rotation_converges() {
        let mut cam = ArcBallCamera::new();
        cam.rotate(30.0, 0.0);
        assert_eq!(cam.yaw, 0.0);
        let mut frames = 0;
        while cam.tick() {
            frames += 1;
            assert!(frames < 1000);
        }
        assert!((cam.yaw - 30.0_f32.to_radians()).abs() < 1e-3);
    }

    #[test]
    fn test_undamped_rotation_is_immediate() {
        let mut cam = ArcBallCamera::with_damping(0.0);
        cam.rotate(10.0, 5.0);
        assert!((cam.yaw - 10.0_f32.to_radians()).abs() < 1e-6);
        assert!(!cam.tick());
    }

    #[test]
    fn test_reset_restores_default_pose() {
        let mut cam = ArcBallCamera::with_damping(0.1);
        cam.rotate(45.0, 20.0);
        cam.tick();
        cam.zoom(0.5);
        cam.pan(1.0, 1.0);
        cam.reset();
        assert_eq!(cam.pose(), ArcBallCamera::new().pose());
        assert_eq!(cam.damping, 0.1);
        assert!(!cam.tick());
    }

    #[test]
    fn test_project_inverts_screen_ray() {
        let cam = ArcBallCamera::new();
        let rect = ViewportRect::new(0.0, 0.0, 800.0, 600.0);
        let p = cam.project(Vec3::new(1.5, 0.0, 0.0), rect).unwrap();
        assert!(p.x > 400.0);
        assert!((p.y - 300.0).abs() < 1e-3);
        let ray = cam.screen_ray(p, rect).unwrap();
        let t = (0.0 - ray.origin.z) / ray.direction.z;
        assert!((ray.at(t) - Vec3::new(1.5, 0.0, 0.0)).length() < 1e-3);
        assert!(cam.project(Vec3::new(0.0, 0.0, 10.0), rect).is_none());
    }
}
