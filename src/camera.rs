use glam::{Mat4, Quat, Vec2, Vec3};

const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 50.0;

/// Perspective camera that orbits a fixed target.
///
/// Drag input yaws the camera around world up and pitches it around the
/// camera-right axis; the wheel dollies toward or away from the target. The
/// view-projection matrix is cached behind a dirty flag, so any out-of-band
/// mutation of the pose must go through [`OrbitCamera::mark_dirty`].
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    position: Vec3,
    target: Vec3,
    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
    view_proj: Mat4,
    dirty: bool,
}

impl OrbitCamera {
    /// Camera on the +Z axis at `distance` from the origin, looking at it.
    pub fn new(distance: f32, fov: f32, aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, distance),
            target: Vec3::ZERO,
            fov,
            aspect,
            near: 0.1,
            far: 1000.0,
            view_proj: Mat4::IDENTITY,
            dirty: true,
        }
    }

    /// Updates the aspect ratio from viewport dimensions. The ratio is the
    /// exact quotient width/height; a zero height leaves the camera untouched.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        self.dirty = true;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).length()
    }

    /// Orbits around the target: yaw around world +Y, then pitch around the
    /// camera-right axis, refusing moves that would flip over the poles.
    pub fn orbit(&mut self, delta: Vec2) {
        let world_up = Vec3::Y;
        let mut offset = self.position - self.target;
        if offset.length_squared() < 1e-9 {
            offset = Vec3::Z;
        }

        let yaw_rot = Quat::from_axis_angle(world_up, -delta.x);
        offset = yaw_rot * offset;

        let forward = (-offset).normalize_or_zero();
        let right = forward.cross(world_up).normalize_or_zero();
        if right.length_squared() > 1e-9 {
            let pitch_rot = Quat::from_axis_angle(right, -delta.y);
            let candidate = pitch_rot * offset;
            if candidate.normalize_or_zero().dot(world_up).abs() < 0.995 {
                offset = candidate;
            }
        }

        self.position = self.target + offset;
        self.dirty = true;
    }

    /// Dollies along the view direction; positive scroll moves closer.
    pub fn dolly(&mut self, scroll: f32) {
        let offset = self.position - self.target;
        let distance = offset.length();
        if !distance.is_finite() || distance < 1e-4 {
            return;
        }
        let factor = (1.0 - scroll * 0.1).clamp(0.2, 5.0);
        let new_distance = (distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.position = self.target + offset / distance * new_distance;
        self.dirty = true;
    }

    /// Flags the cached matrix as stale after a manual pose change.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns the view-projection matrix, recomputing it if stale.
    pub fn view_proj(&mut self) -> Mat4 {
        if self.dirty {
            let view = Mat4::look_at_rh(self.position, self.target, Vec3::Y);
            let projection =
                Mat4::perspective_rh(self.fov.to_radians(), self.aspect.max(0.01), self.near, self.far);
            self.view_proj = projection * view;
            self.dirty = false;
        }
        self.view_proj
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(6.0, 45.0, 1024.0 / 768.0)
    }

    #[test]
    fn aspect_is_the_exact_quotient() {
        let mut cam = camera();
        cam.set_aspect(1024, 768);
        assert_eq!(cam.aspect(), 1024.0 / 768.0);
        cam.set_aspect(800, 600);
        assert_eq!(cam.aspect(), 800.0 / 600.0);
    }

    #[test]
    fn zero_height_is_ignored() {
        let mut cam = camera();
        let before = cam.aspect();
        cam.set_aspect(800, 0);
        assert_eq!(cam.aspect(), before);
    }

    #[test]
    fn orbit_preserves_distance_to_target() {
        let mut cam = camera();
        cam.orbit(Vec2::new(0.4, -0.2));
        cam.orbit(Vec2::new(-1.3, 0.7));
        assert_relative_eq!(cam.distance(), 6.0, epsilon = 1e-4);
    }

    #[test]
    fn orbit_refuses_to_flip_over_the_pole() {
        let mut cam = camera();
        for _ in 0..100 {
            cam.orbit(Vec2::new(0.0, 0.5));
        }
        let up_dot = (cam.position() - Vec3::ZERO).normalize().dot(Vec3::Y);
        assert!(up_dot.abs() < 0.9951);
    }

    #[test]
    fn dolly_clamps_distance() {
        let mut cam = camera();
        for _ in 0..100 {
            cam.dolly(5.0);
        }
        assert!(cam.distance() >= MIN_DISTANCE - 1e-4);
        for _ in 0..100 {
            cam.dolly(-5.0);
        }
        assert!(cam.distance() <= MAX_DISTANCE + 1e-4);
    }

    #[test]
    fn view_proj_recomputes_after_resize() {
        let mut cam = camera();
        let first = cam.view_proj();
        cam.set_aspect(800, 600);
        let second = cam.view_proj();
        assert_ne!(first, second);
        // stable once clean
        assert_eq!(second, cam.view_proj());
    }
}
