use glam::{Mat4, Vec3};
use showcase_render::RenderView;

/// Fraction of the accumulated rotation applied on each update.
pub const DAMPING_FACTOR: f32 = 0.05;

const MIN_POLAR: f32 = 0.01;
const MAX_POLAR: f32 = std::f32::consts::PI - 0.01;

/// Camera orbiting a target on a sphere, with damped rotation.
///
/// Input adds to pending angle deltas; [`OrbitCamera::update`] applies a
/// fraction of them each frame and decays the rest.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    /// Azimuth around +Y, measured from +Z towards +X.
    pub theta: f32,
    /// Polar angle from +Y.
    pub phi: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    delta_theta: f32,
    delta_phi: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_at(Vec3::new(1.0, 1.0, 6.0), Vec3::ZERO)
    }
}

impl OrbitCamera {
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let radius = offset.length().max(f32::EPSILON);
        Self {
            target,
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos().clamp(MIN_POLAR, MAX_POLAR),
            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
            min_distance: 0.5,
            max_distance: 50.0,
            damping: DAMPING_FACTOR,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            delta_theta: 0.0,
            delta_phi: 0.0,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        self.target
            + self.radius
                * Vec3::new(
                    sin_phi * self.theta.sin(),
                    self.phi.cos(),
                    sin_phi * self.theta.cos(),
                )
    }

    /// Queue a rotation from a pointer drag, in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.delta_theta -= dx * self.rotate_speed;
        self.delta_phi -= dy * self.rotate_speed;
    }

    /// Move towards (positive) or away from (negative) the target.
    pub fn zoom(&mut self, amount: f32) {
        let scale = (1.0 - self.zoom_speed).powf(amount);
        self.radius = (self.radius * scale).clamp(self.min_distance, self.max_distance);
    }

    /// Advance the damping state by one frame.
    pub fn update(&mut self) {
        self.theta += self.delta_theta * self.damping;
        self.phi = (self.phi + self.delta_phi * self.damping).clamp(MIN_POLAR, MAX_POLAR);
        self.delta_theta *= 1.0 - self.damping;
        self.delta_phi *= 1.0 - self.damping;
    }

    pub fn pending_rotation(&self) -> (f32, f32) {
        (self.delta_theta, self.delta_phi)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn view(&self) -> RenderView {
        RenderView {
            eye: self.eye(),
            target: self.target,
            fov_degrees: self.fov.to_degrees(),
            aspect: self.aspect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_sits_at_start_pose() {
        let cam = OrbitCamera::default();
        assert!(cam.eye().distance(Vec3::new(1.0, 1.0, 6.0)) < 1e-4);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn rotation_is_damped() {
        let mut cam = OrbitCamera::default();
        let start = cam.theta;
        cam.rotate(100.0, 0.0);
        let (pending, _) = cam.pending_rotation();
        cam.update();
        assert!((cam.theta - (start + pending * DAMPING_FACTOR)).abs() < 1e-6);
        let (left, _) = cam.pending_rotation();
        assert!((left - pending * (1.0 - DAMPING_FACTOR)).abs() < 1e-6);
    }

    #[test]
    fn damping_settles() {
        let mut cam = OrbitCamera::default();
        let start = cam.theta;
        cam.rotate(10.0, 0.0);
        let (total, _) = cam.pending_rotation();
        for _ in 0..500 {
            cam.update();
        }
        assert!((cam.theta - (start + total)).abs() < 1e-3);
        assert!(cam.pending_rotation().0.abs() < 1e-6);
    }

    #[test]
    fn polar_angle_stays_off_the_poles() {
        let mut cam = OrbitCamera::default();
        cam.rotate(0.0, 100_000.0);
        for _ in 0..100 {
            cam.update();
        }
        assert!(cam.phi >= MIN_POLAR);
        assert!(cam.eye().is_finite());
    }

    #[test]
    fn zoom_clamps_distance() {
        let mut cam = OrbitCamera::default();
        cam.zoom(1000.0);
        assert_eq!(cam.radius, cam.min_distance);
        cam.zoom(-1000.0);
        assert_eq!(cam.radius, cam.max_distance);
    }

    #[test]
    fn view_reports_degrees() {
        let view = OrbitCamera::default().view();
        assert!((view.fov_degrees - 75.0).abs() < 1e-3);
        assert_eq!(view.target, Vec3::ZERO);
    }
}
