//! Per-frame camera: the cloud spins about a tilted axis in front of a fixed
//! perspective camera.

use std::time::Duration;

use lib_math::{Mat4, Vec3, Vec4};
use lib_renderer::Camera;

use crate::app::{WINDOW_HEIGHT, WINDOW_WIDTH};

pub const CLEAR_COLOR: Vec4 = Vec4::new(0.2, 0.3, 0.3, 1.0);

const DEGREES_PER_SECOND: f32 = 50.0;
const FOV_Y_DEGREES: f32 = 45.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;
const CAMERA_DISTANCE: f32 = 3.0;

fn rotation_axis() -> Vec3 {
    Vec3::new(0.5, 1.0, 0.0).normalize()
}

pub fn camera_at(elapsed: Duration) -> Camera {
    let angle = elapsed.as_secs_f32() * DEGREES_PER_SECOND.to_radians();

    Camera {
        model: Mat4::from_axis_angle(rotation_axis(), angle),
        view: Mat4::from_translation(Vec3::new(0.0, 0.0, -CAMERA_DISTANCE)),
        // Always the initial window aspect, even if the window changes size.
        projection: Mat4::perspective_rh(
            FOV_Y_DEGREES.to_radians(),
            (WINDOW_WIDTH / WINDOW_HEIGHT) as f32,
            Z_NEAR,
            Z_FAR,
        ),
        clear_color: CLEAR_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_starts_unrotated() {
        let cam = camera_at(Duration::ZERO);

        assert!(cam.model.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn rotates_fifty_degrees_per_second() {
        let cam = camera_at(Duration::from_secs(1));

        // Perpendicular to the rotation axis, so it turns by the full angle.
        let v = Vec3::Z;
        let turned = cam.model.transform_vector3(v);

        assert!((turned.angle_between(v).to_degrees() - 50.0).abs() < 1e-3);
        assert!(
            cam.model
                .transform_vector3(rotation_axis())
                .abs_diff_eq(rotation_axis(), 1e-5)
        );
    }

    #[test]
    fn full_turn_returns_to_start() {
        let cam = camera_at(Duration::from_secs_f32(360.0 / 50.0));

        assert!(cam.model.abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn view_moves_cloud_in_front_of_camera() {
        let cam = camera_at(Duration::ZERO);

        assert_eq!(
            cam.view.transform_point3(Vec3::ZERO),
            Vec3::new(0.0, 0.0, -3.0)
        );
    }

    #[test]
    fn projection_depth_range() {
        let cam = camera_at(Duration::ZERO);

        let near = cam.projection.project_point3(Vec3::new(0.0, 0.0, -0.1));
        let far = cam.projection.project_point3(Vec3::new(0.0, 0.0, -100.0));

        assert!(near.z.abs() < 1e-5, "{near}");
        assert!((far.z - 1.0).abs() < 1e-5, "{far}");
    }

    #[test]
    fn cloud_center_lands_mid_screen() {
        let cam = camera_at(Duration::from_secs(3));
        let mvp = cam.projection * cam.view * cam.model;

        let ndc = mvp.project_point3(Vec3::ZERO);

        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6, "{ndc}");
        assert!(ndc.z > 0.0 && ndc.z < 1.0, "{ndc}");
    }

    #[test]
    fn clear_color_is_teal() {
        assert_eq!(camera_at(Duration::ZERO).clear_color, Vec4::new(0.2, 0.3, 0.3, 1.0));
    }
}
