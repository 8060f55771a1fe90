use serde::{Deserialize, Serialize};

pub use glam::{Mat3, Quat, Vec3};

/// A rigid 3D transform: position and orientation in world space.
///
/// The scene uses a right-handed, y-up frame; the viewer's neutral gaze is -Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation.
    pub position: Vec3,
    /// Rotation.
    pub orientation: Quat,
}

impl Transform {
    /// Identity transform: at the origin, unrotated.
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Compose `self` (a parent frame) with a transform expressed in that frame.
    pub fn compose(&self, local: &Transform) -> Transform {
        Transform {
            position: self.position + self.orientation * local.position,
            orientation: (self.orientation * local.orientation).normalize(),
        }
    }

    /// Map a point from this frame into world space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.orientation * point
    }

    /// Interpolate between two transforms: position linearly, orientation by slerp.
    pub fn lerp(&self, other: &Transform, t: f32) -> Transform {
        let t = t.clamp(0.0, 1.0);
        Transform {
            position: self.position.lerp(other.position, t),
            orientation: self.orientation.slerp(other.orientation, t),
        }
    }

    /// True if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.orientation.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

/// Build the orientation whose -Z axis points along `direction`, keeping +Y as
/// close to `up` as possible.
///
/// Returns `None` when `direction` is zero or parallel to `up`.
pub fn look_rotation(direction: Vec3, up: Vec3) -> Option<Quat> {
    let forward = direction.try_normalize()?;
    let right = forward.cross(up).try_normalize()?;
    let true_up = right.cross(forward);
    Some(Quat::from_mat3(&Mat3::from_cols(right, true_up, -forward)).normalize())
}

/// Rotation taking +Z onto `normal`, or `None` for a zero vector.
pub fn normal_rotation(normal: Vec3) -> Option<Quat> {
    let normal = normal.try_normalize()?;
    Some(Quat::from_rotation_arc(Vec3::Z, normal))
}

/// Rotation of `angle_degrees` about `axis`, or `None` for a zero axis.
pub fn axis_rotation(axis: Vec3, angle_degrees: f32) -> Option<Quat> {
    let axis = axis.try_normalize()?;
    Some(Quat::from_axis_angle(axis, angle_degrees.to_radians()))
}

/// Unsigned angle between two directions in degrees, or `None` if either is zero.
pub fn angle_between_degrees(a: Vec3, b: Vec3) -> Option<f32> {
    let a = a.try_normalize()?;
    let b = b.try_normalize()?;
    Some(a.angle_between(b).to_degrees())
}

/// Yaw and pitch of a gaze direction in degrees.
///
/// Yaw is measured about +Y from the neutral -Z gaze, positive to the left
/// (counter-clockwise seen from above). Pitch is positive looking up.
pub fn yaw_pitch_degrees(forward: Vec3) -> Option<(f32, f32)> {
    let f = forward.try_normalize()?;
    let yaw = (-f.x).atan2(-f.z).to_degrees();
    let pitch = f.y.clamp(-1.0, 1.0).asin().to_degrees();
    Some((yaw, pitch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_identity() {
        let t = Transform::IDENTITY;
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.orientation, Quat::IDENTITY);
    }

    #[test]
    fn test_transform_lerp_position() {
        let a = Transform::from_position(Vec3::ZERO);
        let b = Transform::from_position(Vec3::new(0.0, 0.0, 2.0));
        let mid = a.lerp(&b, 0.5);
        assert!((mid.position.z - 1.0).abs() < 1e-5);
        let past = a.lerp(&b, 3.0);
        assert!((past.position.z - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_transform_compose_rotates_offset() {
        let parent = Transform::new(
            Vec3::new(4.0, 0.0, 0.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        let local = Transform::from_position(Vec3::new(0.0, 0.0, -1.0));
        let world = parent.compose(&local);
        assert!(world
            .position
            .abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_look_rotation_points_negative_z_at_target() {
        let q = look_rotation(Vec3::X, Vec3::Y).unwrap();
        let gaze = q * Vec3::NEG_Z;
        assert!(gaze.abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_look_rotation_degenerate() {
        assert!(look_rotation(Vec3::ZERO, Vec3::Y).is_none());
        assert!(look_rotation(Vec3::Y, Vec3::Y).is_none());
    }

    #[test]
    fn test_angle_between_degrees() {
        let angle = angle_between_degrees(Vec3::X, Vec3::Y).unwrap();
        assert!((angle - 90.0).abs() < 1e-3);
        assert!(angle_between_degrees(Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn test_yaw_pitch() {
        let (yaw, pitch) = yaw_pitch_degrees(Vec3::NEG_Z).unwrap();
        assert!(yaw.abs() < 1e-3);
        assert!(pitch.abs() < 1e-3);

        let (yaw, _) = yaw_pitch_degrees(Vec3::NEG_X).unwrap();
        assert!((yaw - 90.0).abs() < 1e-3);

        let (_, pitch) = yaw_pitch_degrees(Vec3::new(0.0, 1.0, -1.0)).unwrap();
        assert!((pitch - 45.0).abs() < 1e-3);
    }
}
