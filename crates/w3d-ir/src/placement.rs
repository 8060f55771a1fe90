use serde::{Deserialize, Serialize};
use w3d_core::math::{axis_rotation, look_rotation, normal_rotation};
use w3d_core::{Quat, Vec3};

/// Name of the scene's root reference frame.
pub const CENTER: &str = "Center";

/// How a placement orients its object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Rotation {
    /// Keep the frame's orientation.
    None,
    /// Rotate `angle_degrees` about `axis`.
    Axis { axis: Vec3, angle_degrees: f32 },
    /// Face a world-space point, with `up` as the preferred up direction.
    LookAt { target: Vec3, up: Vec3 },
    /// Turn the object's +Z axis onto `normal`.
    Normal { normal: Vec3 },
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::None
    }
}

impl Rotation {
    /// Orientation relative to the parent frame, for rotations that do not
    /// depend on where the object ends up. `LookAt` is resolved in world
    /// space by the runtime and returns `None` here.
    pub fn local_orientation(&self) -> Option<Quat> {
        match self {
            Rotation::None => Some(Quat::IDENTITY),
            Rotation::Axis {
                axis,
                angle_degrees,
            } => axis_rotation(*axis, *angle_degrees),
            Rotation::Normal { normal } => normal_rotation(*normal),
            Rotation::LookAt { .. } => None,
        }
    }

    /// World orientation for an object at `position` looking at its target.
    pub fn look_at_from(&self, position: Vec3) -> Option<Quat> {
        match self {
            Rotation::LookAt { target, up } => look_rotation(*target - position, *up),
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Rotation::None => true,
            Rotation::Axis {
                axis,
                angle_degrees,
            } => axis.is_finite() && angle_degrees.is_finite(),
            Rotation::LookAt { target, up } => target.is_finite() && up.is_finite(),
            Rotation::Normal { normal } => normal.is_finite(),
        }
    }
}

/// Position and orientation of an object, expressed in a named reference frame.
///
/// `relative_to` names either a declared frame (a wall, `Center`) or another
/// entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Reference frame name.
    #[serde(default = "default_frame")]
    pub relative_to: String,
    /// Offset from the frame origin, in frame coordinates.
    #[serde(default)]
    pub position: Vec3,
    /// Orientation.
    #[serde(default)]
    pub rotation: Rotation,
}

fn default_frame() -> String {
    CENTER.to_string()
}

impl Placement {
    /// A placement at `position` relative to `Center`.
    pub fn at(position: Vec3) -> Self {
        Self {
            relative_to: default_frame(),
            position,
            rotation: Rotation::None,
        }
    }

    /// Builder: change the reference frame.
    pub fn relative_to(mut self, frame: impl Into<String>) -> Self {
        self.relative_to = frame.into();
        self
    }

    /// Builder: set the rotation.
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}
