use nalgebra::{UnitQuaternion, Vector3};

/// The orientation of a device as Euler angles in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EulerAngle {
    /// Rotation about z, then the new y, then the new z.
    ZYZ(f32, f32, f32),
}

impl EulerAngle {
    /// No rotation.
    pub const fn identity() -> Self {
        Self::ZYZ(0., 0., 0.)
    }

    pub(crate) fn rotation(&self) -> UnitQuaternion<f32> {
        match *self {
            Self::ZYZ(first, second, third) => {
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), first)
                    * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), second)
                    * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), third)
            }
        }
    }
}

impl From<Vector3<f32>> for EulerAngle {
    fn from(v: Vector3<f32>) -> Self {
        Self::ZYZ(v.x, v.y, v.z)
    }
}
