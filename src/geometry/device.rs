use getset::{CopyGetters, Getters};
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};

use super::{EulerAngle, Transducer};
use crate::defined::{
    NUM_TRANS_IN_UNIT, NUM_TRANS_X, NUM_TRANS_Y, TRANS_SPACING_MM, is_missing_transducer,
};

/// One physical unit holding a fixed grid of transducers.
///
/// The world-space transducer positions are derived once at construction and never change.
#[derive(Clone, Debug, Getters, CopyGetters)]
pub struct Device {
    idx: usize,
    #[getset(get_copy = "pub")]
    /// The position of the device origin.
    position: Point3<f32>,
    #[getset(get_copy = "pub")]
    /// The orientation given at construction.
    euler_angles: EulerAngle,
    #[getset(get = "pub")]
    /// The rotation of the device.
    rotation: UnitQuaternion<f32>,
    #[getset(get = "pub")]
    /// The rigid transform from local to world space.
    isometry: Isometry3<f32>,
    #[getset(get_copy = "pub")]
    /// The direction of the device's local z axis in world space.
    z_direction: Vector3<f32>,
    transducers: Vec<Transducer>,
}

impl Device {
    pub(crate) fn new(idx: usize, position: Vector3<f32>, euler_angles: EulerAngle) -> Self {
        let rotation = euler_angles.rotation();
        let isometry = Isometry3::from_parts(Translation3::from(position), rotation);
        let transducers = (0..NUM_TRANS_Y)
            .flat_map(|y| (0..NUM_TRANS_X).map(move |x| (x, y)))
            .filter(|&(x, y)| !is_missing_transducer(x, y))
            .enumerate()
            .map(|(i, (x, y))| {
                let mut tr = Transducer::new(
                    i as _,
                    idx,
                    Point3::new(x as f32 * TRANS_SPACING_MM, y as f32 * TRANS_SPACING_MM, 0.),
                );
                tr.affine(&isometry);
                tr
            })
            .collect::<Vec<_>>();
        debug_assert_eq!(NUM_TRANS_IN_UNIT, transducers.len());
        Self {
            idx,
            position: Point3::from(position),
            euler_angles,
            rotation,
            isometry,
            z_direction: rotation * Vector3::z(),
            transducers,
        }
    }

    /// Gets the id of the device.
    pub const fn idx(&self) -> usize {
        self.idx
    }

    /// Gets the number of transducers in the device.
    pub fn num_transducers(&self) -> usize {
        self.transducers.len()
    }

    /// Gets an iterator over the transducers in local index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Transducer> {
        self.transducers.iter()
    }
}

impl std::ops::Index<usize> for Device {
    type Output = Transducer;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.transducers[idx]
    }
}

impl<'a> IntoIterator for &'a Device {
    type Item = &'a Transducer;
    type IntoIter = std::slice::Iter<'a, Transducer>;

    fn into_iter(self) -> Self::IntoIter {
        self.transducers.iter()
    }
}
