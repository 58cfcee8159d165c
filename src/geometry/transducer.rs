use getset::CopyGetters;
use nalgebra::{Isometry3, Point3};

/// A ultrasound transducer.
#[derive(Clone, Debug, PartialEq, CopyGetters)]
pub struct Transducer {
    idx: u8,
    dev_idx: usize,
    #[getset(get_copy = "pub")]
    /// The position of the transducer in world space.
    position: Point3<f32>,
}

impl Transducer {
    pub(crate) const fn new(idx: u8, dev_idx: usize, position: Point3<f32>) -> Self {
        Self {
            idx,
            dev_idx,
            position,
        }
    }

    /// Gets the local index of the transducer.
    pub const fn idx(&self) -> usize {
        self.idx as _
    }

    /// Gets the index of the device to which this transducer belongs.
    pub const fn dev_idx(&self) -> usize {
        self.dev_idx
    }

    pub(super) fn affine(&mut self, isometry: &Isometry3<f32>) {
        self.position = isometry * self.position;
    }
}
