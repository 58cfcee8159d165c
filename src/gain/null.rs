use super::{Drive, Gain, GainData, transform};
use crate::geometry::Geometry;

/// A gain that silences every transducer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Null;

impl Null {
    /// Creates a new [`Null`].
    pub const fn new() -> Self {
        Self
    }
}

impl Gain for Null {
    fn calc(&self, geometry: &Geometry, parallel: bool) -> GainData {
        transform(geometry, parallel, |_| Drive::NULL)
    }
}
