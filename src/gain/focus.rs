use getset::CopyGetters;
use nalgebra::Point3;

use super::{Drive, Gain, GainData, transform};
use crate::{defined::ULTRASOUND_WAVELENGTH, geometry::Geometry};

/// A gain that produces a single focal point at full amplitude.
#[derive(Clone, Copy, Debug, PartialEq, CopyGetters)]
pub struct Focus {
    #[getset(get_copy = "pub")]
    /// The position of the focal point.
    pos: Point3<f32>,
}

impl Focus {
    /// Creates a new [`Focus`].
    pub const fn new(pos: Point3<f32>) -> Self {
        Self { pos }
    }

    // Rounds half away from zero.
    fn phase(dist: f32) -> u8 {
        let fphase = (dist % ULTRASOUND_WAVELENGTH) / ULTRASOUND_WAVELENGTH;
        (255.0 * (1.0 - fphase)).round().clamp(0., 255.) as u8
    }
}

impl Gain for Focus {
    fn calc(&self, geometry: &Geometry, parallel: bool) -> GainData {
        let pos = self.pos;
        transform(geometry, parallel, move |tr| {
            Drive::new(0xFF, Self::phase((tr.position() - pos).norm()))
        })
    }
}
