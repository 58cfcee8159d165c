/// The number of transducers in one device.
pub const NUM_TRANS_IN_UNIT: usize = 249;
/// The number of transducer slots along the x axis of one device.
pub const NUM_TRANS_X: usize = 18;
/// The number of transducer slots along the y axis of one device.
pub const NUM_TRANS_Y: usize = 14;
/// The spacing between adjacent transducers in mm.
pub const TRANS_SPACING_MM: f32 = 10.18;

/// The wavelength of the ultrasound carrier in mm.
pub const ULTRASOUND_WAVELENGTH: f32 = 8.5;

/// The sampling frequency of [`Modulation`] in Hz.
///
/// [`Modulation`]: crate::modulation::Modulation
pub const MOD_SAMPLING_FREQ: u32 = 4000;
/// The capacity of the modulation payload carried in one frame.
pub const MOD_FRAME_SIZE: usize = 124;

/// Returns `true` if the slot at `(x, y)` has no transducer mounted.
pub const fn is_missing_transducer(x: usize, y: usize) -> bool {
    y == 1 && (x == 1 || x == 2 || x == 16)
}
