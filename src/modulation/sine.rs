use std::f32::consts::PI;

use super::Modulation;

impl Modulation {
    /// Creates a looping sine envelope.
    ///
    /// `freq` is clamped to `[1, sampling_frequency / 2]` Hz. One period spans
    /// `round(sampling_frequency / freq)` samples. A sample of `0` is reserved by the firmware and
    /// is emitted as `1`.
    pub fn sine(freq: f32, amp: f32, offset: f32) -> Self {
        let fs = Self::sampling_frequency() as f32;
        let freq = freq.clamp(1.0, fs / 2.0);
        let t = (fs / freq).round() as usize;
        Self::from_buffer(
            (0..t)
                .map(|i| {
                    let v = 255.0 * offset + 127.5 * amp * (2.0 * PI * i as f32 / t as f32).cos();
                    match v.clamp(0.0, 255.0).round() as u8 {
                        0 => 1,
                        v => v,
                    }
                })
                .collect(),
        )
    }
}
