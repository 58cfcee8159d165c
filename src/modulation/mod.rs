mod sine;

use crate::defined::{MOD_FRAME_SIZE, MOD_SAMPLING_FREQ};

/// An amplitude envelope transmitted in chunks across consecutive frames.
///
/// `sent` counts the bytes already placed into frames. It only moves forward and, for a looping
/// modulation, wraps to zero once the whole buffer has been transmitted.
#[derive(Clone, Debug, PartialEq)]
pub struct Modulation {
    buffer: Vec<u8>,
    r#loop: bool,
    sent: usize,
}

/// The bookkeeping of one chunk taken from a [`Modulation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Chunk {
    pub len: usize,
    pub begin: bool,
    pub end: bool,
}

impl Modulation {
    /// Creates an empty looping modulation.
    pub const fn new() -> Self {
        Self::from_buffer(Vec::new())
    }

    /// Creates a looping modulation holding a single constant amplitude.
    pub fn constant(amp: u8) -> Self {
        Self::from_buffer(vec![amp])
    }

    /// Creates a looping modulation from raw samples.
    pub const fn from_buffer(buffer: Vec<u8>) -> Self {
        Self {
            buffer,
            r#loop: true,
            sent: 0,
        }
    }

    /// Sets whether playback wraps back to the beginning after the last sample.
    pub fn with_loop(mut self, r#loop: bool) -> Self {
        self.r#loop = r#loop;
        self
    }

    /// The sampling frequency of the envelope in Hz.
    pub const fn sampling_frequency() -> u32 {
        MOD_SAMPLING_FREQ
    }

    /// Gets the samples.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Returns `true` if playback wraps after the last sample.
    pub const fn is_loop(&self) -> bool {
        self.r#loop
    }

    /// Gets the number of samples already transmitted in the current cycle.
    pub const fn sent(&self) -> usize {
        self.sent
    }

    /// Returns `true` if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Restarts transmission from the first sample.
    pub fn rewind(&mut self) {
        self.sent = 0;
    }

    /// Copies the next chunk into `dst` and advances the cursor.
    pub(crate) fn next_chunk(&mut self, dst: &mut [u8; MOD_FRAME_SIZE]) -> Chunk {
        let remaining = self.buffer.len().saturating_sub(self.sent);
        let len = remaining.min(MOD_FRAME_SIZE);
        dst[..len].copy_from_slice(&self.buffer[self.sent..self.sent + len]);
        let begin = self.sent == 0;
        let end = self.sent + len >= self.buffer.len();
        self.sent += len;
        if end && self.r#loop {
            self.sent = 0;
        }
        Chunk { len, begin, end }
    }
}

impl Default for Modulation {
    fn default() -> Self {
        Self::new()
    }
}
