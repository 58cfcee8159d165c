use std::sync::Arc;

use parking_lot::Mutex;
#[cfg(feature = "polars")]
use polars::{frame::DataFrame, prelude::Column};

use super::Link;
use crate::{
    error::LinkError,
    frame::{Frame, Header},
    gain::Drive,
    geometry::Geometry,
};

/// The frames received by a [`Recorder`].
///
/// Cloning yields another handle to the same record, so it can be inspected after the
/// [`Recorder`] has been moved into a [`Controller`].
///
/// [`Controller`]: crate::controller::Controller
#[derive(Clone, Debug, Default)]
pub struct Record {
    frames: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Record {
    /// Gets the number of recorded frames.
    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    /// Returns `true` if no frame has been recorded.
    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    /// Discards every recorded frame.
    pub fn clear(&self) {
        self.frames.lock().clear();
    }

    /// Gets a copy of the raw frames.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.frames.lock().clone()
    }

    /// Gets the header of every frame.
    pub fn headers(&self) -> Vec<Header> {
        self.with_frames(|f| *f.header())
    }

    /// Gets the concatenated modulation chunks of every frame.
    pub fn modulation(&self) -> Vec<u8> {
        self.with_frames(|f| f.header().modulation().to_vec())
            .concat()
    }

    /// Gets the drive of every transducer for each frame that carries a body.
    pub fn drives(&self) -> Vec<Vec<Drive>> {
        self.with_frames(|f| {
            (0..f.num_devices())
                .flat_map(|i| f.drives(i).iter().copied())
                .collect::<Vec<_>>()
        })
        .into_iter()
        .filter(|d| !d.is_empty())
        .collect()
    }

    fn with_frames<T>(&self, f: impl Fn(&Frame) -> T) -> Vec<T> {
        self.frames
            .lock()
            .iter()
            .filter_map(|buf| Frame::parse(buf))
            .map(|frame| f(&frame))
            .collect()
    }

    #[cfg(feature = "polars")]
    fn drive_table(
        &self,
        name: &str,
        f: impl Fn(&Drive) -> u8,
    ) -> Result<DataFrame, crate::error::PipelineError> {
        Ok(DataFrame::new(
            self.drives()
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    Column::new(
                        format!("{name}@{i}").into(),
                        &d.iter().map(&f).collect::<Vec<_>>(),
                    )
                })
                .collect::<Vec<_>>(),
        )?)
    }

    #[cfg(feature = "polars")]
    /// Returns the phase of each transducer, one column per frame carrying a body.
    pub fn phase(&self) -> Result<DataFrame, crate::error::PipelineError> {
        self.drive_table("phase", Drive::phase)
    }

    #[cfg(feature = "polars")]
    /// Returns the amplitude of each transducer, one column per frame carrying a body.
    pub fn amplitude(&self) -> Result<DataFrame, crate::error::PipelineError> {
        self.drive_table("amp", Drive::amp)
    }
}

/// A [`Link`] that keeps every frame it receives in memory.
///
/// Frames are validated the way the firmware does: the body must be empty or hold exactly one
/// table per device given at [`Link::open`].
#[derive(Debug, Default)]
pub struct Recorder {
    is_open: bool,
    num_devices: usize,
    record: Record,
}

impl Recorder {
    /// Creates a closed recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a handle to the recorded frames.
    pub fn record(&self) -> Record {
        self.record.clone()
    }
}

impl Link for Recorder {
    fn open(&mut self, geometry: &Geometry) -> Result<(), LinkError> {
        self.num_devices = geometry.num_devices();
        self.is_open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.is_open = false;
        Ok(())
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        if !self.is_open {
            return Err(LinkError::Closed);
        }
        let parsed = Frame::parse(frame)
            .ok_or_else(|| LinkError::Send(format!("malformed frame of {} bytes", frame.len())))?;
        if parsed.num_devices() != 0 && parsed.num_devices() != self.num_devices {
            return Err(LinkError::Send(format!(
                "frame holds {} device tables, expected {}",
                parsed.num_devices(),
                self.num_devices
            )));
        }
        self.record.frames.lock().push(frame.to_vec());
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.is_open
    }
}
