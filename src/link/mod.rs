mod recorder;

pub use recorder::{Record, Recorder};

use crate::{error::LinkError, geometry::Geometry};

/// The transport that delivers frames to the devices.
pub trait Link: Send {
    /// Opens the link for the devices in `geometry`.
    fn open(&mut self, geometry: &Geometry) -> Result<(), LinkError>;

    /// Closes the link.
    fn close(&mut self) -> Result<(), LinkError>;

    /// Transmits one frame.
    fn send(&mut self, frame: &[u8]) -> Result<(), LinkError>;

    /// Returns `true` if the link is open.
    fn is_open(&self) -> bool;
}

impl Link for Box<dyn Link> {
    fn open(&mut self, geometry: &Geometry) -> Result<(), LinkError> {
        self.as_mut().open(geometry)
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.as_mut().close()
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        self.as_mut().send(frame)
    }

    fn is_open(&self) -> bool {
        self.as_ref().is_open()
    }
}
