mod option;
mod worker;

pub use option::ControllerOption;

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use tracing::{debug, error, warn};

use crate::{
    error::PipelineError,
    gain::{GainProgram, Null},
    geometry::Geometry,
    link::Link,
    modulation::Modulation,
};

use worker::Shared;

/// The device-control pipeline.
///
/// While open, a build worker computes submitted gains and a send worker pairs the oldest built
/// gain with the next chunk of the oldest modulation, frames them and hands the frame to the
/// link. Gains and modulations are each delivered in submission order.
pub struct Controller {
    geometry: Arc<Geometry>,
    option: ControllerOption,
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl Controller {
    /// Creates a closed controller with default options.
    pub fn new(geometry: Geometry) -> Self {
        Self::with_option(geometry, ControllerOption::default())
    }

    /// Creates a closed controller.
    pub fn with_option(geometry: Geometry, option: ControllerOption) -> Self {
        Self {
            geometry: Arc::new(geometry),
            shared: Arc::new(Shared::new(
                option.silent_mode,
                option.send_interval,
                option.msg_id_seed,
            )),
            option,
            workers: Vec::new(),
        }
    }

    /// Gets the geometry.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Gets the geometry for adding or removing devices.
    ///
    /// Gains already holding the current geometry keep seeing it unchanged. Devices must not be
    /// changed while the pipeline is open.
    pub fn geometry_mut(&mut self) -> &mut Geometry {
        Arc::make_mut(&mut self.geometry)
    }

    /// Gets the options.
    pub const fn option(&self) -> &ControllerOption {
        &self.option
    }

    /// Returns `true` if a link is attached and both workers are running.
    pub fn is_open(&self) -> bool {
        self.shared.is_open()
    }

    /// Returns `true` if frames carry the silent flag.
    pub fn silent_mode(&self) -> bool {
        self.shared.silent_mode()
    }

    /// Sets whether subsequent frames carry the silent flag.
    pub fn set_silent_mode(&self, silent: bool) {
        self.shared.set_silent_mode(silent);
    }

    /// Opens `link` and starts the workers, closing the current link first.
    pub fn open(&mut self, mut link: impl Link + 'static) -> Result<(), PipelineError> {
        self.close()?;

        link.open(&self.geometry)?;
        if !link.is_open() {
            warn!("link did not open");
            return Err(PipelineError::NotOpen);
        }
        self.shared.start(Box::new(link), self.option.msg_id_seed);

        if let Err(err) = self
            .spawn("autd3-build", worker::build_loop)
            .and_then(|_| self.spawn("autd3-send", worker::send_loop))
        {
            self.close()?;
            return Err(err.into());
        }
        debug!(num_devices = self.geometry.num_devices(), "pipeline opened");
        Ok(())
    }

    /// Silences the devices, closes the link and stops the workers.
    ///
    /// Queued work that has not been sent is discarded. Does nothing if already closed.
    pub fn close(&mut self) -> Result<(), PipelineError> {
        let stopped = self.shared.stop();
        self.join_workers();

        let Some(mut link) = self.shared.link.lock().take() else {
            return Ok(());
        };
        if !stopped || !link.is_open() {
            return Ok(());
        }

        let mut null = GainProgram::new(Null);
        self.prepare(&mut null);
        null.build();
        let (frame, _) = self.shared.frame(Some(&null), None);
        if let Err(err) = link.send(&frame) {
            warn!(%err, "failed to silence devices");
        }
        link.close()?;
        debug!("pipeline closed");
        Ok(())
    }

    /// Queues `gain` to be built and sent by the workers.
    pub fn append_gain(&self, gain: impl Into<GainProgram>) -> Result<(), PipelineError> {
        if !self.is_open() {
            return Err(PipelineError::NotOpen);
        }
        let mut gain = gain.into();
        self.prepare(&mut gain);
        {
            // Checked under the lock so nothing lands in a queue `stop` has already flushed.
            let mut queue = self.shared.build_queue.lock();
            if !self.shared.is_open() {
                return Err(PipelineError::NotOpen);
            }
            queue.push_back(gain);
        }
        self.shared.build_cond.notify_all();
        Ok(())
    }

    /// Builds `gain` if needed and sends it alone on the calling thread.
    ///
    /// The gain is attached and built even if the pipeline is closed.
    pub fn append_gain_sync(&self, gain: &mut GainProgram) -> Result<(), PipelineError> {
        self.prepare(gain);
        gain.build();
        if !self.is_open() {
            return Err(PipelineError::NotOpen);
        }
        let (frame, _) = self.shared.frame(Some(gain), None);
        self.send_sync(&frame)
    }

    /// Queues `modulation` to be sent by the send worker.
    pub fn append_modulation(&self, modulation: Modulation) -> Result<(), PipelineError> {
        {
            let mut queue = self.shared.send_queue.lock();
            if !self.shared.is_open() {
                return Err(PipelineError::NotOpen);
            }
            queue.modulations.push_back(modulation);
        }
        self.shared.send_cond.notify_all();
        Ok(())
    }

    /// Sends the rest of the current cycle of `modulation` on the calling thread and rewinds it.
    pub fn append_modulation_sync(&self, modulation: &mut Modulation) -> Result<(), PipelineError> {
        if !self.is_open() {
            return Err(PipelineError::NotOpen);
        }
        if modulation.is_empty() {
            return Ok(());
        }
        loop {
            let (frame, chunk) = self.shared.frame(None, Some(&mut *modulation));
            self.send_sync(&frame)?;
            if chunk.is_some_and(|c| c.end) {
                break;
            }
        }
        modulation.rewind();
        Ok(())
    }

    fn prepare(&self, gain: &mut GainProgram) {
        if !gain.built() {
            gain.set_geometry(self.geometry.clone());
        }
        gain.set_parallel_threshold(self.option.parallel_threshold);
    }

    fn send_sync(&self, frame: &[u8]) -> Result<(), PipelineError> {
        self.shared.send(frame).map_err(|err| {
            self.shared.fail(&err);
            err.into()
        })
    }

    fn spawn(&mut self, name: &str, f: fn(&Shared)) -> std::io::Result<()> {
        let shared = self.shared.clone();
        self.workers.push(
            thread::Builder::new()
                .name(name.into())
                .spawn(move || f(&shared))?,
        );
        Ok(())
    }

    fn join_workers(&mut self) {
        let current = thread::current().id();
        self.workers
            .drain(..)
            .filter(|h| h.thread().id() != current)
            .for_each(|h| {
                if h.join().is_err() {
                    error!("worker panicked");
                }
            });
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(%err, "failed to close pipeline");
        }
    }
}
