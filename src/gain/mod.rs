mod focus;
mod null;

pub use focus::Focus;
pub use null::Null;

use std::{collections::BTreeMap, sync::Arc};

use bytemuck::{Pod, Zeroable};
use derive_more::Debug;
use itertools::Itertools;
use rayon::prelude::*;

use crate::geometry::{Geometry, Transducer};

/// The amplitude and phase of one transducer.
///
/// The in-memory layout equals the little-endian encoding of `(amp << 8) | phase`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Drive {
    phase: u8,
    amp: u8,
}

impl Drive {
    /// A silent drive.
    pub const NULL: Self = Self::new(0x00, 0x00);

    /// Creates a new drive.
    pub const fn new(amp: u8, phase: u8) -> Self {
        Self { phase, amp }
    }

    /// Gets the amplitude.
    pub const fn amp(&self) -> u8 {
        self.amp
    }

    /// Gets the phase.
    pub const fn phase(&self) -> u8 {
        self.phase
    }

    /// Returns `(amp << 8) | phase`.
    pub const fn packed(&self) -> u16 {
        ((self.amp as u16) << 8) | self.phase as u16
    }

    /// Unpacks a `(amp << 8) | phase` value.
    pub const fn from_packed(v: u16) -> Self {
        Self::new((v >> 8) as u8, (v & 0xFF) as u8)
    }
}

/// The drive table of every device, keyed by device id.
pub type GainData = BTreeMap<usize, Vec<Drive>>;

/// A computation that produces a drive for every transducer.
pub trait Gain: Send + Sync {
    /// Computes the drive table for `geometry`.
    ///
    /// `parallel` is a hint that the computation may be spread over the rayon thread pool.
    fn calc(&self, geometry: &Geometry, parallel: bool) -> GainData;
}

/// Builds a [`GainData`] by evaluating `f` on every transducer of `geometry`.
pub fn transform<F>(geometry: &Geometry, parallel: bool, f: F) -> GainData
where
    F: Fn(&Transducer) -> Drive + Sync,
{
    if parallel {
        geometry
            .iter()
            .collect_vec()
            .into_par_iter()
            .map(|dev| (dev.idx(), dev.iter().map(&f).collect()))
            .collect()
    } else {
        geometry
            .iter()
            .map(|dev| (dev.idx(), dev.iter().map(&f).collect()))
            .collect()
    }
}

/// The default number of devices at or above which gains are computed in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// A [`Gain`] together with the geometry it is built against and its built drive table.
///
/// Building is idempotent: once [`GainProgram::built`] returns `true` the table never changes.
#[derive(Debug)]
pub struct GainProgram {
    #[debug(skip)]
    gain: Box<dyn Gain>,
    #[debug(skip)]
    geometry: Option<Arc<Geometry>>,
    parallel_threshold: usize,
    data: Option<GainData>,
}

impl GainProgram {
    /// Wraps `gain` into an unbuilt program with no geometry attached.
    pub fn new(gain: impl Gain + 'static) -> Self {
        Self {
            gain: Box::new(gain),
            geometry: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            data: None,
        }
    }

    /// Attaches the geometry used by [`GainProgram::build`].
    pub fn set_geometry(&mut self, geometry: Arc<Geometry>) {
        self.geometry = Some(geometry);
    }

    /// Gets the attached geometry.
    pub fn geometry(&self) -> Option<&Arc<Geometry>> {
        self.geometry.as_ref()
    }

    /// Returns `true` if the drive table has been computed.
    pub fn built(&self) -> bool {
        self.data.is_some()
    }

    /// Gets the drive table, if built.
    pub fn data(&self) -> Option<&GainData> {
        self.data.as_ref()
    }

    pub(crate) fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    /// Computes the drive table. Does nothing if already built.
    ///
    /// # Panics
    ///
    /// Panics if no geometry is attached.
    pub fn build(&mut self) {
        if self.built() {
            return;
        }
        let Some(geometry) = self.geometry.as_ref() else {
            panic!("gain must not be built without geometry");
        };
        let parallel = geometry.num_devices() >= self.parallel_threshold;
        self.data = Some(self.gain.calc(geometry, parallel));
    }
}

impl<G: Gain + 'static> From<G> for GainProgram {
    fn from(gain: G) -> Self {
        Self::new(gain)
    }
}
