mod device;
mod rotation;
mod transducer;

pub use device::Device;
pub use rotation::EulerAngle;
pub use transducer::Transducer;

use nalgebra::{Point3, Vector3};

use crate::defined::NUM_TRANS_IN_UNIT;

/// An append-only collection of devices.
///
/// The transducer with global index `t` belongs to the device with id `t / NUM_TRANS_IN_UNIT` and
/// has local index `t % NUM_TRANS_IN_UNIT`. Device ids are assigned in insertion order and are
/// never reused or renumbered, even after [`Geometry::del_device`].
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    devices: Vec<Option<Device>>,
}

impl Geometry {
    /// Creates an empty geometry.
    pub const fn new() -> Self {
        Self {
            devices: Vec::new(),
        }
    }

    /// Appends a device and returns its id.
    pub fn add_device(&mut self, position: Vector3<f32>, rotation: impl Into<EulerAngle>) -> usize {
        let id = self.devices.len();
        self.devices
            .push(Some(Device::new(id, position, rotation.into())));
        id
    }

    /// Removes the device with `id`, leaving its slot vacant.
    ///
    /// The ids of the remaining devices and their transducer ranges do not change.
    pub fn del_device(&mut self, id: usize) -> Option<Device> {
        self.devices.get_mut(id).and_then(Option::take)
    }

    /// Gets the number of devices.
    pub fn num_devices(&self) -> usize {
        self.iter().count()
    }

    /// Gets the number of transducers.
    pub fn num_transducers(&self) -> usize {
        self.num_devices() * NUM_TRANS_IN_UNIT
    }

    /// Gets the world-space position of the transducer with global index `tr_idx`.
    pub fn position(&self, tr_idx: usize) -> Point3<f32> {
        self.device_of(tr_idx)[tr_idx % NUM_TRANS_IN_UNIT].position()
    }

    /// Gets the emission direction of the transducer with global index `tr_idx`.
    pub fn direction(&self, tr_idx: usize) -> Vector3<f32> {
        self.device_of(tr_idx).z_direction()
    }

    /// Gets the id of the device that owns the transducer with global index `tr_idx`.
    pub fn device_id_for_transducer_idx(&self, tr_idx: usize) -> usize {
        self.device_of(tr_idx).idx()
    }

    /// Gets the id of the `dev_idx`-th device in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `dev_idx + 1` devices are present.
    pub fn device_id_for_device_idx(&self, dev_idx: usize) -> usize {
        match self.iter().nth(dev_idx) {
            Some(dev) => dev.idx(),
            None => panic!(
                "device index {} out of range for {} devices",
                dev_idx,
                self.num_devices()
            ),
        }
    }

    /// Gets an iterator over the present devices in id order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Device> + Clone {
        self.devices.iter().flatten()
    }

    /// Gets the device with `id`, if present.
    pub fn device(&self, id: usize) -> Option<&Device> {
        self.devices.get(id).and_then(Option::as_ref)
    }

    // All transducer-index lookups go through here.
    fn device_of(&self, tr_idx: usize) -> &Device {
        let id = tr_idx / NUM_TRANS_IN_UNIT;
        match self.device(id) {
            Some(dev) => dev,
            None => panic!("transducer index {tr_idx} does not belong to any device"),
        }
    }
}

impl std::ops::Index<usize> for Geometry {
    type Output = Device;

    fn index(&self, id: usize) -> &Self::Output {
        match self.device(id) {
            Some(dev) => dev,
            None => panic!("no device with id {id}"),
        }
    }
}
