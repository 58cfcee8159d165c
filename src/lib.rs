mod error;

pub mod controller;
pub mod defined;
pub mod frame;
pub mod gain;
pub mod geometry;
pub mod link;
pub mod modulation;

pub use controller::{Controller, ControllerOption};
pub use error::{LinkError, PipelineError};

pub mod prelude {
    pub use crate::{
        controller::{Controller, ControllerOption},
        error::{LinkError, PipelineError},
        gain::{Drive, Focus, Gain, GainData, GainProgram, Null},
        geometry::{EulerAngle, Geometry},
        link::{Link, Record, Recorder},
        modulation::Modulation,
    };
    pub use nalgebra::{Point3, Vector3};
}
