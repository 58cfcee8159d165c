use std::time::Duration;

use crate::gain::DEFAULT_PARALLEL_THRESHOLD;

/// Options for [`Controller`].
///
/// [`Controller`]: super::Controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerOption {
    /// Initial silent mode. The firmware powers up silent.
    pub silent_mode: bool,
    /// Seed of the message id generator, applied every time a link is opened.
    pub msg_id_seed: u64,
    /// Pause after each frame sent by the background worker.
    pub send_interval: Duration,
    /// Number of devices at or above which gains are computed in parallel.
    pub parallel_threshold: usize,
}

impl std::default::Default for ControllerOption {
    fn default() -> Self {
        Self {
            silent_mode: true,
            msg_id_seed: 0,
            send_interval: Duration::ZERO,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}
