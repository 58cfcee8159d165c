use std::{
    collections::VecDeque,
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::Duration,
};

use parking_lot::{Condvar, Mutex};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{debug, error, trace, warn};

use crate::{
    error::LinkError,
    frame,
    gain::GainProgram,
    link::Link,
    modulation::{Chunk, Modulation},
};

#[derive(Default)]
pub(crate) struct SendQueue {
    pub gains: VecDeque<GainProgram>,
    pub modulations: VecDeque<Modulation>,
}

impl SendQueue {
    fn is_empty(&self) -> bool {
        self.gains.is_empty() && self.modulations.is_empty()
    }

    fn clear(&mut self) {
        self.gains.clear();
        self.modulations.clear();
    }
}

/// State shared between the controller and its workers.
pub(crate) struct Shared {
    open: AtomicBool,
    silent_mode: AtomicBool,
    send_interval: Duration,
    msg_id: Mutex<SmallRng>,
    pub link: Mutex<Option<Box<dyn Link>>>,
    pub build_queue: Mutex<VecDeque<GainProgram>>,
    pub build_cond: Condvar,
    pub send_queue: Mutex<SendQueue>,
    pub send_cond: Condvar,
}

impl Shared {
    pub fn new(silent_mode: bool, send_interval: Duration, msg_id_seed: u64) -> Self {
        Self {
            open: AtomicBool::new(false),
            silent_mode: AtomicBool::new(silent_mode),
            send_interval,
            msg_id: Mutex::new(SmallRng::seed_from_u64(msg_id_seed)),
            link: Mutex::new(None),
            build_queue: Mutex::new(VecDeque::new()),
            build_cond: Condvar::new(),
            send_queue: Mutex::new(SendQueue::default()),
            send_cond: Condvar::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn start(&self, link: Box<dyn Link>, msg_id_seed: u64) {
        self.build_queue.lock().clear();
        self.send_queue.lock().clear();
        *self.link.lock() = Some(link);
        *self.msg_id.lock() = SmallRng::seed_from_u64(msg_id_seed);
        self.open.store(true, Ordering::Release);
    }

    pub fn silent_mode(&self) -> bool {
        self.silent_mode.load(Ordering::Relaxed)
    }

    pub fn set_silent_mode(&self, silent: bool) {
        self.silent_mode.store(silent, Ordering::Relaxed);
    }

    pub fn frame(
        &self,
        gain: Option<&GainProgram>,
        modulation: Option<&mut Modulation>,
    ) -> (Vec<u8>, Option<Chunk>) {
        let msg_id = self.msg_id.lock().random::<u8>();
        frame::encode(gain, modulation, self.silent_mode(), msg_id)
    }

    pub fn send(&self, frame: &[u8]) -> Result<(), LinkError> {
        match self.link.lock().as_mut() {
            Some(link) if link.is_open() => link.send(frame),
            _ => Err(LinkError::Closed),
        }
    }

    /// Marks the pipeline closed, discards queued work and wakes both workers.
    ///
    /// Returns `false` if the pipeline was already closed.
    pub fn stop(&self) -> bool {
        if !self.open.swap(false, Ordering::AcqRel) {
            return false;
        }
        // Taking each queue lock after the store guarantees a waiting worker observes it.
        self.build_queue.lock().clear();
        self.build_cond.notify_all();
        self.send_queue.lock().clear();
        self.send_cond.notify_all();
        true
    }

    /// Shuts the pipeline down after a transport failure.
    pub fn fail(&self, err: &LinkError) {
        if !self.stop() {
            debug!(%err, "send rejected after close");
            return;
        }
        error!(%err, "link failure, closing pipeline");
        if let Some(link) = self.link.lock().as_mut() {
            if let Err(err) = link.close() {
                warn!(%err, "failed to close link");
            }
        }
    }
}

pub(crate) fn build_loop(shared: &Shared) {
    debug!("build worker started");
    loop {
        let mut gain = {
            let mut queue = shared.build_queue.lock();
            shared
                .build_cond
                .wait_while(&mut queue, |q| q.is_empty() && shared.is_open());
            match queue.pop_front() {
                Some(gain) => gain,
                None => break,
            }
        };

        gain.build();

        {
            let mut queue = shared.send_queue.lock();
            if !shared.is_open() {
                break;
            }
            queue.gains.push_back(gain);
        }
        shared.send_cond.notify_all();
    }
    debug!("build worker exited");
}

pub(crate) fn send_loop(shared: &Shared) {
    debug!("send worker started");
    loop {
        let (gain, mut modulation) = {
            let mut queue = shared.send_queue.lock();
            shared
                .send_cond
                .wait_while(&mut queue, |q| q.is_empty() && shared.is_open());
            // Queues are flushed when the pipeline closes.
            if !shared.is_open() {
                break;
            }
            (queue.gains.pop_front(), queue.modulations.pop_front())
        };

        let (frame, chunk) = shared.frame(gain.as_ref(), modulation.as_mut());
        if let Err(err) = shared.send(&frame) {
            shared.fail(&err);
            break;
        }
        trace!(
            len = frame.len(),
            gain = gain.is_some(),
            mod_size = chunk.map(|c| c.len),
            "frame sent"
        );

        if let Some(mut m) = modulation {
            if chunk.is_some_and(|c| c.end) {
                m.rewind();
            } else {
                let mut queue = shared.send_queue.lock();
                if shared.is_open() {
                    queue.modulations.push_front(m);
                }
            }
        }

        if !shared.send_interval.is_zero() {
            thread::sleep(shared.send_interval);
        }
    }
    debug!("send worker exited");
}
