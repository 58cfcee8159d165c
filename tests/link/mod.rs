use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use autd3_pipeline::prelude::*;

use super::{geometry, init_tracing, wait_until};

/// Accepts a fixed number of frames and then fails every send.
struct Flaky {
    is_open: bool,
    remaining: usize,
    closed: Arc<AtomicBool>,
}

impl Flaky {
    fn new(remaining: usize) -> (Self, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        (
            Self {
                is_open: false,
                remaining,
                closed: closed.clone(),
            },
            closed,
        )
    }
}

impl Link for Flaky {
    fn open(&mut self, _: &Geometry) -> Result<(), LinkError> {
        self.is_open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.is_open = false;
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn send(&mut self, _: &[u8]) -> Result<(), LinkError> {
        if self.remaining == 0 {
            return Err(LinkError::Send("cable unplugged".to_owned()));
        }
        self.remaining -= 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.is_open
    }
}

struct Refused;

impl Link for Refused {
    fn open(&mut self, _: &Geometry) -> Result<(), LinkError> {
        Err(LinkError::Open("no adapter".to_owned()))
    }

    fn close(&mut self) -> Result<(), LinkError> {
        Ok(())
    }

    fn send(&mut self, _: &[u8]) -> Result<(), LinkError> {
        Err(LinkError::Closed)
    }

    fn is_open(&self) -> bool {
        false
    }
}

#[test]
fn open_failure() {
    let mut autd = Controller::new(geometry(1));
    assert!(matches!(
        autd.open(Refused),
        Err(PipelineError::Link(LinkError::Open(_)))
    ));
    assert!(!autd.is_open());
    assert!(autd.close().is_ok());
}

#[test]
fn sync_send_failure_closes_pipeline() -> anyhow::Result<()> {
    init_tracing();

    let mut autd = Controller::new(geometry(1));
    let (link, closed) = Flaky::new(1);
    autd.open(link)?;

    autd.append_gain_sync(&mut GainProgram::new(Null))?;
    assert!(matches!(
        autd.append_gain_sync(&mut GainProgram::new(Null)),
        Err(PipelineError::Link(LinkError::Send(_)))
    ));
    assert!(!autd.is_open());
    assert!(closed.load(Ordering::Acquire));

    assert!(matches!(
        autd.append_modulation_sync(&mut Modulation::constant(0xFF)),
        Err(PipelineError::NotOpen)
    ));
    autd.close()?;
    Ok(())
}

#[test]
fn async_send_failure_closes_pipeline() -> anyhow::Result<()> {
    init_tracing();

    let mut autd = Controller::new(geometry(1));
    let (link, closed) = Flaky::new(0);
    autd.open(link)?;

    autd.append_gain(Null)?;
    wait_until(|| !autd.is_open())?;
    wait_until(|| closed.load(Ordering::Acquire))?;
    assert!(matches!(autd.append_gain(Null), Err(PipelineError::NotOpen)));

    let link = Recorder::new();
    let record = link.record();
    autd.open(link)?;
    assert!(autd.is_open());
    autd.append_gain_sync(&mut GainProgram::new(Null))?;
    autd.close()?;
    assert_eq!(2, record.len());
    Ok(())
}

#[test]
fn work_queued_during_failure_is_discarded() -> anyhow::Result<()> {
    let mut autd = Controller::new(geometry(1));
    (0..50).try_for_each(|_| -> anyhow::Result<()> {
        let (link, _) = Flaky::new(3);
        autd.open(link)?;
        thread::scope(|s| {
            s.spawn(|| {
                while autd.append_gain(Null).is_ok()
                    && autd
                        .append_modulation(Modulation::from_buffer(vec![7; 10]))
                        .is_ok()
                {}
            });
            wait_until(|| !autd.is_open())
        })?;

        let link = Recorder::new();
        let record = link.record();
        autd.open(link)?;
        thread::sleep(Duration::from_millis(5));
        assert!(record.is_empty());
        Ok(())
    })?;
    autd.close()?;
    Ok(())
}

#[test]
fn boxed_link() -> anyhow::Result<()> {
    let mut autd = Controller::new(geometry(1));
    let link: Box<dyn Link> = Box::new(Recorder::new());
    autd.open(link)?;
    autd.append_modulation_sync(&mut Modulation::constant(0x80))?;
    autd.close()?;
    Ok(())
}
