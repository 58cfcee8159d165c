use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use autd3_pipeline::{frame::ControlFlags, prelude::*};

use super::{geometry, init_tracing, wait_until};

fn expected_drives(geometry: &Geometry, gain: impl Gain + 'static) -> Vec<Drive> {
    let mut program = GainProgram::new(gain);
    program.set_geometry(Arc::new(geometry.clone()));
    program.build();
    let data = program.data().unwrap();
    geometry
        .iter()
        .flat_map(|dev| data[&dev.idx()].iter().copied())
        .collect()
}

#[test]
fn async_gains_in_submission_order() -> anyhow::Result<()> {
    init_tracing();

    let mut autd = Controller::new(geometry(2));
    let link = Recorder::new();
    let record = link.record();
    autd.open(link)?;

    let foci = [
        Point3::new(96., 70., 150.),
        Point3::new(0., 0., 100.),
        Point3::new(300., -20., 250.),
    ];
    foci.iter().try_for_each(|&p| autd.append_gain(Focus::new(p)))?;

    wait_until(|| record.len() >= foci.len())?;
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(foci.len(), record.len());

    let drives = record.drives();
    foci.iter().zip(drives.iter()).for_each(|(&p, d)| {
        assert_eq!(&expected_drives(autd.geometry(), Focus::new(p)), d);
    });

    autd.close()?;
    Ok(())
}

#[test]
fn sync_gain_follows_silent_mode() -> anyhow::Result<()> {
    let mut autd = Controller::new(geometry(1));
    let link = Recorder::new();
    let record = link.record();
    autd.open(link)?;
    assert!(autd.silent_mode());

    let mut gain = GainProgram::new(Focus::new(Point3::new(0., 0., 150.)));
    autd.append_gain_sync(&mut gain)?;
    autd.set_silent_mode(false);
    autd.append_gain_sync(&mut gain)?;
    assert!(gain.built());

    let headers = record.headers();
    assert_eq!(2, headers.len());
    assert_eq!(ControlFlags::SILENT, headers[0].control_flags());
    assert_eq!(ControlFlags::empty(), headers[1].control_flags());
    assert!(headers.iter().all(|h| h.modulation().is_empty()));

    let drives = record.drives();
    assert_eq!(drives[0], drives[1]);
    assert_eq!(
        expected_drives(autd.geometry(), Focus::new(Point3::new(0., 0., 150.))),
        drives[0]
    );

    autd.close()?;
    Ok(())
}

#[test]
fn prebuilt_gain_keeps_its_geometry() -> anyhow::Result<()> {
    let mut autd = Controller::new(geometry(2));
    let link = Recorder::new();
    let record = link.record();
    autd.open(link)?;

    let mut gain = GainProgram::new(Null);
    gain.set_geometry(Arc::new(autd.geometry().clone()));
    gain.build();
    autd.append_gain_sync(&mut gain)?;

    assert_eq!(2, record.drives()[0].len() / autd3_pipeline::defined::NUM_TRANS_IN_UNIT);
    autd.close()?;
    Ok(())
}

#[test]
fn close_silences_devices_last() -> anyhow::Result<()> {
    let mut autd = Controller::new(geometry(3));
    let link = Recorder::new();
    let record = link.record();
    autd.open(link)?;

    (0..10).try_for_each(|i| autd.append_gain(Focus::new(Point3::new(i as f32 * 10., 0., 150.))))?;
    autd.close()?;

    let drives = record.drives();
    assert!(!drives.is_empty());
    assert!(drives.last().unwrap().iter().all(|&d| d == Drive::NULL));

    let len = record.len();
    autd.close()?;
    assert_eq!(len, record.len());
    Ok(())
}

#[test]
fn drop_closes_link() -> anyhow::Result<()> {
    let link = Recorder::new();
    let record = link.record();
    {
        let mut autd = Controller::new(geometry(1));
        autd.open(link)?;
    }
    assert_eq!(1, record.len());
    assert!(record.drives()[0].iter().all(|&d| d == Drive::NULL));
    Ok(())
}

#[test]
fn reopen_restarts_message_ids() -> anyhow::Result<()> {
    let mut autd = Controller::with_option(
        geometry(1),
        ControllerOption {
            msg_id_seed: 42,
            ..Default::default()
        },
    );

    let first = Recorder::new();
    let first_record = first.record();
    autd.open(first)?;
    (0..4).try_for_each(|_| autd.append_gain_sync(&mut GainProgram::new(Null)))?;

    let second = Recorder::new();
    let second_record = second.record();
    autd.open(second)?;
    assert!(autd.is_open());
    (0..4).try_for_each(|_| autd.append_gain_sync(&mut GainProgram::new(Null)))?;
    autd.close()?;

    let ids = |r: &Record| r.headers().iter().take(4).map(|h| h.msg_id()).collect::<Vec<_>>();
    assert_eq!(ids(&first_record), ids(&second_record));
    assert_eq!(5, first_record.len());
    assert_eq!(5, second_record.len());
    Ok(())
}

#[test]
fn geometry_edited_between_sessions() -> anyhow::Result<()> {
    let mut autd = Controller::new(geometry(3));
    autd.geometry_mut().del_device(1);
    assert_eq!(2, autd.geometry().num_devices());
    assert_eq!(2, autd.geometry().device_id_for_device_idx(1));

    let link = Recorder::new();
    let record = link.record();
    autd.open(link)?;
    autd.append_gain_sync(&mut GainProgram::new(Focus::new(Point3::new(0., 0., 150.))))?;
    autd.close()?;

    assert_eq!(
        expected_drives(autd.geometry(), Focus::new(Point3::new(0., 0., 150.))),
        record.drives()[0]
    );
    Ok(())
}

#[test]
fn send_interval_paces_frames() -> anyhow::Result<()> {
    let interval = Duration::from_millis(20);
    let mut autd = Controller::with_option(
        geometry(1),
        ControllerOption {
            send_interval: interval,
            ..Default::default()
        },
    );
    assert_eq!(interval, autd.option().send_interval);
    let link = Recorder::new();
    let record = link.record();
    autd.open(link)?;

    let start = Instant::now();
    (0..5).try_for_each(|_| autd.append_modulation(Modulation::constant(0xFF)))?;
    wait_until(|| record.len() >= 5)?;
    assert!(start.elapsed() >= 4 * interval);

    autd.close()?;
    Ok(())
}

#[test]
fn closed_pipeline_rejects_work() {
    let autd = Controller::new(geometry(1));
    assert!(matches!(
        autd.append_gain(Null),
        Err(PipelineError::NotOpen)
    ));
    assert!(matches!(
        autd.append_modulation(Modulation::constant(0xFF)),
        Err(PipelineError::NotOpen)
    ));
}
