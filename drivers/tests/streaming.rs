mod common;

use imx477_drivers::sensor::PowerState;
use imx477_drivers::tables;
use imx477_drivers::{ControlId, Error, TriggerMode};

const MODE_SELECT: u16 = 0x0100;
const ORIENTATION: u16 = 0x0101;
const EXPOSURE: u16 = 0x0202;
const ANALOG_GAIN: u16 = 0x0204;
const FRAME_LENGTH: u16 = 0x0340;
const LINE_LENGTH: u16 = 0x0342;
const TEST_PATTERN: u16 = 0x0600;
const LONG_EXPOSURE_SHIFT: u16 = 0x3100;
const MC_MODE: u16 = 0x3f0b;
const MS_SEL: u16 = 0x3041;
const XVS_IO_CTRL: u16 = 0x3040;
const EXTOUT_EN: u16 = 0x4b81;

#[test]
fn start_sequence_order() -> Result<(), Error> {
    let (sensor, recorder, supply) = common::attach();
    recorder.clear();
    sensor.set_stream(true)?;
    let writes = recorder.writes();
    let common_length = tables::COMMON.len();
    let mode_length = tables::MODE_4056X3040.len();
    assert_eq!(
        writes[..common_length],
        tables::COMMON
            .iter()
            .map(|(address, value)| (*address, *value as u32))
            .collect::<Vec<_>>()[..]
    );
    assert_eq!(
        writes[common_length..common_length + mode_length],
        tables::MODE_4056X3040
            .iter()
            .map(|(address, value)| (*address, *value as u32))
            .collect::<Vec<_>>()[..]
    );
    let rest = &writes[common_length + mode_length..];
    assert_eq!(rest[0], (0x0b05, 1));
    assert_eq!(rest[1], (0x0b06, 1));
    assert_eq!(rest[2], (FRAME_LENGTH, 3500));
    assert_eq!(rest[3], (LONG_EXPOSURE_SHIFT, 0));
    assert_eq!(rest[4], (LINE_LENGTH, 0x5dc0));
    assert_eq!(rest[5], (EXPOSURE, 0x640));
    assert_eq!(
        rest[rest.len() - 5..],
        [
            (MC_MODE, 0),
            (MS_SEL, 1),
            (XVS_IO_CTRL, 0),
            (EXTOUT_EN, 0),
            (MODE_SELECT, 1)
        ]
    );
    assert!(sensor.is_streaming());
    assert_eq!(sensor.power_state(), PowerState::Active);
    assert_eq!(supply.counts().on, 2);
    Ok(())
}

#[test]
fn extra_registers_follow_the_common_list() -> Result<(), Error> {
    let (sensor, recorder, _) = common::attach_with(
        imx477_drivers::Type::SonyImx378,
        common::configuration(),
    );
    sensor.set_stream(true)?;
    let writes = recorder.writes();
    let common_length = tables::COMMON.len();
    assert_eq!(
        writes[common_length..common_length + 3],
        [(0x3e35, 0x01), (0x4421, 0x08), (0x3ff9, 0x00)]
    );
    Ok(())
}

#[test]
fn trigger_modes() -> Result<(), Error> {
    for (configuration, expected) in [
        (
            imx477_drivers::Configuration {
                trigger_mode: TriggerMode::Sink,
                ..common::configuration()
            },
            [1, 0, 0, 0],
        ),
        (
            imx477_drivers::Configuration {
                trigger_mode: TriggerMode::Sink,
                trigger_mode_override: Some(TriggerMode::Source),
                ..common::configuration()
            },
            [1, 1, 1, 1],
        ),
    ] {
        let (sensor, recorder, _) =
            common::attach_with(imx477_drivers::Type::SonyImx477, configuration);
        sensor.set_stream(true)?;
        assert_eq!(
            [
                recorder.last_write(MC_MODE),
                recorder.last_write(MS_SEL),
                recorder.last_write(XVS_IO_CTRL),
                recorder.last_write(EXTOUT_EN),
            ],
            expected.map(Some)
        );
    }
    Ok(())
}

#[test]
fn defect_correction_can_be_disabled() -> Result<(), Error> {
    let (sensor, recorder, _) = common::attach_with(
        imx477_drivers::Type::SonyImx477,
        imx477_drivers::Configuration {
            dpc_enable: false,
            ..common::configuration()
        },
    );
    sensor.set_stream(true)?;
    assert_eq!(recorder.last_write(0x0b05), Some(0));
    assert_eq!(recorder.last_write(0x0b06), Some(0));
    Ok(())
}

#[test]
fn flips_are_locked_while_streaming() -> Result<(), Error> {
    let (sensor, recorder, _) = common::attach();
    sensor.set_control(ControlId::HorizontalFlip, 1)?;
    assert!(!recorder.wrote(ORIENTATION));
    sensor.set_stream(true)?;
    assert_eq!(recorder.last_write(ORIENTATION), Some(1));
    assert_eq!(
        sensor.set_control(ControlId::VerticalFlip, 1),
        Err(Error::Busy(ControlId::VerticalFlip))
    );
    assert!(sensor.control(ControlId::HorizontalFlip).grabbed);
    sensor.set_stream(false)?;
    assert!(!sensor.control(ControlId::HorizontalFlip).grabbed);
    sensor.set_control(ControlId::VerticalFlip, 1)?;
    assert_eq!(sensor.control(ControlId::VerticalFlip).value, 1);
    sensor.set_stream(true)?;
    assert_eq!(recorder.last_write(ORIENTATION), Some(3));
    Ok(())
}

#[test]
fn common_registers_are_written_once_per_power_cycle() -> Result<(), Error> {
    let (sensor, recorder, _) = common::attach();
    recorder.clear();
    sensor.set_stream(true)?;
    let first = recorder.writes().len();
    sensor.set_stream(false)?;
    assert_eq!(sensor.power_state(), PowerState::Idle);
    recorder.clear();
    sensor.set_stream(true)?;
    let second = recorder.writes().len();
    assert_eq!(first - second, tables::COMMON.len());
    assert_eq!(recorder.writes()[0], {
        let (address, value) = tables::MODE_4056X3040[0];
        (address, value as u32)
    });

    sensor.set_stream(false)?;
    sensor.suspend()?;
    assert_eq!(sensor.power_state(), PowerState::Off);
    recorder.clear();
    sensor.set_stream(true)?;
    assert_eq!(recorder.writes().len(), first);
    Ok(())
}

#[test]
fn stop_writes_standby_then_releases_xvs() -> Result<(), Error> {
    let (sensor, recorder, _) = common::attach();
    sensor.set_stream(true)?;
    recorder.clear();
    sensor.set_stream(false)?;
    assert_eq!(recorder.writes(), vec![(MODE_SELECT, 0), (EXTOUT_EN, 0)]);
    recorder.clear();
    sensor.set_stream(false)?;
    assert!(recorder.writes().is_empty());
    Ok(())
}

#[test]
fn stop_failures_are_not_fatal() -> Result<(), Error> {
    let (sensor, recorder, _) = common::attach();
    sensor.set_stream(true)?;
    recorder.fail_on(MODE_SELECT);
    sensor.set_stream(false)?;
    assert!(!sensor.is_streaming());
    assert_eq!(recorder.last_write(EXTOUT_EN), Some(0));
    Ok(())
}

#[test]
fn exposure_is_clamped_to_the_frame() -> Result<(), Error> {
    let (sensor, recorder, _) = common::attach();
    sensor.set_stream(true)?;
    sensor.set_control(ControlId::Exposure, 100_000)?;
    assert_eq!(sensor.control(ControlId::Exposure).value, 3040 + 460 - 22);
    assert_eq!(recorder.last_write(EXPOSURE), Some(3478));

    sensor.set_control(ControlId::VerticalBlank, 1000)?;
    assert_eq!(sensor.control(ControlId::Exposure).maximum, 3040 + 1000 - 22);
    assert_eq!(recorder.last_write(FRAME_LENGTH), Some(4040));
    sensor.set_control(ControlId::Exposure, 100_000)?;
    assert_eq!(recorder.last_write(EXPOSURE), Some(4018));

    // Shrinking the frame pulls exposure down with it.
    sensor.set_control(ControlId::VerticalBlank, 500)?;
    assert_eq!(sensor.control(ControlId::Exposure).value, 3040 + 500 - 22);
    assert_eq!(recorder.last_write(EXPOSURE), Some(3518));

    sensor.set_stream(false)?;
    assert!(!sensor.control(ControlId::HorizontalFlip).grabbed);
    assert!(!sensor.control(ControlId::VerticalFlip).grabbed);
    Ok(())
}

#[test]
fn long_frames_shift_exposure() -> Result<(), Error> {
    let (sensor, recorder, _) = common::attach();
    sensor.set_stream(true)?;
    sensor.set_control(ControlId::VerticalBlank, 0xffdd - 3040)?;
    assert_eq!(sensor.long_exposure_shift(), 1);
    assert_eq!(recorder.last_write(FRAME_LENGTH), Some(0xffdd >> 1));
    assert_eq!(recorder.last_write(LONG_EXPOSURE_SHIFT), Some(1));
    sensor.set_control(ControlId::Exposure, 10_000)?;
    assert_eq!(recorder.last_write(EXPOSURE), Some(5_000));

    sensor.set_control(ControlId::VerticalBlank, 1000)?;
    assert_eq!(sensor.long_exposure_shift(), 0);
    assert_eq!(recorder.last_write(LONG_EXPOSURE_SHIFT), Some(0));
    Ok(())
}

#[test]
fn values_set_in_standby_are_replayed() -> Result<(), Error> {
    let (sensor, recorder, _) = common::attach();
    sensor.set_control(ControlId::AnalogueGain, 500)?;
    sensor.set_control(ControlId::DigitalGain, 0)?;
    sensor.set_control(ControlId::TestPattern, 1)?;
    sensor.set_control(ControlId::HorizontalBlank, 20_000)?;
    assert!(recorder.writes().is_empty());
    assert_eq!(sensor.control(ControlId::DigitalGain).value, 0x0100);
    sensor.set_stream(true)?;
    assert_eq!(recorder.last_write(ANALOG_GAIN), Some(500));
    assert_eq!(recorder.last_write(0x020e), Some(0x0100));
    assert_eq!(recorder.last_write(TEST_PATTERN), Some(2));
    assert_eq!(recorder.last_write(LINE_LENGTH), Some(4056 + 20_000));
    Ok(())
}

#[test]
fn failed_writes_keep_the_value() -> Result<(), Error> {
    let (sensor, recorder, _) = common::attach();
    sensor.set_stream(true)?;
    recorder.fail_on(ANALOG_GAIN);
    assert!(matches!(
        sensor.set_control(ControlId::AnalogueGain, 300),
        Err(Error::Io {
            address: ANALOG_GAIN,
            ..
        })
    ));
    assert_eq!(sensor.control(ControlId::AnalogueGain).value, 300);
    recorder.heal();
    sensor.set_stream(false)?;
    sensor.set_stream(true)?;
    assert_eq!(recorder.last_write(ANALOG_GAIN), Some(300));
    Ok(())
}

#[test]
fn unknown_and_read_only_controls() {
    let (sensor, _, _) = common::attach();
    assert!(matches!(
        sensor.set_control_raw(0x0098_0900, 1),
        Err(Error::Unsupported(_))
    ));
    assert_eq!(
        sensor.set_control(ControlId::PixelRate, 1),
        Err(Error::ReadOnly(ControlId::PixelRate))
    );
    assert_eq!(sensor.set_control_raw(0x0098_0911, 2000), Ok(()));
    assert_eq!(sensor.control(ControlId::Exposure).value, 2000);
    assert_eq!(
        sensor.control(ControlId::PixelRate).value,
        840_000_000
    );
    assert_eq!(
        sensor.control(ControlId::LinkFrequency).value,
        450_000_000
    );
}

#[test]
fn register_list_failure_aborts_the_start() {
    let (sensor, recorder, supply) = common::attach();
    let address = tables::COMMON[5].0;
    let written = tables::COMMON
        .iter()
        .position(|(candidate, _)| *candidate == address)
        .unwrap();
    recorder.clear();
    recorder.fail_on(address);
    assert!(matches!(
        sensor.set_stream(true),
        Err(Error::Io { address: failed, .. }) if failed == address
    ));
    assert_eq!(recorder.writes().len(), written);
    assert!(!sensor.is_streaming());
    assert_eq!(sensor.power_state(), PowerState::Off);
    assert_eq!(supply.counts().on, supply.counts().off);
    assert!(!sensor.control(ControlId::HorizontalFlip).grabbed);
    recorder.heal();
    assert_eq!(sensor.set_stream(true), Ok(()));
}

#[test]
fn resume_restarts_streaming() -> Result<(), Error> {
    let (sensor, recorder, _) = common::attach();
    sensor.set_stream(true)?;
    sensor.suspend()?;
    assert!(sensor.is_streaming());
    assert_eq!(sensor.power_state(), PowerState::Off);
    assert_eq!(recorder.last_write(MODE_SELECT), Some(0));
    recorder.clear();
    sensor.resume()?;
    assert!(recorder.writes().len() > tables::COMMON.len());
    assert_eq!(recorder.last_write(MODE_SELECT), Some(1));
    assert_eq!(sensor.power_state(), PowerState::Active);
    Ok(())
}

#[test]
fn failed_resume_falls_back_to_standby() -> Result<(), Error> {
    let (sensor, recorder, supply) = common::attach();
    sensor.set_stream(true)?;
    sensor.suspend()?;
    recorder.fail_on(tables::MODE_4056X3040[0].0);
    assert!(sensor.resume().is_err());
    assert!(!sensor.is_streaming());
    assert!(!sensor.control(ControlId::VerticalFlip).grabbed);
    assert_eq!(sensor.power_state(), PowerState::Off);
    assert_eq!(supply.counts().on, supply.counts().off);
    Ok(())
}

#[test]
fn drop_stops_and_powers_off() -> Result<(), Error> {
    let (sensor, recorder, supply) = common::attach();
    sensor.set_stream(true)?;
    recorder.clear();
    drop(sensor);
    assert_eq!(recorder.writes(), vec![(MODE_SELECT, 0), (EXTOUT_EN, 0)]);
    assert!(supply.counts().off >= supply.counts().on);
    Ok(())
}

#[test]
fn stopping_a_suspended_sensor_keeps_it_unpowered() -> Result<(), Error> {
    let (sensor, recorder, supply) = common::attach();
    sensor.set_stream(true)?;
    sensor.suspend()?;
    let powered_on = supply.counts().on;
    recorder.clear();
    sensor.set_stream(false)?;
    assert!(recorder.writes().is_empty());
    assert!(!sensor.is_streaming());
    assert!(!sensor.control(ControlId::HorizontalFlip).grabbed);
    assert_eq!(sensor.power_state(), PowerState::Off);

    sensor.set_stream(true)?;
    assert_eq!(supply.counts().on, powered_on + 1);
    assert_eq!(recorder.writes()[0], {
        let (address, value) = tables::COMMON[0];
        (address, value as u32)
    });
    Ok(())
}

#[test]
fn exposure_register_tracks_the_long_exposure_shift() -> Result<(), Error> {
    let (sensor, recorder, _) = common::attach();
    sensor.set_stream(true)?;

    sensor.set_control(ControlId::Exposure, 3000)?;
    sensor.set_control(ControlId::VerticalBlank, 200_000)?;
    assert_eq!(sensor.long_exposure_shift(), 2);
    assert_eq!(recorder.last_write(LONG_EXPOSURE_SHIFT), Some(2));
    assert_eq!(recorder.last_write(EXPOSURE), Some(3000 >> 2));

    sensor.set_control(ControlId::Exposure, 150_000)?;
    assert_eq!(recorder.last_write(EXPOSURE), Some(150_000 >> 2));

    sensor.set_control(ControlId::VerticalBlank, 460)?;
    assert_eq!(sensor.long_exposure_shift(), 0);
    assert_eq!(sensor.control(ControlId::Exposure).value, 3478);
    assert_eq!(recorder.last_write(EXPOSURE), Some(3478));
    Ok(())
}

#[test]
fn resume_without_suspend_is_a_no_op() -> Result<(), Error> {
    let (sensor, recorder, supply) = common::attach();
    sensor.set_stream(true)?;
    let counts = supply.counts();
    recorder.clear();
    sensor.resume()?;
    assert!(recorder.writes().is_empty());
    assert_eq!(supply.counts(), counts);
    assert!(sensor.is_streaming());
    Ok(())
}

#[test]
fn line_length_stays_in_register_range() -> Result<(), Error> {
    let (sensor, recorder, _) = common::attach();
    sensor.set_stream(true)?;
    sensor.set_control(ControlId::HorizontalBlank, i32::MAX)?;
    assert_eq!(
        sensor.control(ControlId::HorizontalBlank).value,
        0xfff0 - 4056
    );
    assert_eq!(recorder.last_write(LINE_LENGTH), Some(0xfff0));
    Ok(())
}

#[test]
fn mode_change_clears_the_shift_on_exposure() -> Result<(), Error> {
    use imx477_drivers::types::{MediaBusFormat, PadFormat};

    let (sensor, recorder, _) = common::attach();
    sensor.set_stream(true)?;
    sensor.set_control(ControlId::VerticalBlank, 200_000)?;
    assert_eq!(recorder.last_write(EXPOSURE), Some(0x640 >> 2));
    sensor.set_format(
        imx477_drivers::Pad::Image,
        imx477_drivers::Which::Active,
        PadFormat::new(2028, 1520, MediaBusFormat::Srggb12),
    )?;
    assert_eq!(sensor.long_exposure_shift(), 0);
    assert_eq!(recorder.last_write(LONG_EXPOSURE_SHIFT), Some(0));
    assert_eq!(recorder.last_write(EXPOSURE), Some(0x640));
    Ok(())
}
