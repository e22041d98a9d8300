use crate::configuration;
use crate::controls::{self, ControlId};
use crate::device;
use crate::devices;
use crate::error::Error;
use crate::formats;
use crate::modes;
use crate::registers::{self, Register};
use crate::tables;
use crate::timing;
use crate::types::{FrameSize, MediaBusFormat, PadFormat, Rectangle};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pad {
    Image = 0,
    Metadata = 1,
}

impl TryFrom<u32> for Pad {
    type Error = Error;

    fn try_from(index: u32) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Self::Image),
            1 => Ok(Self::Metadata),
            index => Err(Error::InvalidArgument(format!("no pad {index}"))),
        }
    }
}

/// Format slot: `Proposed` is the speculative copy used while negotiating,
/// `Active` drives the hardware.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Which {
    Proposed,
    Active,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionTarget {
    Crop,
    CropDefault,
    CropBounds,
    NativeSize,
}

impl TryFrom<u32> for SelectionTarget {
    type Error = Error;

    fn try_from(target: u32) -> Result<Self, Self::Error> {
        match target {
            0x0000 => Ok(Self::Crop),
            0x0001 => Ok(Self::CropDefault),
            0x0002 => Ok(Self::CropBounds),
            0x0003 => Ok(Self::NativeSize),
            target => Err(Error::InvalidArgument(format!(
                "unsupported selection target 0x{target:04x}"
            ))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PowerState {
    Off,
    /// Powered but not in use, register writes are deferred.
    Idle,
    Active,
}

#[derive(Debug, Clone, Copy)]
struct Proposed {
    image: PadFormat,
    metadata: PadFormat,
    crop: Rectangle,
}

impl Proposed {
    fn new(hflip: bool, vflip: bool) -> Self {
        let mode = modes::default_mode();
        Self {
            image: PadFormat::new(
                mode.width,
                mode.height,
                formats::resolve(MediaBusFormat::Srggb12, hflip, vflip),
            ),
            metadata: embedded_format(),
            crop: modes::PIXEL_ARRAY,
        }
    }
}

fn embedded_format() -> PadFormat {
    PadFormat::new(
        modes::EMBEDDED_LINE_WIDTH,
        modes::EMBEDDED_LINES,
        MediaBusFormat::SensorData,
    )
}

struct State<Bus, Supply> {
    transport: Bus,
    power: Supply,
    device_type: devices::Type,
    configuration: configuration::Configuration,
    mode: &'static modes::Mode,
    format_code: MediaBusFormat,
    controls: controls::Controls,
    power_state: PowerState,
    streaming: bool,
    common_registers_written: bool,
    long_exposure_shift: u32,
    proposed: Proposed,
}

impl<Bus: device::Transport, Supply: device::Power> State<Bus, Supply> {
    fn power_on(&mut self) -> Result<(), Error> {
        if self.power_state != PowerState::Off {
            return Ok(());
        }
        if let Err(error) = self.power.power_on() {
            log::error!("failed to power on ({error:?})");
            let _ = self.power.power_off();
            return Err(Error::Power(format!("{error:?}")));
        }
        std::thread::sleep(std::time::Duration::from_micros(
            self.configuration.power_on_delay_us,
        ));
        self.power_state = PowerState::Idle;
        Ok(())
    }

    fn power_off(&mut self) -> Result<(), Error> {
        self.power_state = PowerState::Off;
        self.common_registers_written = false;
        self.power
            .power_off()
            .map_err(|error| Error::Power(format!("{error:?}")))
    }

    fn hflip(&self) -> bool {
        self.controls.hflip()
    }

    fn vflip(&self) -> bool {
        self.controls.vflip()
    }

    /// Pushes one recorded control value to the sensor. Does nothing unless
    /// the sensor is in use.
    fn apply(&mut self, id: ControlId) -> Result<(), Error> {
        if self.power_state != PowerState::Active {
            return Ok(());
        }
        let value = self.controls.get(id).value as u32;
        match id {
            ControlId::PixelRate | ControlId::LinkFrequency => Ok(()),
            ControlId::VerticalBlank => {
                let frame_length = timing::split_frame_length(self.mode.height + value);
                self.long_exposure_shift = frame_length.long_exposure_shift;
                registers::FrameLength {
                    value: frame_length.value,
                }
                .write(&mut self.transport)?;
                registers::LongExposureShift {
                    value: frame_length.long_exposure_shift,
                }
                .write(&mut self.transport)
            }
            ControlId::HorizontalBlank => registers::LineLength {
                value: self.mode.width + value,
            }
            .write(&mut self.transport),
            ControlId::Exposure => registers::Exposure {
                value: value >> self.long_exposure_shift,
            }
            .write(&mut self.transport),
            ControlId::AnalogueGain => {
                registers::AnalogGain { value }.write(&mut self.transport)
            }
            ControlId::DigitalGain => {
                registers::DigitalGain { value }.write(&mut self.transport)
            }
            ControlId::HorizontalFlip | ControlId::VerticalFlip => registers::Orientation {
                value: self.hflip() as u32 | (self.vflip() as u32) << 1,
            }
            .write(&mut self.transport),
            ControlId::TestPattern => registers::TestPattern {
                value: controls::TestPattern::from_index(self.controls.test_pattern.value)
                    .unwrap_or_default()
                    .register_value(),
            }
            .write(&mut self.transport),
            ControlId::TestPatternRed => {
                registers::TestPatternRed { value }.write(&mut self.transport)
            }
            ControlId::TestPatternGreenRed => {
                registers::TestPatternGreenRed { value }.write(&mut self.transport)
            }
            ControlId::TestPatternBlue => {
                registers::TestPatternBlue { value }.write(&mut self.transport)
            }
            ControlId::TestPatternGreenBlue => {
                registers::TestPatternGreenBlue { value }.write(&mut self.transport)
            }
        }
    }

    /// The exposure register holds `exposure >> long_exposure_shift`, so it
    /// is rewritten after the frame length whenever either side moved.
    /// `previous_shift` is the shift the hardware currently holds.
    fn vertical_blank_changed(&mut self, previous_shift: u32) -> Result<(), Error> {
        let clamped = self.controls.adjust_exposure_range(self.mode);
        self.apply(ControlId::VerticalBlank)?;
        if clamped || self.long_exposure_shift != previous_shift {
            self.apply(ControlId::Exposure)?;
        }
        Ok(())
    }

    fn set_framing_limits(&mut self) -> Result<(), Error> {
        let previous_shift = self.long_exposure_shift;
        self.long_exposure_shift = 0;
        let limits = timing::framing_limits(self.mode);
        self.controls.vblank.modify_range(
            limits.vblank_min,
            limits.vblank_max,
            1,
            limits.vblank_default,
        );
        self.controls.vblank.set(limits.vblank_default);
        // Height may have changed even when blanking did not.
        self.vertical_blank_changed(previous_shift)?;
        if self.controls.hblank.modify_range(
            limits.hblank_min,
            limits.hblank_max,
            1,
            limits.hblank_min,
        ) {
            self.apply(ControlId::HorizontalBlank)?;
        }
        if self.controls.hblank.set(limits.hblank_min) {
            self.apply(ControlId::HorizontalBlank)?;
        }
        Ok(())
    }

    fn start_streaming(&mut self) -> Result<(), Error> {
        if !self.common_registers_written {
            registers::write_list(&mut self.transport, tables::COMMON)
                .and_then(|()| {
                    registers::write_list(
                        &mut self.transport,
                        self.device_type.extra_registers(),
                    )
                })
                .map_err(|error| {
                    log::error!("failed to set common settings ({error})");
                    error
                })?;
            self.common_registers_written = true;
        }
        registers::write_list(&mut self.transport, self.mode.registers).map_err(|error| {
            log::error!(
                "failed to set mode {}x{} ({error})",
                self.mode.width,
                self.mode.height
            );
            error
        })?;
        let dpc = self.configuration.dpc_enable as u32;
        registers::DpcCoupletCorrection { value: dpc }.write(&mut self.transport)?;
        registers::DpcSingleCorrection { value: dpc }.write(&mut self.transport)?;
        for id in controls::Controls::REPLAY_ORDER {
            self.apply(id)?;
        }
        let trigger_mode = self.configuration.effective_trigger_mode();
        registers::McMode {
            value: (trigger_mode != configuration::TriggerMode::Standalone) as u32,
        }
        .write(&mut self.transport)?;
        registers::MsSel {
            value: (trigger_mode != configuration::TriggerMode::Sink) as u32,
        }
        .write(&mut self.transport)?;
        registers::XvsIoCtrl {
            value: (trigger_mode == configuration::TriggerMode::Source) as u32,
        }
        .write(&mut self.transport)?;
        registers::ExtoutEn {
            value: (trigger_mode == configuration::TriggerMode::Source) as u32,
        }
        .write(&mut self.transport)?;
        registers::ModeSelect {
            value: registers::MODE_STREAMING,
        }
        .write(&mut self.transport)
    }

    fn stop_streaming(&mut self) {
        if let Err(error) = (registers::ModeSelect {
            value: registers::MODE_STANDBY,
        })
        .write(&mut self.transport)
        {
            log::error!("failed to set stream ({error})");
        }
        // XVS keeps a weak pull-up once the output is released.
        if let Err(error) = (registers::ExtoutEn { value: 0 }).write(&mut self.transport) {
            log::error!("failed to release XVS ({error})");
        }
    }

    fn begin_streaming(&mut self) -> Result<(), Error> {
        self.power_state = PowerState::Active;
        let result = self.start_streaming();
        if let Err(error) = &result {
            log::error!("failed to start streaming ({error})");
        }
        result
    }
}

/// One managed sensor.
///
/// Every public operation takes the internal lock for its whole duration.
pub struct Sensor<Bus: device::Transport, Supply: device::Power> {
    state: std::sync::Mutex<State<Bus, Supply>>,
}

impl<Bus: device::Transport, Supply: device::Power> Sensor<Bus, Supply> {
    /// Powers the sensor up, checks its chip id and leaves it powered down
    /// with the default mode selected.
    pub fn attach(
        transport: Bus,
        power: Supply,
        device_type: devices::Type,
        configuration: configuration::Configuration,
    ) -> Result<Self, Error> {
        let controls = controls::Controls::new(&configuration);
        let mut state = State {
            transport,
            power,
            device_type,
            configuration,
            mode: modes::default_mode(),
            format_code: MediaBusFormat::Srggb12,
            controls,
            power_state: PowerState::Off,
            streaming: false,
            common_registers_written: false,
            long_exposure_shift: 0,
            proposed: Proposed::new(false, false),
        };
        state.power_on()?;
        let expected = device_type.chip_id();
        let found = match registers::ChipId::default().read(&mut state.transport) {
            Ok(found) => found,
            Err(error) => {
                log::error!("failed to read chip id ({error})");
                let _ = state.power_off();
                return Err(error);
            }
        };
        if found != expected {
            log::error!("chip id mismatch: 0x{expected:04x} != 0x{found:04x}");
            let _ = state.power_off();
            return Err(Error::IdentityMismatch { expected, found });
        }
        log::info!("device found is {}", device_type.name());
        state.power_off()?;
        state.set_framing_limits()?;
        Ok(Self {
            state: std::sync::Mutex::new(state),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State<Bus, Supply>> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Seeds the proposed slots of a new file handle.
    pub fn open(&self) {
        let mut state = self.lock();
        state.proposed = Proposed::new(state.hflip(), state.vflip());
    }

    pub fn enumerate_formats(&self, pad: Pad) -> Vec<MediaBusFormat> {
        let state = self.lock();
        match pad {
            Pad::Image => formats::CODES
                .iter()
                .step_by(4)
                .map(|code| formats::resolve(*code, state.hflip(), state.vflip()))
                .collect(),
            Pad::Metadata => vec![MediaBusFormat::SensorData],
        }
    }

    pub fn enumerate_sizes(&self, pad: Pad, code: MediaBusFormat) -> Result<Vec<FrameSize>, Error> {
        let state = self.lock();
        match pad {
            Pad::Image => {
                if code != formats::resolve(code, state.hflip(), state.vflip()) {
                    return Err(Error::InvalidArgument(format!(
                        "{code:?} does not match the current orientation"
                    )));
                }
                Ok(modes::lookup(code)
                    .0
                    .iter()
                    .map(|mode| FrameSize {
                        min_width: mode.width,
                        max_width: mode.width,
                        min_height: mode.height,
                        max_height: mode.height,
                    })
                    .collect())
            }
            Pad::Metadata => {
                if code != MediaBusFormat::SensorData {
                    return Err(Error::InvalidArgument(format!(
                        "{code:?} is not an embedded data format"
                    )));
                }
                Ok(vec![FrameSize {
                    min_width: modes::EMBEDDED_LINE_WIDTH,
                    max_width: modes::EMBEDDED_LINE_WIDTH,
                    min_height: modes::EMBEDDED_LINES,
                    max_height: modes::EMBEDDED_LINES,
                }])
            }
        }
    }

    pub fn get_format(&self, pad: Pad, which: Which) -> PadFormat {
        let state = self.lock();
        match (pad, which) {
            (Pad::Image, Which::Proposed) => PadFormat {
                code: formats::resolve(
                    state.proposed.image.code,
                    state.hflip(),
                    state.vflip(),
                ),
                ..state.proposed.image
            },
            (Pad::Metadata, Which::Proposed) => PadFormat {
                code: MediaBusFormat::SensorData,
                ..state.proposed.metadata
            },
            (Pad::Image, Which::Active) => PadFormat::new(
                state.mode.width,
                state.mode.height,
                formats::resolve(state.format_code, state.hflip(), state.vflip()),
            ),
            (Pad::Metadata, Which::Active) => embedded_format(),
        }
    }

    /// Resolves `request` to the nearest supported format. Committing an
    /// active image format with a new mode re-derives blanking and exposure
    /// limits straight away.
    pub fn set_format(
        &self,
        pad: Pad,
        which: Which,
        request: PadFormat,
    ) -> Result<PadFormat, Error> {
        let mut state = self.lock();
        match pad {
            Pad::Image => {
                let code = formats::resolve(request.code, state.hflip(), state.vflip());
                let (catalog, _) = modes::lookup(code);
                let mode = modes::find_nearest(catalog, request.width, request.height)
                    .ok_or_else(|| Error::Unsupported(format!("no mode for {code:?}")))?;
                let format = PadFormat::new(mode.width, mode.height, code);
                match which {
                    Which::Proposed => state.proposed.image = format,
                    Which::Active => {
                        if state.mode != mode {
                            log::debug!("mode changed to {}x{}", mode.width, mode.height);
                            state.mode = mode;
                            state.format_code = code;
                            state.set_framing_limits()?;
                        }
                    }
                }
                Ok(format)
            }
            Pad::Metadata => match which {
                Which::Proposed => {
                    state.proposed.metadata = request;
                    Ok(request)
                }
                Which::Active => Ok(embedded_format()),
            },
        }
    }

    pub fn get_selection(
        &self,
        pad: Pad,
        target: SelectionTarget,
        which: Which,
    ) -> Result<Rectangle, Error> {
        if pad != Pad::Image {
            return Err(Error::InvalidArgument(
                "selections are only defined on the image pad".to_owned(),
            ));
        }
        let state = self.lock();
        Ok(match target {
            SelectionTarget::Crop => match which {
                Which::Proposed => state.proposed.crop,
                Which::Active => state.mode.crop,
            },
            SelectionTarget::NativeSize => Rectangle {
                left: 0,
                top: 0,
                width: modes::NATIVE_WIDTH,
                height: modes::NATIVE_HEIGHT,
            },
            SelectionTarget::CropDefault | SelectionTarget::CropBounds => modes::PIXEL_ARRAY,
        })
    }

    pub fn set_stream(&self, enable: bool) -> Result<(), Error> {
        let mut state = self.lock();
        if state.streaming == enable {
            return Ok(());
        }
        if enable {
            state.power_on()?;
            if let Err(error) = state.begin_streaming() {
                if let Err(error) = state.power_off() {
                    log::error!("failed to power off ({error})");
                }
                return Err(error);
            }
        } else if state.power_state != PowerState::Off {
            state.stop_streaming();
            state.power_state = PowerState::Idle;
        }
        state.streaming = enable;
        state.controls.grab_flips(enable);
        log::debug!("streaming {}", if enable { "on" } else { "off" });
        Ok(())
    }

    /// Records the clamped value and, when the sensor is in use, writes it.
    ///
    /// The value stays recorded when the write fails so that the next start
    /// replays it.
    pub fn set_control(&self, id: ControlId, value: i32) -> Result<(), Error> {
        if id.is_read_only() {
            return Err(Error::ReadOnly(id));
        }
        let mut state = self.lock();
        if state.controls.get(id).grabbed {
            return Err(Error::Busy(id));
        }
        if !state.controls.get_mut(id).set(value) {
            return Ok(());
        }
        if id == ControlId::VerticalBlank {
            let previous_shift = state.long_exposure_shift;
            state.vertical_blank_changed(previous_shift)
        } else {
            state.apply(id)
        }
    }

    pub fn set_control_raw(&self, id: u32, value: i32) -> Result<(), Error> {
        match ControlId::from_raw(id) {
            Some(id) => self.set_control(id, value),
            None => {
                log::info!("ctrl(id: 0x{id:x}, val: 0x{value:x}) is not handled");
                Err(Error::Unsupported(format!("control 0x{id:08x}")))
            }
        }
    }

    pub fn control(&self, id: ControlId) -> controls::Control {
        *self.lock().controls.get(id)
    }

    /// Stops the sensor if needed and removes power. Streaming resumes on
    /// `resume`.
    pub fn suspend(&self) -> Result<(), Error> {
        let mut state = self.lock();
        if state.streaming {
            state.stop_streaming();
        }
        state.power_off()
    }

    pub fn resume(&self) -> Result<(), Error> {
        let mut state = self.lock();
        if state.power_state != PowerState::Off {
            return Ok(());
        }
        state.power_on()?;
        if !state.streaming {
            return Ok(());
        }
        if let Err(error) = state.begin_streaming() {
            state.stop_streaming();
            state.streaming = false;
            state.controls.grab_flips(false);
            if let Err(error) = state.power_off() {
                log::error!("failed to power off ({error})");
            }
            return Err(error);
        }
        Ok(())
    }

    pub fn mode(&self) -> &'static modes::Mode {
        self.lock().mode
    }

    pub fn long_exposure_shift(&self) -> u32 {
        self.lock().long_exposure_shift
    }

    pub fn is_streaming(&self) -> bool {
        self.lock().streaming
    }

    pub fn power_state(&self) -> PowerState {
        self.lock().power_state
    }

    pub fn device_type(&self) -> devices::Type {
        self.lock().device_type
    }

    pub fn configuration(&self) -> configuration::Configuration {
        self.lock().configuration.clone()
    }
}

impl<Bus: device::Transport, Supply: device::Power> Drop for Sensor<Bus, Supply> {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if state.streaming {
            state.stop_streaming();
            state.streaming = false;
        }
        if let Err(error) = state.power_off() {
            log::error!("failed to power off ({error})");
        }
    }
}
