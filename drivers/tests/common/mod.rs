#![allow(dead_code)]

use imx477_drivers::device;
use imx477_drivers::registers;

#[derive(Default)]
struct Bus {
    registers: std::collections::HashMap<u16, u32>,
    writes: Vec<(u16, u32)>,
    reads: Vec<u16>,
    failing: std::collections::HashSet<u16>,
}

/// Register transport backed by a map, shared between the sensor and the
/// test through clones.
#[derive(Clone, Default)]
pub struct Recorder {
    bus: std::sync::Arc<std::sync::Mutex<Bus>>,
}

impl Recorder {
    pub fn with_chip_id(chip_id: u32) -> Self {
        let recorder = Self::default();
        recorder.bus().registers.insert(0x0016, chip_id);
        recorder
    }

    fn bus(&self) -> std::sync::MutexGuard<'_, Bus> {
        self.bus.lock().unwrap()
    }

    /// Transfers on `address` fail until `heal` is called.
    pub fn fail_on(&self, address: u16) {
        self.bus().failing.insert(address);
    }

    pub fn heal(&self) {
        self.bus().failing.clear();
    }

    pub fn writes(&self) -> Vec<(u16, u32)> {
        self.bus().writes.clone()
    }

    pub fn reads(&self) -> Vec<u16> {
        self.bus().reads.clone()
    }

    pub fn clear(&self) {
        let mut bus = self.bus();
        bus.writes.clear();
        bus.reads.clear();
    }

    pub fn last_write(&self, address: u16) -> Option<u32> {
        self.bus()
            .writes
            .iter()
            .rev()
            .find(|(candidate, _)| *candidate == address)
            .map(|(_, value)| *value)
    }

    pub fn wrote(&self, address: u16) -> bool {
        self.last_write(address).is_some()
    }
}

impl device::Transport for Recorder {
    type Error = String;

    fn read(&mut self, address: u16, _width: registers::Width) -> Result<u32, Self::Error> {
        let mut bus = self.bus();
        if bus.failing.contains(&address) {
            return Err(format!("nack on 0x{address:04x}"));
        }
        bus.reads.push(address);
        Ok(bus.registers.get(&address).copied().unwrap_or(0))
    }

    fn write(
        &mut self,
        address: u16,
        _width: registers::Width,
        value: u32,
    ) -> Result<(), Self::Error> {
        let mut bus = self.bus();
        if bus.failing.contains(&address) {
            return Err(format!("nack on 0x{address:04x}"));
        }
        bus.writes.push((address, value));
        bus.registers.insert(address, value);
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PowerCounts {
    pub on: usize,
    pub off: usize,
}

#[derive(Clone, Default)]
pub struct Supply {
    counts: std::sync::Arc<std::sync::Mutex<PowerCounts>>,
}

impl Supply {
    pub fn counts(&self) -> PowerCounts {
        *self.counts.lock().unwrap()
    }
}

impl device::Power for Supply {
    type Error = String;

    fn power_on(&mut self) -> Result<(), Self::Error> {
        self.counts.lock().unwrap().on += 1;
        Ok(())
    }

    fn power_off(&mut self) -> Result<(), Self::Error> {
        self.counts.lock().unwrap().off += 1;
        Ok(())
    }
}

pub type TestSensor = imx477_drivers::Sensor<Recorder, Supply>;

pub fn configuration() -> imx477_drivers::Configuration {
    imx477_drivers::Configuration {
        power_on_delay_us: 0,
        ..imx477_drivers::Configuration::default()
    }
}

pub fn attach_with(
    device_type: imx477_drivers::Type,
    configuration: imx477_drivers::Configuration,
) -> (TestSensor, Recorder, Supply) {
    let recorder = Recorder::with_chip_id(device_type.chip_id());
    let supply = Supply::default();
    let sensor = imx477_drivers::Sensor::attach(
        recorder.clone(),
        supply.clone(),
        device_type,
        configuration,
    )
    .unwrap();
    (sensor, recorder, supply)
}

pub fn attach() -> (TestSensor, Recorder, Supply) {
    attach_with(imx477_drivers::Type::SonyImx477, configuration())
}
