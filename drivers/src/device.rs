use crate::properties;
use crate::registers;

pub trait Transport {
    type Error: std::fmt::Debug;

    fn read(&mut self, address: u16, width: registers::Width) -> Result<u32, Self::Error>;

    fn write(
        &mut self,
        address: u16,
        width: registers::Width,
        value: u32,
    ) -> Result<(), Self::Error>;
}

/// Regulators, external clock and reset line, driven as one unit.
///
/// Both calls must be idempotent: the core calls `power_off` even after a
/// partially failed `power_on`.
pub trait Power {
    type Error: std::fmt::Debug;

    fn power_on(&mut self) -> Result<(), Self::Error>;

    fn power_off(&mut self) -> Result<(), Self::Error>;
}

pub trait Variant {
    /// Device-tree compatible string.
    const COMPATIBLE: &'static str;

    const PROPERTIES: properties::Sensor;

    /// Applied once per power cycle, right after the common registers.
    const EXTRA_REGISTERS: registers::List;
}
