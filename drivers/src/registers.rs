use crate::device;
use crate::error::Error;

pub type List = &'static [(u16, u8)];

pub const MODE_STANDBY: u32 = 0x00;
pub const MODE_STREAMING: u32 = 0x01;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Width {
    Byte = 1,
    Word = 2,
    Long = 4,
}

impl Width {
    pub fn length(self) -> usize {
        self as usize
    }

    pub fn mask(self) -> u32 {
        match self {
            Self::Byte => 0xff,
            Self::Word => 0xffff,
            Self::Long => 0xffff_ffff,
        }
    }
}

impl TryFrom<u32> for Width {
    type Error = Error;

    fn try_from(length: u32) -> Result<Self, Self::Error> {
        match length {
            1 => Ok(Self::Byte),
            2 => Ok(Self::Word),
            4 => Ok(Self::Long),
            length => Err(Error::InvalidArgument(format!(
                "register length must be 1, 2 or 4 bytes (got {length})"
            ))),
        }
    }
}

pub fn read<Bus: device::Transport>(
    transport: &mut Bus,
    address: u16,
    width: Width,
) -> Result<u32, Error> {
    transport
        .read(address, width)
        .map(|value| value & width.mask())
        .map_err(|error| Error::Io {
            address,
            message: format!("{error:?}"),
        })
}

pub fn write<Bus: device::Transport>(
    transport: &mut Bus,
    address: u16,
    width: Width,
    value: u32,
) -> Result<(), Error> {
    transport
        .write(address, width, value & width.mask())
        .map_err(|error| Error::Io {
            address,
            message: format!("{error:?}"),
        })
}

/// Writes every entry in order and stops at the first failure.
///
/// Entries written before the failure stay written.
pub fn write_list<Bus: device::Transport>(transport: &mut Bus, list: List) -> Result<(), Error> {
    for &(address, value) in list {
        if let Err(error) = write(transport, address, Width::Byte, value as u32) {
            log::error!("failed to write register 0x{address:04x} ({error})");
            return Err(error);
        }
    }
    Ok(())
}

pub trait Register {
    fn address(&self) -> u16;

    fn width(&self) -> Width;

    fn value(&self) -> u32;

    fn read<Bus: device::Transport>(&self, transport: &mut Bus) -> Result<u32, Error> {
        read(transport, self.address(), self.width())
    }

    fn write<Bus: device::Transport>(&self, transport: &mut Bus) -> Result<(), Error> {
        write(transport, self.address(), self.width(), self.value())
    }
}

macro_rules! register {
    ($name:ident, $address:literal, $width:ident) => {
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            pub value: u32,
        }

        impl Register for $name {
            fn address(&self) -> u16 {
                $address
            }

            fn width(&self) -> Width {
                Width::$width
            }

            fn value(&self) -> u32 {
                self.value
            }
        }
    };
}

register! { ChipId, 0x0016, Word }
register! { ModeSelect, 0x0100, Byte }
register! { Orientation, 0x0101, Byte }
register! { Exposure, 0x0202, Word }
register! { AnalogGain, 0x0204, Word }
register! { DigitalGain, 0x020e, Word }
register! { FrameLength, 0x0340, Word }
register! { LineLength, 0x0342, Word }
register! { TestPattern, 0x0600, Word }
register! { TestPatternRed, 0x0602, Word }
register! { TestPatternGreenRed, 0x0604, Word }
register! { TestPatternBlue, 0x0606, Word }
register! { TestPatternGreenBlue, 0x0608, Word }
register! { DpcCoupletCorrection, 0x0b05, Byte }
register! { DpcSingleCorrection, 0x0b06, Byte }
register! { XvsIoCtrl, 0x3040, Byte }
register! { MsSel, 0x3041, Byte }
register! { LongExposureShift, 0x3100, Byte }
register! { McMode, 0x3f0b, Byte }
register! { ExtoutEn, 0x4b81, Byte }
