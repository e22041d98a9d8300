#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MediaBusFormat {
    Srggb12 = 0x3012,
    Sgrbg12 = 0x3011,
    Sgbrg12 = 0x3010,
    Sbggr12 = 0x3008,
    Srggb10 = 0x300f,
    Sgrbg10 = 0x300a,
    Sgbrg10 = 0x300e,
    Sbggr10 = 0x3007,
    SensorData = 0x7002,
}

impl MediaBusFormat {
    pub fn from_raw(code: u32) -> Option<Self> {
        match code {
            0x3012 => Some(Self::Srggb12),
            0x3011 => Some(Self::Sgrbg12),
            0x3010 => Some(Self::Sgbrg12),
            0x3008 => Some(Self::Sbggr12),
            0x300f => Some(Self::Srggb10),
            0x300a => Some(Self::Sgrbg10),
            0x300e => Some(Self::Sgbrg10),
            0x3007 => Some(Self::Sbggr10),
            0x7002 => Some(Self::SensorData),
            _ => None,
        }
    }

    pub fn raw(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rectangle {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Fraction {
    pub numerator: u32,
    pub denominator: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameSize {
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Colorspace {
    Raw,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Field {
    None,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PadFormat {
    pub width: u32,
    pub height: u32,
    pub code: MediaBusFormat,
    pub field: Field,
    pub colorspace: Colorspace,
}

impl PadFormat {
    pub fn new(width: u32, height: u32, code: MediaBusFormat) -> Self {
        Self {
            width,
            height,
            code,
            field: Field::None,
            colorspace: Colorspace::Raw,
        }
    }
}
