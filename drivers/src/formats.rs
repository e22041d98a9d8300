use crate::types::MediaBusFormat;

/// Four entries per bit depth, in the order: no flip, hflip, vflip, both.
pub const CODES: [MediaBusFormat; 8] = [
    MediaBusFormat::Srggb12,
    MediaBusFormat::Sgrbg12,
    MediaBusFormat::Sgbrg12,
    MediaBusFormat::Sbggr12,
    MediaBusFormat::Srggb10,
    MediaBusFormat::Sgrbg10,
    MediaBusFormat::Sgbrg10,
    MediaBusFormat::Sbggr10,
];

#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BitDepth {
    Ten,
    Twelve,
}

impl BitDepth {
    pub fn bits(self) -> u32 {
        match self {
            Self::Ten => 10,
            Self::Twelve => 12,
        }
    }
}

pub fn bit_depth(code: MediaBusFormat) -> Option<BitDepth> {
    match code {
        MediaBusFormat::Srggb12
        | MediaBusFormat::Sgrbg12
        | MediaBusFormat::Sgbrg12
        | MediaBusFormat::Sbggr12 => Some(BitDepth::Twelve),
        MediaBusFormat::Srggb10
        | MediaBusFormat::Sgrbg10
        | MediaBusFormat::Sgbrg10
        | MediaBusFormat::Sbggr10 => Some(BitDepth::Ten),
        MediaBusFormat::SensorData => None,
    }
}

/// Returns the Bayer order read out for `code` under the given flips.
///
/// Codes outside the table resolve as if SRGGB12 had been requested.
pub fn resolve(code: MediaBusFormat, hflip: bool, vflip: bool) -> MediaBusFormat {
    let index = CODES
        .iter()
        .position(|candidate| *candidate == code)
        .unwrap_or(0);
    CODES[(index & !3) | ((vflip as usize) << 1) | (hflip as usize)]
}
