use crate::formats;
use crate::registers;
use crate::tables;
use crate::types::{Fraction, MediaBusFormat, Rectangle};

pub const NATIVE_WIDTH: u32 = 4072;
pub const NATIVE_HEIGHT: u32 = 3176;

pub const PIXEL_ARRAY: Rectangle = Rectangle {
    left: 8,
    top: 16,
    width: 4056,
    height: 3040,
};

pub const EMBEDDED_LINE_WIDTH: u32 = 16384;
pub const EMBEDDED_LINES: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    pub width: u32,
    pub height: u32,
    pub line_length_pix: u32,
    pub crop: Rectangle,
    pub timeperframe_min: Fraction,
    pub timeperframe_default: Fraction,
    pub registers: registers::List,
}

pub const MODES_12BIT: &[Mode] = &[
    // 12 MPix, 10 fps
    Mode {
        width: 4056,
        height: 3040,
        line_length_pix: 0x5dc0,
        crop: PIXEL_ARRAY,
        timeperframe_min: Fraction {
            numerator: 100,
            denominator: 1000,
        },
        timeperframe_default: Fraction {
            numerator: 100,
            denominator: 1000,
        },
        registers: tables::MODE_4056X3040,
    },
    // 2x2 binned, 40 fps
    Mode {
        width: 2028,
        height: 1520,
        line_length_pix: 0x31c4,
        crop: PIXEL_ARRAY,
        timeperframe_min: Fraction {
            numerator: 100,
            denominator: 4000,
        },
        timeperframe_default: Fraction {
            numerator: 100,
            denominator: 3000,
        },
        registers: tables::MODE_2028X1520,
    },
    // 1080p cropped, 50 fps
    Mode {
        width: 2028,
        height: 1080,
        line_length_pix: 0x31c4,
        crop: Rectangle {
            left: PIXEL_ARRAY.left,
            top: PIXEL_ARRAY.top + 440,
            width: 4056,
            height: 2160,
        },
        timeperframe_min: Fraction {
            numerator: 100,
            denominator: 5000,
        },
        timeperframe_default: Fraction {
            numerator: 100,
            denominator: 3000,
        },
        registers: tables::MODE_2028X1080,
    },
];

pub const MODES_10BIT: &[Mode] = &[
    // 2x2 binned and cropped, 120 fps
    Mode {
        width: 1332,
        height: 990,
        line_length_pix: 6664,
        // The sensor is programmed with a horizontal displacement of 0, the
        // scaler shrinks it afterwards. Consumers rely on the reported +696.
        crop: Rectangle {
            left: PIXEL_ARRAY.left + 696,
            top: PIXEL_ARRAY.top + 528,
            width: 2664,
            height: 1980,
        },
        timeperframe_min: Fraction {
            numerator: 100,
            denominator: 12000,
        },
        timeperframe_default: Fraction {
            numerator: 100,
            denominator: 12000,
        },
        registers: tables::MODE_1332X990,
    },
];

pub fn default_mode() -> &'static Mode {
    &MODES_12BIT[0]
}

/// Returns the catalog matching the code's bit depth, empty for other codes.
pub fn lookup(code: MediaBusFormat) -> (&'static [Mode], Option<formats::BitDepth>) {
    match formats::bit_depth(code) {
        Some(formats::BitDepth::Twelve) => (MODES_12BIT, Some(formats::BitDepth::Twelve)),
        Some(formats::BitDepth::Ten) => (MODES_10BIT, Some(formats::BitDepth::Ten)),
        None => (&[], None),
    }
}

/// Picks the mode minimising |width - W| + |height - H|.
///
/// An exact match wins immediately, ties go to the later entry.
pub fn find_nearest(modes: &'static [Mode], width: u32, height: u32) -> Option<&'static Mode> {
    let mut best = None;
    let mut best_error = u32::MAX;
    for mode in modes {
        let error = mode.width.abs_diff(width) + mode.height.abs_diff(height);
        if error > best_error {
            continue;
        }
        best_error = error;
        best = Some(mode);
        if error == 0 {
            break;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_sizes_win() {
        for mode in MODES_12BIT {
            assert_eq!(find_nearest(MODES_12BIT, mode.width, mode.height), Some(mode));
        }
    }

    #[test]
    fn nearest_size_by_distance() {
        let mode = find_nearest(MODES_12BIT, 3000, 2000).unwrap();
        assert_eq!((mode.width, mode.height), (2028, 1520));
        let mode = find_nearest(MODES_12BIT, 8000, 8000).unwrap();
        assert_eq!((mode.width, mode.height), (4056, 3040));
        let mode = find_nearest(MODES_12BIT, 0, 0).unwrap();
        assert_eq!((mode.width, mode.height), (2028, 1080));
    }

    #[test]
    fn lookup_by_bit_depth() {
        let (modes, depth) = lookup(MediaBusFormat::Sgbrg10);
        assert_eq!(modes.len(), 1);
        assert_eq!(depth.map(formats::BitDepth::bits), Some(10));
        let (modes, depth) = lookup(MediaBusFormat::SensorData);
        assert!(modes.is_empty());
        assert_eq!(depth, None);
        assert_eq!(find_nearest(modes, 100, 100), None);
    }
}
