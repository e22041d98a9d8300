use crate::modes::Mode;
use crate::types::Fraction;

pub const PIXEL_RATE: u64 = 840_000_000;
pub const LINK_FREQUENCY: u64 = 450_000_000;

pub const FRAME_LENGTH_MAX: u32 = 0xffdc;
pub const LINE_LENGTH_MAX: u32 = 0xfff0;
pub const LONG_EXPOSURE_SHIFT_MAX: u32 = 7;

pub const EXPOSURE_OFFSET: u32 = 22;

/// Frame length in lines for the given frame interval, never shorter than
/// the active height.
pub fn frame_length(mode: &Mode, timeperframe: &Fraction) -> u32 {
    let frame_length = (timeperframe.numerator as u64 * PIXEL_RATE)
        .checked_div(timeperframe.denominator as u64 * mode.line_length_pix as u64)
        .unwrap_or(u64::MAX);
    let frame_length = if frame_length > FRAME_LENGTH_MAX as u64 {
        log::warn!(
            "frame length {frame_length} for {}x{} exceeds the register range",
            mode.width,
            mode.height
        );
        FRAME_LENGTH_MAX
    } else {
        frame_length as u32
    };
    frame_length.max(mode.height)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramingLimits {
    pub vblank_min: i32,
    pub vblank_max: i32,
    pub vblank_default: i32,
    pub hblank_min: i32,
    pub hblank_max: i32,
}

pub fn framing_limits(mode: &Mode) -> FramingLimits {
    let frame_length_min = frame_length(mode, &mode.timeperframe_min);
    let frame_length_default = frame_length(mode, &mode.timeperframe_default);
    FramingLimits {
        vblank_min: frame_length_min as i32 - mode.height as i32,
        vblank_max: ((1 << LONG_EXPOSURE_SHIFT_MAX) * FRAME_LENGTH_MAX) as i32
            - mode.height as i32,
        vblank_default: frame_length_default as i32 - mode.height as i32,
        hblank_min: mode.line_length_pix as i32 - mode.width as i32,
        hblank_max: LINE_LENGTH_MAX as i32 - mode.width as i32,
    }
}

pub fn exposure_max(mode: &Mode, vblank: i32) -> i32 {
    mode.height as i32 + vblank - EXPOSURE_OFFSET as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLength {
    pub value: u32,
    pub long_exposure_shift: u32,
}

/// Halves `length` until it fits the frame-length register, counting the
/// halvings as the long exposure shift (at most 7).
pub fn split_frame_length(length: u32) -> FrameLength {
    let mut value = length;
    let mut long_exposure_shift = 0;
    while value > FRAME_LENGTH_MAX && long_exposure_shift < LONG_EXPOSURE_SHIFT_MAX {
        long_exposure_shift += 1;
        value >>= 1;
    }
    FrameLength {
        value: value.min(FRAME_LENGTH_MAX),
        long_exposure_shift,
    }
}
