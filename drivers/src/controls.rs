use crate::configuration;
use crate::modes::Mode;
use crate::timing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ControlId {
    PixelRate,
    LinkFrequency,
    VerticalBlank,
    HorizontalBlank,
    Exposure,
    AnalogueGain,
    DigitalGain,
    HorizontalFlip,
    VerticalFlip,
    TestPattern,
    TestPatternRed,
    TestPatternGreenRed,
    TestPatternBlue,
    TestPatternGreenBlue,
}

const USER_CLASS_BASE: u32 = 0x0098_0900;
const IMAGE_SOURCE_CLASS_BASE: u32 = 0x009e_0900;
const IMAGE_PROCESSING_CLASS_BASE: u32 = 0x009f_0900;

impl ControlId {
    pub const ALL: [ControlId; 14] = [
        Self::PixelRate,
        Self::LinkFrequency,
        Self::VerticalBlank,
        Self::HorizontalBlank,
        Self::Exposure,
        Self::AnalogueGain,
        Self::DigitalGain,
        Self::HorizontalFlip,
        Self::VerticalFlip,
        Self::TestPattern,
        Self::TestPatternRed,
        Self::TestPatternGreenRed,
        Self::TestPatternBlue,
        Self::TestPatternGreenBlue,
    ];

    /// V4L2 control id.
    pub fn raw(self) -> u32 {
        match self {
            Self::Exposure => USER_CLASS_BASE + 17,
            Self::HorizontalFlip => USER_CLASS_BASE + 20,
            Self::VerticalFlip => USER_CLASS_BASE + 21,
            Self::VerticalBlank => IMAGE_SOURCE_CLASS_BASE + 1,
            Self::HorizontalBlank => IMAGE_SOURCE_CLASS_BASE + 2,
            Self::AnalogueGain => IMAGE_SOURCE_CLASS_BASE + 3,
            Self::TestPatternRed => IMAGE_SOURCE_CLASS_BASE + 4,
            Self::TestPatternGreenRed => IMAGE_SOURCE_CLASS_BASE + 5,
            Self::TestPatternBlue => IMAGE_SOURCE_CLASS_BASE + 6,
            Self::TestPatternGreenBlue => IMAGE_SOURCE_CLASS_BASE + 7,
            Self::LinkFrequency => IMAGE_PROCESSING_CLASS_BASE + 1,
            Self::PixelRate => IMAGE_PROCESSING_CLASS_BASE + 2,
            Self::TestPattern => IMAGE_PROCESSING_CLASS_BASE + 3,
            Self::DigitalGain => IMAGE_PROCESSING_CLASS_BASE + 5,
        }
    }

    pub fn from_raw(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.raw() == id)
    }

    pub fn is_read_only(self) -> bool {
        matches!(self, Self::PixelRate | Self::LinkFrequency)
    }
}

impl std::fmt::Display for ControlId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(match self {
            Self::PixelRate => "pixel_rate",
            Self::LinkFrequency => "link_frequency",
            Self::VerticalBlank => "vertical_blank",
            Self::HorizontalBlank => "horizontal_blank",
            Self::Exposure => "exposure",
            Self::AnalogueGain => "analogue_gain",
            Self::DigitalGain => "digital_gain",
            Self::HorizontalFlip => "horizontal_flip",
            Self::VerticalFlip => "vertical_flip",
            Self::TestPattern => "test_pattern",
            Self::TestPatternRed => "test_pattern_red",
            Self::TestPatternGreenRed => "test_pattern_green_red",
            Self::TestPatternBlue => "test_pattern_blue",
            Self::TestPatternGreenBlue => "test_pattern_green_blue",
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TestPattern {
    #[default]
    Disabled,
    ColorBars,
    SolidColor,
    GreyColorBars,
    Pn9,
}

impl TestPattern {
    pub const MENU: [TestPattern; 5] = [
        Self::Disabled,
        Self::ColorBars,
        Self::SolidColor,
        Self::GreyColorBars,
        Self::Pn9,
    ];

    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|index| Self::MENU.get(index).copied())
    }

    pub fn index(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::ColorBars => "Color Bars",
            Self::SolidColor => "Solid Color",
            Self::GreyColorBars => "Grey Color Bars",
            Self::Pn9 => "PN9",
        }
    }

    /// The menu order differs from the register encoding.
    pub fn register_value(self) -> u32 {
        match self {
            Self::Disabled => 0,
            Self::SolidColor => 1,
            Self::ColorBars => 2,
            Self::GreyColorBars => 3,
            Self::Pn9 => 4,
        }
    }
}

pub const EXPOSURE_MIN: i32 = 4;
pub const EXPOSURE_DEFAULT: i32 = 0x640;
pub const ANALOGUE_GAIN_MAX: i32 = 978;
pub const DIGITAL_GAIN_MIN: i32 = 0x0100;
pub const DIGITAL_GAIN_MAX: i32 = 0xffff;
pub const TEST_PATTERN_COLOUR_MAX: i32 = 0x0fff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    pub minimum: i32,
    pub maximum: i32,
    pub step: i32,
    pub default: i32,
    pub value: i32,
    pub grabbed: bool,
}

impl Control {
    pub const fn new(minimum: i32, maximum: i32, step: i32, default: i32) -> Self {
        Self {
            minimum,
            maximum,
            step,
            default,
            value: default,
            grabbed: false,
        }
    }

    /// Clamps to the range and snaps to the nearest step above the minimum.
    pub fn round(&self, value: i32) -> i32 {
        let step = self.step.max(1) as i64;
        let value = (value as i64 + step / 2).clamp(self.minimum as i64, self.maximum as i64);
        let offset = value - self.minimum as i64;
        (self.minimum as i64 + step * (offset / step)) as i32
    }

    /// Returns whether the stored value changed.
    pub fn set(&mut self, value: i32) -> bool {
        let previous = self.value;
        self.value = self.round(value);
        previous != self.value
    }

    /// Installs a new range and re-clamps the current value, returning whether
    /// the value changed.
    pub fn modify_range(&mut self, minimum: i32, maximum: i32, step: i32, default: i32) -> bool {
        self.minimum = minimum;
        self.maximum = maximum;
        self.step = step;
        self.default = default;
        let value = self.value;
        self.set(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    pub pixel_rate: Control,
    pub link_frequency: Control,
    pub vblank: Control,
    pub hblank: Control,
    pub exposure: Control,
    pub analogue_gain: Control,
    pub digital_gain: Control,
    pub hflip: Control,
    pub vflip: Control,
    pub test_pattern: Control,
    pub test_pattern_red: Control,
    pub test_pattern_green_red: Control,
    pub test_pattern_blue: Control,
    pub test_pattern_green_blue: Control,
}

impl Controls {
    /// Order in which values are pushed to the sensor on stream start.
    /// Vertical blank comes first so that the long exposure shift is known
    /// before exposure is written.
    pub const REPLAY_ORDER: [ControlId; 12] = [
        ControlId::VerticalBlank,
        ControlId::HorizontalBlank,
        ControlId::Exposure,
        ControlId::AnalogueGain,
        ControlId::DigitalGain,
        ControlId::HorizontalFlip,
        ControlId::VerticalFlip,
        ControlId::TestPattern,
        ControlId::TestPatternRed,
        ControlId::TestPatternGreenRed,
        ControlId::TestPatternBlue,
        ControlId::TestPatternGreenBlue,
    ];

    pub fn new(configuration: &configuration::Configuration) -> Self {
        let pixel_rate = timing::PIXEL_RATE as i32;
        let link_frequency = timing::LINK_FREQUENCY as i32;
        let exposure_max = (timing::FRAME_LENGTH_MAX - timing::EXPOSURE_OFFSET) as i32;
        let colour = Control::new(0, TEST_PATTERN_COLOUR_MAX, 1, TEST_PATTERN_COLOUR_MAX);
        Self {
            pixel_rate: Control::new(pixel_rate, pixel_rate, 1, pixel_rate),
            link_frequency: Control::new(link_frequency, link_frequency, 1, link_frequency),
            vblank: Control::new(0, 0xffff, 1, 0),
            hblank: Control::new(0, 0xffff, 1, 0),
            exposure: Control::new(EXPOSURE_MIN, exposure_max, 1, EXPOSURE_DEFAULT),
            analogue_gain: Control::new(0, ANALOGUE_GAIN_MAX, 1, 0),
            digital_gain: Control::new(DIGITAL_GAIN_MIN, DIGITAL_GAIN_MAX, 1, DIGITAL_GAIN_MIN),
            hflip: Control::new(0, 1, 1, 0),
            vflip: Control::new(0, 1, 1, 0),
            test_pattern: Control::new(
                0,
                TestPattern::MENU.len() as i32 - 1,
                1,
                configuration.test_pattern.index(),
            ),
            test_pattern_red: colour,
            test_pattern_green_red: colour,
            test_pattern_blue: colour,
            test_pattern_green_blue: colour,
        }
    }

    pub fn get(&self, id: ControlId) -> &Control {
        match id {
            ControlId::PixelRate => &self.pixel_rate,
            ControlId::LinkFrequency => &self.link_frequency,
            ControlId::VerticalBlank => &self.vblank,
            ControlId::HorizontalBlank => &self.hblank,
            ControlId::Exposure => &self.exposure,
            ControlId::AnalogueGain => &self.analogue_gain,
            ControlId::DigitalGain => &self.digital_gain,
            ControlId::HorizontalFlip => &self.hflip,
            ControlId::VerticalFlip => &self.vflip,
            ControlId::TestPattern => &self.test_pattern,
            ControlId::TestPatternRed => &self.test_pattern_red,
            ControlId::TestPatternGreenRed => &self.test_pattern_green_red,
            ControlId::TestPatternBlue => &self.test_pattern_blue,
            ControlId::TestPatternGreenBlue => &self.test_pattern_green_blue,
        }
    }

    pub fn get_mut(&mut self, id: ControlId) -> &mut Control {
        match id {
            ControlId::PixelRate => &mut self.pixel_rate,
            ControlId::LinkFrequency => &mut self.link_frequency,
            ControlId::VerticalBlank => &mut self.vblank,
            ControlId::HorizontalBlank => &mut self.hblank,
            ControlId::Exposure => &mut self.exposure,
            ControlId::AnalogueGain => &mut self.analogue_gain,
            ControlId::DigitalGain => &mut self.digital_gain,
            ControlId::HorizontalFlip => &mut self.hflip,
            ControlId::VerticalFlip => &mut self.vflip,
            ControlId::TestPattern => &mut self.test_pattern,
            ControlId::TestPatternRed => &mut self.test_pattern_red,
            ControlId::TestPatternGreenRed => &mut self.test_pattern_green_red,
            ControlId::TestPatternBlue => &mut self.test_pattern_blue,
            ControlId::TestPatternGreenBlue => &mut self.test_pattern_green_blue,
        }
    }

    pub fn hflip(&self) -> bool {
        self.hflip.value != 0
    }

    pub fn vflip(&self) -> bool {
        self.vflip.value != 0
    }

    pub fn grab_flips(&mut self, grabbed: bool) {
        self.hflip.grabbed = grabbed;
        self.vflip.grabbed = grabbed;
    }

    /// Caps exposure at `height + vblank - offset`, returning whether the
    /// exposure value had to move.
    pub fn adjust_exposure_range(&mut self, mode: &Mode) -> bool {
        let exposure_max = timing::exposure_max(mode, self.vblank.value);
        let exposure_default = exposure_max.min(self.exposure.value);
        let (minimum, step) = (self.exposure.minimum, self.exposure.step);
        self.exposure
            .modify_range(minimum, exposure_max, step, exposure_default)
    }
}
