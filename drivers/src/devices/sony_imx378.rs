use crate::configuration;
use crate::device;
use crate::modes;
use crate::properties;
use crate::registers;

pub struct Device;

impl device::Variant for Device {
    const COMPATIBLE: &'static str = "sony,imx378";

    const PROPERTIES: properties::Sensor = properties::Sensor {
        name: "Sony IMX378",
        chip_id: 0x0378,
        native_width: modes::NATIVE_WIDTH,
        native_height: modes::NATIVE_HEIGHT,
        pixel_array: modes::PIXEL_ARRAY,
        default_configuration: configuration::Configuration::DEFAULT,
    };

    const EXTRA_REGISTERS: registers::List = &[(0x3e35, 0x01), (0x4421, 0x08), (0x3ff9, 0x00)];
}
