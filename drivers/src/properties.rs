use crate::configuration;
use crate::types::Rectangle;

#[derive(Debug, Clone, serde::Serialize)]
pub struct Sensor {
    pub name: &'static str,
    pub chip_id: u32,
    pub native_width: u32,
    pub native_height: u32,
    #[serde(skip)]
    pub pixel_array: Rectangle,
    pub default_configuration: configuration::Configuration,
}
