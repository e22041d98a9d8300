pub mod configuration;
pub mod controls;
pub mod device;
pub mod devices;
pub mod error;
pub mod formats;
pub mod i2c;
pub mod modes;
pub mod properties;
pub mod registers;
pub mod sensor;
pub mod tables;
pub mod timing;

pub use crate::configuration::Configuration;
pub use crate::configuration::TriggerMode;
pub use crate::controls::ControlId;
pub use crate::devices::Type;
pub use crate::error::Error;
pub use crate::i2c::I2cTransport;
pub use crate::sensor::Pad;
pub use crate::sensor::SelectionTarget;
pub use crate::sensor::Sensor;
pub use crate::sensor::Which;

pub use bincode;
pub use embedded_hal;
pub use imx477_types as types;
