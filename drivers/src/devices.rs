use crate::device::Variant;
use crate::error;
use crate::properties;
use crate::registers;

macro_rules! register {
    ($($module:ident),+) => {
        paste::paste! {
            $(
                pub mod $module;
            )+

            #[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
            pub enum Type {
                $(
                    [<$module:camel>],
                )+
            }

            impl std::fmt::Display for Type {
                fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    match self {
                        $(
                            Self::[<$module:camel>] => write!(formatter, stringify!($module)),
                        )+
                    }
                }
            }

            impl Type {
                pub const ALL: &'static [Type] = &[
                    $(
                        Type::[<$module:camel>],
                    )+
                ];

                pub fn name(self) -> &'static str {
                    self.properties().name
                }

                pub fn chip_id(self) -> u32 {
                    self.properties().chip_id
                }

                pub fn compatible(self) -> &'static str {
                    match self {
                        $(
                            Type::[<$module:camel>] => $module::Device::COMPATIBLE,
                        )+
                    }
                }

                pub fn properties(self) -> properties::Sensor {
                    match self {
                        $(
                            Type::[<$module:camel>] => $module::Device::PROPERTIES,
                        )+
                    }
                }

                pub fn extra_registers(self) -> registers::List {
                    match self {
                        $(
                            Type::[<$module:camel>] => $module::Device::EXTRA_REGISTERS,
                        )+
                    }
                }
            }

            impl std::str::FromStr for Type {
                type Err = error::Error;

                fn from_str(string: &str) -> Result<Self, Self::Err> {
                    match string {
                        $(
                            stringify!($module) => Ok(Self::[<$module:camel>]),
                            string if string == $module::Device::COMPATIBLE => {
                                Ok(Self::[<$module:camel>])
                            }
                        )+
                        _ => Err(error::Error::UnknownDeviceType(string.to_owned())),
                    }
                }
            }
        }
    };
}

register! { sony_imx477, sony_imx378 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_module_names_and_compatible_strings() {
        assert_eq!("sony_imx477".parse::<Type>(), Ok(Type::SonyImx477));
        assert_eq!("sony,imx378".parse::<Type>(), Ok(Type::SonyImx378));
        assert_eq!(
            "sony,imx219".parse::<Type>(),
            Err(error::Error::UnknownDeviceType("sony,imx219".to_owned()))
        );
        assert_eq!(Type::SonyImx378.to_string(), "sony_imx378");
    }

    #[test]
    fn only_the_imx378_needs_extra_registers() {
        assert_eq!(Type::SonyImx477.chip_id(), 0x0477);
        assert!(Type::SonyImx477.extra_registers().is_empty());
        assert_eq!(Type::SonyImx378.chip_id(), 0x0378);
        assert_eq!(Type::SonyImx378.extra_registers().len(), 3);
        assert_eq!(
            Type::SonyImx378.properties().default_configuration,
            crate::configuration::Configuration::default()
        );
    }
}
