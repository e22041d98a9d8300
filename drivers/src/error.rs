use crate::controls;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("transfer on register 0x{address:04x} failed ({message})")]
    Io { address: u16, message: String },

    #[error("power sequencing failed ({0})")]
    Power(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("control {0} is read-only")]
    ReadOnly(controls::ControlId),

    #[error("control {0} cannot change while streaming")]
    Busy(controls::ControlId),

    #[error("chip id mismatch (expected 0x{expected:04x}, read 0x{found:04x})")]
    IdentityMismatch { expected: u32, found: u32 },

    #[error("unknown device type \"{0}\"")]
    UnknownDeviceType(String),
}
