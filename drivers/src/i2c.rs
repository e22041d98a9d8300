use crate::device;
use crate::registers;

/// The sensor's fixed 7-bit bus address.
pub const DEFAULT_ADDRESS: u8 = 0x1a;

/// Register transport over an `embedded-hal` I2C bus.
///
/// Register addresses go out as two big-endian bytes, values as `width`
/// big-endian bytes.
pub struct I2cTransport<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cTransport<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: embedded_hal::i2c::I2c> device::Transport for I2cTransport<I2C> {
    type Error = I2C::Error;

    fn read(&mut self, address: u16, width: registers::Width) -> Result<u32, Self::Error> {
        let mut buffer = [0u8; 4];
        self.i2c.write_read(
            self.address,
            &address.to_be_bytes(),
            &mut buffer[4 - width.length()..],
        )?;
        Ok(u32::from_be_bytes(buffer))
    }

    fn write(
        &mut self,
        address: u16,
        width: registers::Width,
        value: u32,
    ) -> Result<(), Self::Error> {
        let length = width.length();
        let mut buffer = [0u8; 6];
        buffer[0..2].copy_from_slice(&address.to_be_bytes());
        buffer[2..6].copy_from_slice(&(value << (8 * (4 - length))).to_be_bytes());
        self.i2c.write(self.address, &buffer[..2 + length])
    }
}
