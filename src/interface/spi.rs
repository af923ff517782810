//! SPI interface implementation built on top of `embedded-hal` `SpiDevice`.

use embedded_hal::spi::{Mode, Operation, SpiDevice, MODE_0};

use super::{Max30003Interface, ADDRESS_MASK, FRAME_MASK};

/// SPI mode expected by the MAX30003 (CPOL = 0, CPHA = 0).
pub const SPI_MODE: Mode = MODE_0;

/// SPI clock frequency the register protocol is specified for.
pub const SPI_FREQUENCY_HZ: u32 = 2_000_000;

// Bytes clocked out while reading a register payload.
const READ_FILL: [u8; 3] = [0x00; 3];

/// SPI-based interface implementation for the MAX30003 driver.
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Creates a new interface from the provided SPI device abstraction.
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Builds the command byte: register address in bits 7:1, R/W flag in bit 0.
    fn command_byte(address: u8, is_read: bool) -> u8 {
        let mut command = (address & ADDRESS_MASK) << 1;
        if is_read {
            command |= 0x01;
        }
        command
    }

    /// Provides mutable access to the wrapped SPI device.
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Consumes the interface and returns the owned SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Max30003Interface for SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn write_register(&mut self, address: u8, value: u32) -> core::result::Result<(), Self::Error> {
        let command = [Self::command_byte(address, false)];
        let [_, b2, b1, b0] = (value & FRAME_MASK).to_be_bytes();
        let payload = [b2, b1, b0];
        let mut operations = [Operation::Write(&command), Operation::Write(&payload)];
        self.spi.transaction(&mut operations)
    }

    fn read_register(&mut self, address: u8) -> core::result::Result<u32, Self::Error> {
        let command = [Self::command_byte(address, true)];
        let mut payload = [0u8; 3];
        let mut operations = [
            Operation::Write(&command),
            Operation::Transfer(&mut payload, &READ_FILL),
        ];
        self.spi.transaction(&mut operations)?;
        Ok(u32::from_be_bytes([0, payload[0], payload[1], payload[2]]))
    }
}

#[cfg(test)]
mod tests {
    use super::SpiInterface;
    use crate::interface::Max30003Interface;
    use core::convert::Infallible;
    use embedded_hal::spi::{ErrorType, Operation, SpiDevice};

    struct MockDevice<'a> {
        expectations: &'a [TransactionExpectation],
        index: usize,
    }

    impl<'a> MockDevice<'a> {
        fn new(expectations: &'a [TransactionExpectation]) -> Self {
            Self { expectations, index: 0 }
        }
    }

    impl<'a> Drop for MockDevice<'a> {
        fn drop(&mut self) {
            assert_eq!(
                self.index,
                self.expectations.len(),
                "not all SPI expectations consumed"
            );
        }
    }

    impl<'a> ErrorType for MockDevice<'a> {
        type Error = Infallible;
    }

    fn expect_command(operation: &Operation<'_, u8>, command: u8) {
        match operation {
            Operation::Write(data) => {
                assert_eq!(data.len(), 1, "command length mismatch");
                assert_eq!(data[0], command, "command byte mismatch");
            }
            _ => panic!("first operation must be write"),
        }
    }

    impl<'a> SpiDevice for MockDevice<'a> {
        fn transaction<'b>(
            &mut self,
            operations: &mut [Operation<'b, u8>],
        ) -> Result<(), Self::Error> {
            let expected = self
                .expectations
                .get(self.index)
                .expect("unexpected SPI transaction");
            self.index += 1;

            assert_eq!(operations.len(), 2, "expected command+payload operations");
            let (first, rest) = operations.split_first_mut().expect("missing first op");
            let second = rest.first_mut().expect("missing second op");

            match *expected {
                TransactionExpectation::Read { command, response } => {
                    expect_command(first, command);
                    match second {
                        Operation::Transfer(read, write) => {
                            assert_eq!(read.len(), 3, "response length mismatch");
                            assert!(write.iter().all(|byte| *byte == 0x00), "fill bytes must be zero");
                            read.copy_from_slice(&response);
                        }
                        _ => panic!("second operation must be transfer"),
                    }
                }
                TransactionExpectation::Write { command, payload } => {
                    expect_command(first, command);
                    match second {
                        Operation::Write(data) => {
                            assert_eq!(*data, &payload[..], "payload mismatch");
                        }
                        _ => panic!("second operation must be write"),
                    }
                }
            }

            Ok(())
        }
    }

    #[derive(Clone, Copy)]
    enum TransactionExpectation {
        Read { command: u8, response: [u8; 3] },
        Write { command: u8, payload: [u8; 3] },
    }

    /// Register file that latches writes and serves them back on reads.
    struct EchoDevice {
        registers: [[u8; 3]; 128],
        selections: usize,
    }

    impl EchoDevice {
        fn new() -> Self {
            Self {
                registers: [[0; 3]; 128],
                selections: 0,
            }
        }
    }

    impl ErrorType for EchoDevice {
        type Error = Infallible;
    }

    impl SpiDevice for EchoDevice {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            self.selections += 1;
            let command = match &operations[0] {
                Operation::Write(data) => data[0],
                _ => panic!("transaction must start with the command byte"),
            };
            let address = (command >> 1) as usize;
            match &mut operations[1] {
                Operation::Write(data) if command & 0x01 == 0 => {
                    self.registers[address].copy_from_slice(*data);
                }
                Operation::Transfer(read, _) if command & 0x01 == 1 => {
                    read.copy_from_slice(&self.registers[address]);
                }
                _ => panic!("payload operation does not match R/W flag"),
            }
            Ok(())
        }
    }

    #[test]
    fn read_register_sends_read_command_and_assembles_big_endian() {
        let expectations = [TransactionExpectation::Read {
            command: 0x1F,
            response: [0x12, 0x34, 0x56],
        }];
        let mock = MockDevice::new(&expectations);
        let mut interface = SpiInterface::new(mock);

        let value = interface.read_register(0x0F).unwrap();
        assert_eq!(value, 0x12_3456);
    }

    #[test]
    fn write_register_sends_write_command_and_msb_first_payload() {
        let expectations = [TransactionExpectation::Write {
            command: 0x20,
            payload: [0x28, 0x10, 0xC7],
        }];
        let mock = MockDevice::new(&expectations);
        let mut interface = SpiInterface::new(mock);

        interface.write_register(0x10, 0x2810C7).unwrap();
    }

    #[test]
    fn write_register_drops_bits_above_24() {
        let expectations = [TransactionExpectation::Write {
            command: 0x12,
            payload: [0xAB, 0xCD, 0xEF],
        }];
        let mock = MockDevice::new(&expectations);
        let mut interface = SpiInterface::new(mock);

        interface.write_register(0x09, 0xFFAB_CDEF).unwrap();
    }

    #[test]
    fn command_byte_masks_address_to_seven_bits() {
        assert_eq!(SpiInterface::<()>::command_byte(0x7F, true), 0xFF);
        assert_eq!(SpiInterface::<()>::command_byte(0xFF, false), 0xFE);
        assert_eq!(SpiInterface::<()>::command_byte(0x21, true), 0x43);
    }

    #[test]
    fn echoed_register_round_trips_24_bit_values() {
        let mut interface = SpiInterface::new(EchoDevice::new());

        for value in [0x00_0000, 0x00_0001, 0x80_0000, 0x7F_FFFF, 0xFF_FFFF, 0x3F_A600] {
            interface.write_register(0x12, value).unwrap();
            assert_eq!(interface.read_register(0x12).unwrap(), value);
        }

        assert_eq!(interface.release().selections, 12);
    }
}
