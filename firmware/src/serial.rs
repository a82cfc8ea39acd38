//! Helpers for using the serial port.

use fan_firmware::{
    protocol::{self, CommandReader},
    Controller, Error, Override, Relay,
};
use stm32f4xx_hal::otg_fs::UsbBusType;
use usb_device::UsbError;
use usbd_serial::SerialPort;

// Configure serial buffer
pub const SERIAL_READ_BUFFER_BYTES: usize = 256;
pub const SERIAL_WRITE_BUFFER_BYTES: usize = 512;

/// Type alias for the serial port type
pub type SerialPortType = SerialPort<
    'static,
    UsbBusType,
    [u8; SERIAL_READ_BUFFER_BYTES],
    [u8; SERIAL_WRITE_BUFFER_BYTES],
>;

/// Wrapper for a `SerialPort` that supports ufmt
pub struct SerialWriter<'a>(pub &'a mut SerialPortType);

impl<'a> ufmt::uWrite for SerialWriter<'a> {
    type Error = Error;
    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            match self.0.write(bytes) {
                Ok(written) => bytes = &bytes[written..],
                // Host is not reading, drop the rest of the line
                Err(_) => return Err(Error::UfmtSerialWriteError),
            }
        }
        Ok(())
    }
}

/// Write the status line followed by all pending events and errors.
pub fn report<R: Relay>(
    serial: &mut SerialPortType,
    controller: &mut Controller<R>,
    now: u64,
) -> Result<(), Error> {
    let mut writer = SerialWriter(serial);
    protocol::write_status(&mut writer, now, &controller.status())?;
    while let Some(event) = controller.next_event() {
        protocol::write_event(&mut writer, &event)?;
    }
    while let Some(error) = controller.next_error() {
        protocol::write_error(&mut writer, &error)?;
    }
    Ok(())
}

/// Read all available bytes and return the last complete command.
pub fn read_command(serial: &mut SerialPortType, reader: &mut CommandReader) -> Option<Override> {
    let mut buf = [0u8; 64];
    let mut command = None;
    loop {
        match serial.read(&mut buf) {
            Ok(0) | Err(UsbError::WouldBlock) => break,
            Ok(count) => {
                for byte in &buf[..count] {
                    if let Some(received) = reader.push(*byte) {
                        command = Some(received);
                    }
                }
            }
            Err(_) => break,
        }
    }
    command
}
