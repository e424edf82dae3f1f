//! Mock serial channel for testing

use crate::platform::{PlatformError, Result, SerialChannel};
use core::cell::RefCell;
use std::vec::Vec;

/// Mock serial channel
///
/// Provides in-memory buffers for transmit and receive data, so link tests
/// can feed raw frames in and inspect what the link wrote out.
///
/// # Example
///
/// ```
/// use apo::platform::mock::MockSerial;
/// use apo::platform::SerialChannel;
///
/// let mut serial = MockSerial::new();
/// serial.write(b"Hello").unwrap();
/// assert_eq!(serial.tx_buffer(), b"Hello");
///
/// serial.inject_rx_data(b"World");
/// let mut buf = [0u8; 5];
/// serial.read(&mut buf).unwrap();
/// assert_eq!(&buf, b"World");
/// ```
#[derive(Debug, Default)]
pub struct MockSerial {
    tx_buffer: RefCell<Vec<u8>>,
    rx_buffer: RefCell<Vec<u8>>,
    closed: bool,
}

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get transmitted data (for test verification)
    pub fn tx_buffer(&self) -> Vec<u8> {
        self.tx_buffer.borrow().clone()
    }

    /// Take and clear transmitted data
    pub fn take_tx(&mut self) -> Vec<u8> {
        core::mem::take(&mut *self.tx_buffer.borrow_mut())
    }

    /// Inject receive data (for test setup)
    pub fn inject_rx_data(&mut self, data: &[u8]) {
        self.rx_buffer.borrow_mut().extend_from_slice(data);
    }

    /// Make every subsequent write fail
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl SerialChannel for MockSerial {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.closed {
            return Err(PlatformError::ChannelClosed);
        }
        self.tx_buffer.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut rx = self.rx_buffer.borrow_mut();
        let to_read = core::cmp::min(buffer.len(), rx.len());

        buffer[..to_read].copy_from_slice(&rx[..to_read]);
        rx.drain(..to_read);

        Ok(to_read)
    }

    fn available(&self) -> usize {
        self.rx_buffer.borrow().len()
    }
}
