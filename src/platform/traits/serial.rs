//! Serial channel interface
//!
//! The ground-station link runs over a byte stream with no framing of its
//! own. Reads are non-blocking polls: a channel with nothing buffered
//! returns `Ok(0)`.

use crate::platform::Result;

/// Point-to-point byte channel
pub trait SerialChannel {
    /// Write bytes, returning how many were accepted
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Read up to `buffer.len()` buffered bytes without blocking
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Number of bytes ready to read
    fn available(&self) -> usize;

    /// Write the whole buffer or fail
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let written = self.write(data)?;
        if written == data.len() {
            Ok(())
        } else {
            Err(crate::platform::PlatformError::WriteTruncated {
                written,
                requested: data.len(),
            })
        }
    }
}

impl<T: SerialChannel + ?Sized> SerialChannel for &mut T {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        (**self).write(data)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        (**self).read(buffer)
    }

    fn available(&self) -> usize {
        (**self).available()
    }
}
