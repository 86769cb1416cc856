//! USB bulk pipe abstraction

use std::fmt;
use std::io;

/// The reader's bulk-out / bulk-in endpoint pair
///
/// Implementations move bytes unchanged. Timeouts, if any, are theirs to
/// enforce and report as [`io::ErrorKind::TimedOut`].
pub trait CcidDevice: Send + fmt::Debug {
    /// Write one complete message to the bulk-out endpoint
    fn write_bulk(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read one complete message from the bulk-in endpoint
    fn read_bulk(&mut self) -> io::Result<Vec<u8>>;
}

impl<D: CcidDevice + ?Sized> CcidDevice for Box<D> {
    fn write_bulk(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_bulk(data)
    }

    fn read_bulk(&mut self) -> io::Result<Vec<u8>> {
        (**self).read_bulk()
    }
}
