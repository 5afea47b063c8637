//! Named blob persistence
//!
//! Boards persist configuration documents as opaque byte blobs addressed by
//! a path-like name (e.g. `/common/config.json`). How and where they are
//! stored (flash sectors, a filesystem, RAM in tests) is up to the board.

use embedded_io::Error;

/// Persistent storage for named blobs
pub trait BlobStore {
    /// Storage error type
    ///
    /// `ErrorKind::NotFound` must be reported when no blob with the given
    /// name has been written yet; callers treat it as "use defaults".
    type Error: Error;

    /// Read the blob `name` into `buf`
    ///
    /// Returns the number of bytes written to `buf`. A blob larger than
    /// `buf` must be reported as an error (`ErrorKind::OutOfMemory`), never
    /// silently truncated.
    fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Replace the blob `name` with `bytes`
    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<(), Self::Error>;
}
