//! Shared-region handles.
//!
//! The producer creates a fixed-size region — header plus maximum
//! payload — under a name derived from the stream identifier. The
//! reader opens it, never creates it, and reads raw byte ranges out
//! of it until the handle is closed.
//!
//! Two backends exist, mirroring the producer's two conventions:
//!
//! - [`file::FileRegion`] — a backing file in the shared temp
//!   directory, `<tempdir>/scrcpy_<name>.map`.
//! - [`shm::PosixShmRegion`] — a POSIX named shared-memory object
//!   (unix only).
//!
//! The backend is selected once at construction via
//! [`RegionBackend`]; everything above this layer works against the
//! [`SharedRegion`] trait.

pub mod file;
#[cfg(unix)]
pub mod shm;

use crate::error::MirrorError;

// ── SharedRegion ─────────────────────────────────────────────────

/// Raw byte-range read access into a producer-owned shared region.
///
/// Reads are unchecked against concurrent writer activity: the
/// producer takes no cross-process lock, so a read can observe a
/// partially written frame. Callers validate what they read through
/// the header/sequence protocol, not here.
pub trait SharedRegion: Send + Sync {
    /// Copy `dst.len()` bytes starting at `offset` out of the region.
    fn read_into(&self, offset: usize, dst: &mut [u8]) -> Result<(), MirrorError>;

    /// Mapped region size in bytes.
    fn len(&self) -> usize;

    /// Whether the mapped region is zero-sized.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release the mapping and all OS resources. Idempotent; further
    /// reads fail with [`MirrorError::RegionClosed`].
    fn close(&mut self);

    /// Whether [`close`](SharedRegion::close) has been called.
    fn is_closed(&self) -> bool;
}

// ── RegionBackend ────────────────────────────────────────────────

/// Which naming/location convention the producer used for the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionBackend {
    /// Backing file in the shared temp directory.
    #[default]
    FileMapping,
    /// POSIX named shared-memory object.
    PosixShm,
}

/// Open the shared region for `name` with the given total size
/// (header + maximum payload), using the selected backend.
///
/// The region must already exist; the reader never creates it.
pub fn open_region(
    backend: RegionBackend,
    name: &str,
    total_size: usize,
) -> Result<Box<dyn SharedRegion>, MirrorError> {
    match backend {
        RegionBackend::FileMapping => {
            Ok(Box::new(file::FileRegion::open(name, total_size)?))
        }
        RegionBackend::PosixShm => {
            #[cfg(unix)]
            return Ok(Box::new(shm::PosixShmRegion::open(name, total_size)?));
            #[cfg(not(unix))]
            return Err(MirrorError::Io(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                format!("POSIX shared memory is not available here (stream {name})"),
            )));
        }
    }
}
