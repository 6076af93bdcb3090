//! POSIX named shared-memory region.
//!
//! The producer creates the object with `shm_open("/<name>", ...)`.
//! Any leading `/` in the configured stream name is stripped before
//! the lookup, then the single `/` the OS requires is prepended.

use std::ffi::CString;
use std::fs::File;
use std::os::fd::FromRawFd;

use memmap2::{Mmap, MmapOptions};
use tracing::debug;

use crate::error::MirrorError;
use crate::region::SharedRegion;

/// A shared region backed by a POSIX shared-memory object.
#[derive(Debug)]
pub struct PosixShmRegion {
    name: String,
    map: Option<Mmap>,
}

impl PosixShmRegion {
    /// Open the existing shared-memory object for `name`, read-only.
    pub fn open(name: &str, total_size: usize) -> Result<Self, MirrorError> {
        let bare = name.strip_prefix('/').unwrap_or(name);
        let os_name = CString::new(format!("/{bare}")).map_err(|_| {
            MirrorError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid shared memory name: {name:?}"),
            ))
        })?;

        let fd = unsafe { libc::shm_open(os_name.as_ptr(), libc::O_RDONLY, 0) };
        if fd == -1 {
            let err = std::io::Error::last_os_error();
            return Err(match err.kind() {
                std::io::ErrorKind::NotFound => MirrorError::RegionNotFound {
                    name: bare.to_string(),
                },
                std::io::ErrorKind::PermissionDenied => MirrorError::RegionPermissionDenied {
                    name: bare.to_string(),
                },
                _ => MirrorError::Io(err),
            });
        }

        // Take ownership so the descriptor is closed on every exit path.
        let file = unsafe { File::from_raw_fd(fd) };

        let actual = file.metadata()?.len();
        if actual < total_size as u64 {
            return Err(MirrorError::RegionTooSmall {
                expected: total_size as u64,
                actual,
            });
        }

        let map = unsafe { MmapOptions::new().len(total_size).map(&file)? };

        debug!(name = %bare, size = total_size, "mapped shared memory object");
        Ok(Self {
            name: bare.to_string(),
            map: Some(map),
        })
    }

    /// The object name this region was opened from (no leading `/`).
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SharedRegion for PosixShmRegion {
    fn read_into(&self, offset: usize, dst: &mut [u8]) -> Result<(), MirrorError> {
        let map = self.map.as_ref().ok_or(MirrorError::RegionClosed)?;
        let end = offset
            .checked_add(dst.len())
            .filter(|&end| end <= map.len())
            .ok_or(MirrorError::ReadOutOfBounds {
                offset,
                len: dst.len(),
                size: map.len(),
            })?;
        dst.copy_from_slice(&map[offset..end]);
        Ok(())
    }

    fn len(&self) -> usize {
        self.map.as_ref().map_or(0, |m| m.len())
    }

    fn close(&mut self) {
        if self.map.take().is_some() {
            debug!(name = %self.name, "closed shared memory object");
        }
    }

    fn is_closed(&self) -> bool {
        self.map.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_object_is_not_found() {
        let err = PosixShmRegion::open("mira_test_no_such_shm", 100).unwrap_err();
        assert!(matches!(err, MirrorError::RegionNotFound { .. }));
    }

    #[test]
    fn leading_slash_is_stripped() {
        let err = PosixShmRegion::open("/mira_test_no_such_shm", 100).unwrap_err();
        match err {
            MirrorError::RegionNotFound { name } => {
                assert_eq!(name, "mira_test_no_such_shm");
            }
            other => panic!("expected RegionNotFound, got {other}"),
        }
    }
}
