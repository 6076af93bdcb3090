//! File-backed shared region.
//!
//! The producer creates `<tempdir>/scrcpy_<name>.map` and maps it;
//! the reader maps the same file read-only. `<tempdir>` resolution
//! must match the producer exactly: first defined of `TMPDIR`, `TMP`,
//! `TEMP`, falling back to `/tmp`, with trailing path separators
//! stripped.

use std::fs::File;
use std::path::PathBuf;

use memmap2::{Mmap, MmapOptions};
use tracing::debug;

use crate::error::MirrorError;
use crate::region::SharedRegion;

/// Resolve the shared temp directory the producer writes into.
pub fn temp_dir() -> PathBuf {
    temp_dir_from(|key| std::env::var(key).ok())
}

fn temp_dir_from(get: impl Fn(&str) -> Option<String>) -> PathBuf {
    for key in ["TMPDIR", "TMP", "TEMP"] {
        if let Some(dir) = get(key) {
            if !dir.is_empty() {
                return PathBuf::from(dir.trim_end_matches(['/', '\\']));
            }
        }
    }
    PathBuf::from("/tmp")
}

// ── FileRegion ───────────────────────────────────────────────────

/// A shared region backed by a file in the temp directory.
#[derive(Debug)]
pub struct FileRegion {
    path: PathBuf,
    map: Option<Mmap>,
}

impl FileRegion {
    /// The backing file path for a stream name.
    pub fn map_path(name: &str) -> PathBuf {
        temp_dir().join(format!("scrcpy_{name}.map"))
    }

    /// Map the existing backing file for `name`, read-only.
    ///
    /// Fails with [`MirrorError::RegionNotFound`] if the producer has
    /// not created the file, and [`MirrorError::RegionTooSmall`] if
    /// the file cannot hold `total_size` bytes.
    pub fn open(name: &str, total_size: usize) -> Result<Self, MirrorError> {
        let path = Self::map_path(name);
        let file = File::open(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MirrorError::RegionNotFound {
                name: path.display().to_string(),
            },
            std::io::ErrorKind::PermissionDenied => MirrorError::RegionPermissionDenied {
                name: path.display().to_string(),
            },
            _ => MirrorError::Io(e),
        })?;

        let actual = file.metadata()?.len();
        if actual < total_size as u64 {
            return Err(MirrorError::RegionTooSmall {
                expected: total_size as u64,
                actual,
            });
        }

        // The producer keeps writing into this mapping; reads are
        // validated upstream via the header protocol.
        let map = unsafe { MmapOptions::new().len(total_size).map(&file)? };

        debug!(path = %path.display(), size = total_size, "mapped region file");
        Ok(Self {
            path,
            map: Some(map),
        })
    }

    /// The backing file path this region was opened from.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SharedRegion for FileRegion {
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
            debug!(path = %self.path.display(), "closed region file");
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
    fn temp_dir_prefers_tmpdir() {
        let dir = temp_dir_from(|key| match key {
            "TMPDIR" => Some("/var/folders/x/".into()),
            "TMP" => Some("/other".into()),
            _ => None,
        });
        assert_eq!(dir, PathBuf::from("/var/folders/x"));
    }

    #[test]
    fn temp_dir_falls_through_in_order() {
        let dir = temp_dir_from(|key| match key {
            "TMP" => Some("/tmp-from-tmp".into()),
            "TEMP" => Some("/tmp-from-temp".into()),
            _ => None,
        });
        assert_eq!(dir, PathBuf::from("/tmp-from-tmp"));

        let dir = temp_dir_from(|key| match key {
            "TEMP" => Some("C:\\Temp\\".into()),
            _ => None,
        });
        assert_eq!(dir, PathBuf::from("C:\\Temp"));
    }

    #[test]
    fn temp_dir_defaults_and_skips_empty() {
        let dir = temp_dir_from(|key| match key {
            "TMPDIR" => Some(String::new()),
            _ => None,
        });
        assert_eq!(dir, PathBuf::from("/tmp"));
    }

    #[test]
    fn map_path_uses_producer_convention() {
        let path = FileRegion::map_path("frames_8888");
        assert!(path.ends_with("scrcpy_frames_8888.map"));
    }

    #[test]
    fn open_missing_file_is_not_found() {
        let err = FileRegion::open("mira_test_no_such_stream", 100).unwrap_err();
        assert!(matches!(err, MirrorError::RegionNotFound { .. }));
    }
}
