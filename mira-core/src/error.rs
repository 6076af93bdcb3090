//! Domain-specific error types for the mirror frame transport.
//!
//! All fallible operations return `Result<T, MirrorError>`.
//! No panics on invalid input — every error is typed and recoverable.
//! Open failures in particular are ordinary results: the caller is
//! expected to stay disconnected and retry later.

use thiserror::Error;

/// The canonical error type for the frame transport.
#[derive(Debug, Error)]
pub enum MirrorError {
    // ── Region Errors ────────────────────────────────────────────
    /// The shared region does not exist (no producer has created it).
    #[error("shared region not found: {name}")]
    RegionNotFound { name: String },

    /// The shared region exists but cannot be opened for reading.
    #[error("permission denied opening shared region: {name}")]
    RegionPermissionDenied { name: String },

    /// The region is smaller than the agreed header + payload capacity.
    #[error("shared region too small: {actual} bytes (need {expected})")]
    RegionTooSmall { expected: u64, actual: u64 },

    /// A read was attempted after the region handle was closed.
    #[error("shared region is closed")]
    RegionClosed,

    /// A read range fell outside the mapped region.
    #[error("read out of bounds: offset {offset} + len {len} exceeds region size {size}")]
    ReadOutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },

    // ── I/O Errors ───────────────────────────────────────────────
    /// The OS mapping layer reported an error.
    #[error("region I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ── Delivery Errors ──────────────────────────────────────────
    /// The frame channel's receiver was dropped while the reader was
    /// still polling.
    #[error("frame channel closed")]
    ChannelClosed,
}

// ── Convenient From implementations ──────────────────────────────

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for MirrorError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        MirrorError::ChannelClosed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = MirrorError::RegionNotFound {
            name: "frames_8888".into(),
        };
        assert!(e.to_string().contains("frames_8888"));

        let e = MirrorError::RegionTooSmall {
            expected: 100,
            actual: 36,
        };
        assert!(e.to_string().contains("100"));
        assert!(e.to_string().contains("36"));
    }

    #[test]
    fn from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "mmap failed");
        let e: MirrorError = io_err.into();
        assert!(matches!(e, MirrorError::Io(_)));
    }

    #[tokio::test]
    async fn from_send_error() {
        let (tx, rx) = tokio::sync::mpsc::channel::<u8>(1);
        drop(rx);
        let send_err = tx.send(1).await.unwrap_err();
        let e: MirrorError = send_err.into();
        assert!(matches!(e, MirrorError::ChannelClosed));
    }
}
