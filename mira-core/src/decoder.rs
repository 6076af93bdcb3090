//! Frame decoder / validator.
//!
//! Turns the raw bytes of a shared region into a [`FrameData`], or
//! into nothing when the slot does not currently hold a structurally
//! valid frame. Whether a valid frame is *new* is not decided here —
//! sequence comparison belongs to the poll loop.

use bytes::Bytes;
use tracing::trace;

use crate::error::MirrorError;
use crate::frame::FrameData;
use crate::header::{FrameHeader, HEADER_SIZE};
use crate::region::SharedRegion;

/// Decodes and validates the current contents of a shared region.
pub struct FrameDecoder {
    max_frame_size: usize,
}

impl FrameDecoder {
    /// Create a decoder for the agreed maximum payload size.
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// The agreed maximum payload size.
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Decode the frame currently in the region.
    ///
    /// Returns `Ok(None)` when the slot holds no valid frame — the
    /// `frame_size` bound check failed, or the header changed under
    /// us while the payload was being copied (torn write). Both are
    /// expected transient conditions, retried on the next tick.
    ///
    /// `Err` is reserved for region-level failures (closed handle,
    /// out-of-bounds mapping) and makes the poll loop back off.
    pub fn decode(&self, region: &dyn SharedRegion) -> Result<Option<FrameData>, MirrorError> {
        let mut raw = [0u8; HEADER_SIZE];
        region.read_into(0, &mut raw)?;
        let header = FrameHeader::from_bytes(&raw);

        let size = header.frame_size as usize;
        if size == 0 || size > self.max_frame_size {
            trace!(
                frame_size = header.frame_size,
                max = self.max_frame_size,
                "rejected frame with out-of-bounds size"
            );
            return Ok(None);
        }

        let mut payload = vec![0u8; size];
        region.read_into(HEADER_SIZE, &mut payload)?;

        // The producer takes no lock, so the payload copy can race a
        // new frame being written. Re-read the header: if the sequence
        // or size moved, the copy is torn — drop it and let the next
        // tick pick up the finished frame.
        let mut check = [0u8; HEADER_SIZE];
        region.read_into(0, &mut check)?;
        let reread = FrameHeader::from_bytes(&check);
        if reread.sequence != header.sequence || reread.frame_size != header.frame_size {
            trace!(
                first = header.sequence,
                second = reread.sequence,
                "discarded torn frame read"
            );
            return Ok(None);
        }

        Ok(Some(FrameData {
            header,
            payload: Bytes::from(payload),
        }))
    }
}
