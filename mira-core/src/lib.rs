//! # mira-core
//!
//! Shared-memory frame transport for the mira screen mirror.
//!
//! An out-of-process mirroring engine (the producer) writes decoded
//! video frames into a single-slot shared region: a packed header
//! followed by the pixel payload, stamped with a monotonically
//! increasing sequence number. This crate is the consumer side:
//!
//! - **Region**: `SharedRegion` handles over the producer's two
//!   naming conventions — a temp-directory backing file and a POSIX
//!   named shared-memory object
//! - **Header**: `FrameHeader` — packed wire codec for the frame slot
//! - **Decoder**: `FrameDecoder` — size-bound validation, payload
//!   copy-out, torn-read rejection
//! - **Reader**: `FrameReader` — fixed-cadence poll loop with
//!   sequence-based change detection and cancellable delivery
//! - **Convert**: ABGR → BGRA normalization for the rendering surface
//! - **Stats**: windowed frames-per-second estimate
//! - **Error**: `MirrorError` — typed, `thiserror`-based error hierarchy
//!
//! No cross-process lock protects the frame slot; the size bound plus
//! sequence de-duplication (and a header re-read in the decoder) are
//! the correctness backstop against torn reads.

pub mod convert;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod header;
pub mod reader;
pub mod region;
pub mod stats;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use decoder::FrameDecoder;
pub use error::MirrorError;
pub use frame::{FrameData, PixelFormat};
pub use header::{FrameHeader, FrameHeaderBytes, HEADER_SIZE};
pub use reader::{ConnectOptions, FrameReader, ReaderConfig};
pub use region::{RegionBackend, SharedRegion, open_region};
pub use stats::FpsCounter;
