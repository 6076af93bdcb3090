//! Poll loop / change detector.
//!
//! A [`FrameReader`] owns one shared-region handle, polls it on a
//! fixed cadence, and turns "the producer wrote a new frame" into
//! exactly one notification per new frame on a bounded channel. The
//! loop never blocks the producer and never busy-spins: a failed
//! decode is retried on the next tick, and lower-level read failures
//! back off to a longer interval.
//!
//! Intended usage mirrors the rest of the pipeline:
//!
//! ```no_run
//! # use mira_core::reader::{ConnectOptions, FrameReader};
//! # async fn example() -> Result<(), mira_core::MirrorError> {
//! let reader = FrameReader::open(&ConnectOptions::default())?;
//! let token = reader.cancellation_token();
//! let (tx, mut rx) = tokio::sync::mpsc::channel(4);
//! tokio::spawn(async move { reader.run(tx).await });
//! while let Some(_frame) = rx.recv().await {
//!     // hand to the presentation layer
//! }
//! token.cancel();
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::decoder::FrameDecoder;
use crate::error::MirrorError;
use crate::frame::FrameData;
use crate::header::HEADER_SIZE;
use crate::region::{RegionBackend, SharedRegion, open_region};

// ── ConnectOptions ───────────────────────────────────────────────

/// Parameters agreed out-of-band with the producer.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Stream identifier the region name is derived from.
    pub stream_name: String,
    /// Maximum payload size the region was sized for.
    pub max_frame_size: usize,
    /// Naming/location convention the producer used.
    pub backend: RegionBackend,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            stream_name: "frames_8888".into(),
            // Full-HD RGBA.
            max_frame_size: 1920 * 1080 * 4,
            backend: RegionBackend::default(),
        }
    }
}

// ── ReaderConfig ─────────────────────────────────────────────────

/// Timing configuration for the poll loop.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Delay between poll ticks (~60 Hz by default).
    pub poll_interval: Duration,
    /// Delay before resuming after an unexpected read failure.
    pub backoff_interval: Duration,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(16),
            backoff_interval: Duration::from_millis(100),
        }
    }
}

// ── FrameReader ──────────────────────────────────────────────────

/// Consumer-side frame reader over one shared region.
///
/// # Lifetime
///
/// [`open`](Self::open) maps the region once; [`run`](Self::run)
/// consumes the reader, polls until cancelled, and closes the region
/// exactly once on every exit path. Dropping an unstarted reader also
/// releases the mapping.
pub struct FrameReader {
    region: Box<dyn SharedRegion>,
    decoder: FrameDecoder,
    config: ReaderConfig,
    token: CancellationToken,
}

impl FrameReader {
    /// Open the producer's region with default timing.
    pub fn open(options: &ConnectOptions) -> Result<Self, MirrorError> {
        Self::with_config(options, ReaderConfig::default())
    }

    /// Open the producer's region with explicit timing.
    pub fn with_config(
        options: &ConnectOptions,
        config: ReaderConfig,
    ) -> Result<Self, MirrorError> {
        let total_size = HEADER_SIZE + options.max_frame_size;
        let region = open_region(options.backend, &options.stream_name, total_size)?;
        Ok(Self::from_region(region, options.max_frame_size, config))
    }

    /// Build a reader over an already-opened region handle.
    pub fn from_region(
        region: Box<dyn SharedRegion>,
        max_frame_size: usize,
        config: ReaderConfig,
    ) -> Self {
        Self {
            region,
            decoder: FrameDecoder::new(max_frame_size),
            config,
            token: CancellationToken::new(),
        }
    }

    /// A clone of the cancellation token. Cancelling it stops the
    /// loop within one tick interval.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Run the poll loop until cancelled.
    ///
    /// Emits every newly observed frame on `tx`, in poll-tick order,
    /// with at most one send in flight at a time. Returns `Ok(())` on
    /// cancellation and `Err(MirrorError::ChannelClosed)` if the
    /// receiver goes away while frames are still flowing — the one
    /// "monitoring stopped unexpectedly" condition worth surfacing.
    pub async fn run(mut self, tx: mpsc::Sender<FrameData>) -> Result<(), MirrorError> {
        // `None` until the first frame: a producer whose counter
        // starts at 0 still gets its first frame notified.
        let mut last_notified: Option<u32> = None;

        let result = loop {
            match self.decoder.decode(self.region.as_ref()) {
                Ok(Some(frame)) => {
                    let sequence = frame.sequence();
                    if last_notified != Some(sequence) {
                        last_notified = Some(sequence);
                        tokio::select! {
                            biased;
                            _ = self.token.cancelled() => break Ok(()),
                            sent = tx.send(frame) => {
                                if sent.is_err() {
                                    break Err(MirrorError::ChannelClosed);
                                }
                            }
                        }
                    }
                    if !self.tick(self.config.poll_interval).await {
                        break Ok(());
                    }
                }
                // No valid frame in the slot right now — retry next tick.
                Ok(None) => {
                    if !self.tick(self.config.poll_interval).await {
                        break Ok(());
                    }
                }
                Err(e) => {
                    warn!("frame poll failed: {e}; backing off");
                    if !self.tick(self.config.backoff_interval).await {
                        break Ok(());
                    }
                }
            }
        };

        self.region.close();
        debug!("frame reader stopped");
        result
    }

    /// Cancellable inter-tick delay. Returns `false` once cancellation
    /// is requested.
    async fn tick(&self, interval: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => false,
            _ = tokio::time::sleep(interval) => true,
        }
    }
}

impl std::fmt::Debug for FrameReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReader")
            .field("config", &self.config)
            .field("closed", &self.region.is_closed())
            .finish_non_exhaustive()
    }
}
