//! Terminal presentation adapter.
//!
//! Drains the frame channel on its own task — the reader never blocks
//! on presentation work for more than one in-flight frame. Each frame
//! is normalized to the display pixel layout and kept as the current
//! surface; status lines report resolution changes and the rolling
//! frame rate.

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{debug, info};

use mira_core::{FrameData, FpsCounter, convert};

/// Consumes validated frames and maintains the display surface.
pub struct Presenter {
    fps: FpsCounter,
    surface: Bytes,
    dimensions: (u32, u32),
    frames_presented: u64,
}

impl Presenter {
    pub fn new() -> Self {
        Self {
            fps: FpsCounter::new(),
            surface: Bytes::new(),
            dimensions: (0, 0),
            frames_presented: 0,
        }
    }

    /// Drain the channel until the reader stops and drops the sender.
    pub async fn run(mut self, mut rx: mpsc::Receiver<FrameData>) {
        while let Some(frame) = rx.recv().await {
            self.present(&frame);
        }
        debug!(
            frames = self.frames_presented,
            "frame channel closed; presenter exiting"
        );
    }

    /// Normalize and adopt one frame.
    pub fn present(&mut self, frame: &FrameData) {
        let dims = (frame.width(), frame.height());
        if dims != self.dimensions {
            info!(width = dims.0, height = dims.1, "stream resolution");
            self.dimensions = dims;
        }

        self.surface = convert::normalize(frame);
        self.frames_presented += 1;

        debug!(
            sequence = frame.sequence(),
            bytes = frame.len(),
            timestamp = frame.timestamp(),
            "frame"
        );

        if let Some(rate) = self.fps.record() {
            info!("{rate:.1} fps");
        }
    }

    /// The most recent normalized frame.
    pub fn surface(&self) -> &Bytes {
        &self.surface
    }

    /// Dimensions of the current surface.
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Total frames presented since start.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mira_core::FrameHeader;

    fn frame(sequence: u32, format: u32, payload: &'static [u8]) -> FrameData {
        FrameData {
            header: FrameHeader {
                width: 2,
                height: 1,
                format,
                frame_size: payload.len() as u32,
                timestamp: 0,
                sequence,
                reserved0: 0,
                reserved1: 0,
            },
            payload: Bytes::from_static(payload),
        }
    }

    #[test]
    fn surface_holds_the_normalized_frame() {
        let mut presenter = Presenter::new();
        presenter.present(&frame(1, 2, &[0xA0, 0xB0, 0x60, 0x10]));
        assert_eq!(&presenter.surface()[..], &[0xB0, 0x60, 0x10, 0xA0]);
        assert_eq!(presenter.dimensions(), (2, 1));
        assert_eq!(presenter.frames_presented(), 1);
    }

    #[test]
    fn non_rgba_frames_pass_through() {
        let mut presenter = Presenter::new();
        presenter.present(&frame(1, 1, &[1, 2, 3, 4, 5, 6]));
        assert_eq!(&presenter.surface()[..], &[1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn run_drains_until_sender_drops() {
        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(Presenter::new().run(rx));

        tx.send(frame(1, 2, &[0xA0, 0xB0, 0x60, 0x10])).await.unwrap();
        tx.send(frame(2, 2, &[0xA1, 0xB1, 0x61, 0x11])).await.unwrap();
        drop(tx);

        handle.await.unwrap();
    }
}
