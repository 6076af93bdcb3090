//! Pixel-format normalization for display.
//!
//! The producer's format tag 2 arrives as A,B,G,R per pixel on the
//! supported platform and must be permuted to B,G,R,A before handing
//! to a rendering surface. The permutation is a pure function of the
//! payload; other format tags pass through unconverted.

use bytes::Bytes;

use crate::frame::{FrameData, PixelFormat};

/// Permute a 4-byte-per-pixel A,B,G,R payload into B,G,R,A.
///
/// `dst` must be at least as long as `src`. Trailing bytes that do
/// not form a complete pixel are copied verbatim.
///
/// Per pixel: out[0]=in[1], out[1]=in[2], out[2]=in[3], out[3]=in[0].
pub fn abgr_to_bgra(src: &[u8], dst: &mut [u8]) {
    debug_assert!(dst.len() >= src.len());
    let pixels = src.len() / 4;
    for i in 0..pixels {
        let s = &src[i * 4..i * 4 + 4];
        let d = &mut dst[i * 4..i * 4 + 4];
        d[0] = s[1]; // B
        d[1] = s[2]; // G
        d[2] = s[3]; // R
        d[3] = s[0]; // A
    }
    let rest = pixels * 4;
    dst[rest..src.len()].copy_from_slice(&src[rest..]);
}

/// Normalize a frame's payload into the layout expected by the
/// rendering surface.
///
/// Format tag 2 is permuted A,B,G,R → B,G,R,A; every other tag is
/// returned as-is (out of scope for conversion).
pub fn normalize(frame: &FrameData) -> Bytes {
    match frame.pixel_format() {
        PixelFormat::Rgba8 => {
            let mut out = vec![0u8; frame.payload.len()];
            abgr_to_bgra(&frame.payload, &mut out);
            Bytes::from(out)
        }
        _ => frame.payload.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::FrameHeader;

    fn frame(format: u32, payload: &'static [u8]) -> FrameData {
        FrameData {
            header: FrameHeader {
                width: 2,
                height: 1,
                format,
                frame_size: payload.len() as u32,
                timestamp: 0,
                sequence: 5,
                reserved0: 0,
                reserved1: 0,
            },
            payload: Bytes::from_static(payload),
        }
    }

    #[test]
    fn permutes_two_pixels() {
        // [A0,B0,G0,R0, A1,B1,G1,R1] → [B0,G0,R0,A0, B1,G1,R1,A1]
        let src = [0xA0, 0xB0, 0x60, 0x10, 0xA1, 0xB1, 0x61, 0x11];
        let mut dst = [0u8; 8];
        abgr_to_bgra(&src, &mut dst);
        assert_eq!(dst, [0xB0, 0x60, 0x10, 0xA0, 0xB1, 0x61, 0x11, 0xA1]);
    }

    #[test]
    fn normalize_converts_format_2() {
        let f = frame(2, &[0xA0, 0xB0, 0x60, 0x10, 0xA1, 0xB1, 0x61, 0x11]);
        let out = normalize(&f);
        assert_eq!(
            &out[..],
            &[0xB0, 0x60, 0x10, 0xA0, 0xB1, 0x61, 0x11, 0xA1]
        );
    }

    #[test]
    fn normalize_passes_other_formats_through() {
        let f = frame(1, &[1, 2, 3, 4, 5, 6]);
        let out = normalize(&f);
        assert_eq!(&out[..], &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn trailing_partial_pixel_is_copied() {
        let src = [0xA0, 0xB0, 0x60, 0x10, 0xFF, 0xFE];
        let mut dst = [0u8; 6];
        abgr_to_bgra(&src, &mut dst);
        assert_eq!(dst, [0xB0, 0x60, 0x10, 0xA0, 0xFF, 0xFE]);
    }
}
