//! Internal pixel-buffer helpers.
//!
//! Decoded FFmpeg frames frequently carry per-row padding (stride greater
//! than `width * 4`). These helpers strip that padding so buffers can be
//! handed to callers as tightly-packed RGBA8888, and convert between the
//! frame representation and [`image::RgbaImage`].

use ffmpeg_next::frame::Video as VideoFrame;
use image::RgbaImage;

/// Bytes per pixel for RGBA8888 output.
pub(crate) const RGBA_BYTES_PER_PIXEL: usize = 4;

/// Copy pixel data from an RGBA video frame into a tightly-packed buffer.
///
/// The result is `width * height * 4` bytes, row-major, no row padding.
pub(crate) fn frame_to_rgba_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * RGBA_BYTES_PER_PIXEL;
    let data = video_frame.data(0);

    if stride == expected_stride {
        // No padding, copy the entire plane at once.
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}

/// Wrap a tightly-packed RGBA buffer in an [`RgbaImage`].
///
/// Returns `None` when the buffer length does not match `width * height * 4`.
pub(crate) fn rgba_buffer_to_image(buffer: Vec<u8>, width: u32, height: u32) -> Option<RgbaImage> {
    RgbaImage::from_raw(width, height, buffer)
}
