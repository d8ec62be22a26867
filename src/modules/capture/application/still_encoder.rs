use bytes::Bytes;
use image::{codecs::jpeg::JpegEncoder, ExtendedColorType, ImageError};

use crate::capture::application::domain::entities::VideoFrame;

pub const STILL_JPEG_QUALITY: u8 = 80;

/// Encodes a video frame as a baseline JPEG at [`STILL_JPEG_QUALITY`].
pub fn encode_jpeg(frame: &VideoFrame) -> Result<Bytes, ImageError> {
    let mut out = Vec::with_capacity(frame.rgb().len() / 8);
    JpegEncoder::new_with_quality(&mut out, STILL_JPEG_QUALITY).encode(
        frame.rgb(),
        frame.width(),
        frame.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(Bytes::from(out))
}
