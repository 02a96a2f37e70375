//! Icon texture handles and BC decoding to RGBA.
//!
//! A [`TextureHandle`] is an opaque reference to one icon resource: its
//! unique name plus the raw pixel payload as stored in the asset database.
//! Decoding turns the block-compressed payload into an RGBA image ready
//! for PNG encoding.

use std::sync::Arc;

use image::RgbaImage;
use thiserror::Error;

/// Pixel formats we support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Bc1,
    Bc3,
    Bc7,
    Rgba8,
}

impl PixelFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PF_DXT1" => Some(PixelFormat::Bc1),
            "PF_DXT5" => Some(PixelFormat::Bc3),
            "PF_BC7" => Some(PixelFormat::Bc7),
            "PF_B8G8R8A8" | "PF_R8G8B8A8" => Some(PixelFormat::Rgba8),
            _ => None,
        }
    }

    /// Bytes per 4x4 block for block-compressed formats, or bytes per pixel
    pub fn bytes_per_block(self) -> usize {
        match self {
            PixelFormat::Bc1 => 8,
            PixelFormat::Bc3 | PixelFormat::Bc7 => 16,
            PixelFormat::Rgba8 => 4,
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{format:?} data too small: got {got}, expected {expected}")]
    Truncated {
        format: PixelFormat,
        got: usize,
        expected: usize,
    },
    #[error("{format:?} decode failed: {reason}")]
    Decode {
        format: PixelFormat,
        reason: String,
    },
    #[error("image buffer allocation failed for {width}x{height}")]
    Buffer { width: u32, height: u32 },
}

/// Reference to one icon texture resource.
///
/// Cloning is cheap; the pixel payload is shared.
#[derive(Debug, Clone)]
pub struct TextureHandle {
    name: String,
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Arc<[u8]>,
}

impl TextureHandle {
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            format,
            data: data.into(),
        }
    }

    /// Unique name of the texture resource, used as the exported file stem.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Decode the payload to an RGBA image.
    pub fn decode(&self) -> Result<RgbaImage, DecodeError> {
        let w = self.width as usize;
        let h = self.height as usize;

        let expected = match self.format {
            PixelFormat::Rgba8 => w * h * 4,
            bc => w.div_ceil(4) * h.div_ceil(4) * bc.bytes_per_block(),
        };
        if self.data.len() < expected {
            return Err(DecodeError::Truncated {
                format: self.format,
                got: self.data.len(),
                expected,
            });
        }

        let rgba = match self.format {
            PixelFormat::Rgba8 => self.data[..expected].to_vec(),
            bc => {
                let mut output = vec![0u32; w * h];
                let result = match bc {
                    PixelFormat::Bc1 => texture2ddecoder::decode_bc1(&self.data, w, h, &mut output),
                    PixelFormat::Bc3 => texture2ddecoder::decode_bc3(&self.data, w, h, &mut output),
                    PixelFormat::Bc7 => texture2ddecoder::decode_bc7(&self.data, w, h, &mut output),
                    PixelFormat::Rgba8 => unreachable!(),
                };
                result.map_err(|e| DecodeError::Decode {
                    format: bc,
                    reason: format!("{e:?}"),
                })?;
                u32_to_u8_rgba(&output)
            }
        };

        RgbaImage::from_raw(self.width, self.height, rgba).ok_or(DecodeError::Buffer {
            width: self.width,
            height: self.height,
        })
    }
}

/// Convert u32 pixel buffer to u8 RGBA buffer
fn u32_to_u8_rgba(u32_buf: &[u32]) -> Vec<u8> {
    let mut result = Vec::with_capacity(u32_buf.len() * 4);
    for &pixel in u32_buf {
        // texture2ddecoder uses ARGB or BGRA layout, need to convert to RGBA
        let b = (pixel & 0xFF) as u8;
        let g = ((pixel >> 8) & 0xFF) as u8;
        let r = ((pixel >> 16) & 0xFF) as u8;
        let a = ((pixel >> 24) & 0xFF) as u8;
        result.push(r);
        result.push(g);
        result.push(b);
        result.push(a);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba_handle(name: &str, width: u32, height: u32) -> TextureHandle {
        let data = vec![0x7Fu8; (width * height * 4) as usize];
        TextureHandle::new(name, width, height, PixelFormat::Rgba8, data)
    }

    #[test]
    fn format_names_match_engine_names() {
        assert_eq!(PixelFormat::from_name("PF_DXT1"), Some(PixelFormat::Bc1));
        assert_eq!(PixelFormat::from_name("PF_BC7"), Some(PixelFormat::Bc7));
        assert_eq!(
            PixelFormat::from_name("PF_B8G8R8A8"),
            Some(PixelFormat::Rgba8)
        );
        assert_eq!(PixelFormat::from_name("PF_G16"), None);
    }

    #[test]
    fn decode_rgba8_roundtrips_dimensions() {
        let handle = rgba_handle("T_Icon", 4, 2);
        let img = handle.decode().unwrap();
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 2);
    }

    #[test]
    fn decode_rejects_truncated_payload() {
        let handle = TextureHandle::new("T_Short", 8, 8, PixelFormat::Bc7, vec![0u8; 4]);
        match handle.decode() {
            Err(DecodeError::Truncated { expected, got, .. }) => {
                assert_eq!(expected, 64);
                assert_eq!(got, 4);
            }
            other => panic!("expected Truncated, got {other:?}"),
        }
    }
}
