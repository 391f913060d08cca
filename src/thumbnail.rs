//! Fixed-size colour grids for affix icons and character portraits.
//!
//! Images are scaled down to `THUMB_WIDTH x THUMB_HEIGHT` pixels. The terminal
//! draws two pixel rows per cell with an upper half block, so a thumbnail
//! occupies `THUMB_WIDTH` columns and `THUMB_HEIGHT / 2` rows.

use image::imageops::FilterType;

use crate::error::Result;

pub const THUMB_WIDTH: u32 = 4;
pub const THUMB_HEIGHT: u32 = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Thumbnail {
    // Row-major RGB; empty for the blank thumbnail.
    pixels: Vec<[u8; 3]>,
}

impl Thumbnail {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?;
        let rgba = image.to_rgba8();
        let small = image::imageops::resize(&rgba, THUMB_WIDTH, THUMB_HEIGHT, FilterType::Triangle);
        let pixels = small
            .pixels()
            .map(|p| {
                // Premultiply over black so transparent corners stay dark.
                let [r, g, b, a] = p.0;
                let scale = |c: u8| ((c as u16 * a as u16) / 255) as u8;
                [scale(r), scale(g), scale(b)]
            })
            .collect();
        Ok(Self { pixels })
    }

    /// Like [`Thumbnail::decode`] but never fails.
    pub fn decode_or_blank(bytes: &[u8]) -> Self {
        Self::decode(bytes).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "thumbnail decode failed");
            Self::blank()
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= THUMB_WIDTH || y >= THUMB_HEIGHT {
            return None;
        }
        self.pixels.get((y * THUMB_WIDTH + x) as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_to_fixed_size() {
        let thumb = Thumbnail::decode(&png_bytes(56, 56, [200, 40, 10, 255])).unwrap();

        assert!(!thumb.is_blank());
        assert_eq!(thumb.pixel(0, 0), Some([200, 40, 10]));
        assert_eq!(thumb.pixel(THUMB_WIDTH - 1, THUMB_HEIGHT - 1), Some([200, 40, 10]));
        assert_eq!(thumb.pixel(THUMB_WIDTH, 0), None);
    }

    #[test]
    fn garbage_bytes_degrade_to_blank() {
        let thumb = Thumbnail::decode_or_blank(b"<html>not found</html>");
        assert!(thumb.is_blank());
        assert_eq!(thumb.pixel(0, 0), None);
    }
}
