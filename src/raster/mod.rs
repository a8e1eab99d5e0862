//! Page rasters and the pixel operations the detectors share.
//!
//! A [`PageImage`] owns one decoded RGBA page. Every intermediate buffer the
//! detectors derive from it (grayscale, binary, edge and dilated copies) is an
//! owned `image` buffer local to the function that produces it, so it is
//! released as soon as that step returns.

pub mod filters;
pub mod source;

use std::io::Cursor;

use base64::Engine;
use image::{DynamicImage, GrayImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point as PixelPoint;

use crate::error::{Error, Result};
use crate::geometry::Rect;

pub use source::{detect_input_kind, FileRasterSource, InputKind, RasterSource};

#[cfg(feature = "pdf")]
pub use source::PdfiumSource;

/// An owned 8-bit RGBA page raster.
#[derive(Debug, Clone)]
pub struct PageImage {
    pixels: RgbaImage,
}

impl PageImage {
    /// Wrap an RGBA buffer. Rasters with a zero dimension are rejected.
    pub fn new(pixels: RgbaImage) -> Result<Self> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage { width, height });
        }
        Ok(Self { pixels })
    }

    /// Convert any decoded image to RGBA.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        Self::new(image.into_rgba8())
    }

    /// Build a page from raw interleaved RGBA bytes.
    pub fn from_rgba_bytes(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        let actual = data.len();
        let pixels = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
            Error::Decode(format!(
                "RGBA buffer holds {} bytes, {}x{} needs {}",
                actual, width, height, expected
            ))
        })?;
        Self::new(pixels)
    }

    /// Page width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Page height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Borrow the underlying RGBA buffer.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Consume the page and return its RGBA buffer.
    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }

    /// Luma conversion of the whole page (alpha is ignored).
    pub fn to_gray(&self) -> GrayImage {
        image::imageops::grayscale(&self.pixels)
    }

    /// Luma conversion of the vertical strip `[x, x + width)`.
    pub fn strip_to_gray(&self, x: u32, width: u32) -> GrayImage {
        let x = x.min(self.width());
        let width = width.min(self.width() - x);
        let strip = image::imageops::crop_imm(&self.pixels, x, 0, width, self.height()).to_image();
        image::imageops::grayscale(&strip)
    }

    /// Copy of the page with a solid black band of `thickness` pixels painted
    /// along the segment from `(x_top, 0)` to `(x_bottom, height)`.
    pub fn with_vertical_band(&self, x_top: f32, x_bottom: f32, thickness: u32) -> PageImage {
        let mut masked = self.pixels.clone();
        let half = thickness as f32 / 2.0;
        let bottom = self.height() as i32;
        let polygon = [
            PixelPoint::new((x_top - half).round() as i32, 0),
            PixelPoint::new((x_top + half).round() as i32, 0),
            PixelPoint::new((x_bottom + half).round() as i32, bottom),
            PixelPoint::new((x_bottom - half).round() as i32, bottom),
        ];
        draw_polygon_mut(&mut masked, &polygon, Rgba([0, 0, 0, 255]));
        PageImage { pixels: masked }
    }

    /// Copy out the pixels inside `rect`, which must lie within the page.
    pub fn crop(&self, rect: &Rect) -> RgbaImage {
        image::imageops::crop_imm(&self.pixels, rect.x1, rect.y1, rect.width(), rect.height())
            .to_image()
    }
}

/// Encode an RGBA buffer as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Render PNG bytes as a `data:` URL for embedding in HTML.
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", base64::engine::general_purpose::STANDARD.encode(png))
}
