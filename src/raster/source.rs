//! Decoding input files into page rasters.
//!
//! Images decode to a single page. PDFs are rasterized one page at a time by
//! `PdfiumSource` when the `pdf` feature is enabled; without it they are
//! reported as unsupported input.

use std::path::Path;

use crate::error::{Error, Result};
use crate::raster::PageImage;

/// Render scale used for PDF pages. Pixel thresholds in
/// [`crate::ExtractorConfig`] are tuned for it.
pub const PDF_RENDER_SCALE: f32 = 2.0;

/// Broad category of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A PDF document
    Pdf,
    /// A raster image (PNG, JPEG, TIFF)
    Image,
}

/// Identify an input from its leading bytes, falling back to the file
/// extension.
///
/// # Examples
///
/// ```
/// use question_extractor::raster::{detect_input_kind, InputKind};
///
/// assert_eq!(detect_input_kind("scan.bin", b"%PDF-1.7"), Some(InputKind::Pdf));
/// assert_eq!(detect_input_kind("notes.txt", b"hello"), None);
/// ```
pub fn detect_input_kind(name: &str, bytes: &[u8]) -> Option<InputKind> {
    if bytes.starts_with(b"%PDF-") {
        return Some(InputKind::Pdf);
    }
    if image::guess_format(bytes).is_ok() {
        return Some(InputKind::Image);
    }

    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())?;
    match ext.as_str() {
        "pdf" => Some(InputKind::Pdf),
        "png" | "jpg" | "jpeg" | "tif" | "tiff" => Some(InputKind::Image),
        _ => None,
    }
}

/// Something that turns an input file into page rasters.
pub trait RasterSource {
    /// Decode `bytes` (named `name` for diagnostics) into one raster per page.
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<Vec<PageImage>>;
}

/// Decodes raster images through the `image` crate (one page each) and
/// hands PDFs to `PdfiumSource` when the `pdf` feature is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRasterSource;

impl FileRasterSource {
    fn decode_image(&self, name: &str, bytes: &[u8]) -> Result<PageImage> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| Error::Decode(format!("{}: {}", name, e)))?;
        log::debug!("Decoded {} as {}x{} image", name, decoded.width(), decoded.height());
        PageImage::from_dynamic(decoded)
    }
}

impl RasterSource for FileRasterSource {
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<Vec<PageImage>> {
        if bytes.is_empty() {
            return Err(Error::EmptyInput(name.to_string()));
        }
        match detect_input_kind(name, bytes) {
            Some(InputKind::Image) => Ok(vec![self.decode_image(name, bytes)?]),
            Some(InputKind::Pdf) => dispatch_pdf(name, bytes),
            None => Err(Error::UnsupportedInput(name.to_string())),
        }
    }
}

#[cfg(feature = "pdf")]
fn dispatch_pdf(name: &str, bytes: &[u8]) -> Result<Vec<PageImage>> {
    PdfiumSource::new()?.decode(name, bytes)
}

#[cfg(not(feature = "pdf"))]
fn dispatch_pdf(name: &str, _bytes: &[u8]) -> Result<Vec<PageImage>> {
    Err(Error::UnsupportedInput(format!(
        "{}: PDF input requires the `pdf` feature",
        name
    )))
}

/// Rasterizes PDF pages at [`PDF_RENDER_SCALE`] through a pdfium library
/// bound at runtime.
#[cfg(feature = "pdf")]
pub struct PdfiumSource {
    pdfium: pdfium_render::prelude::Pdfium,
}

#[cfg(feature = "pdf")]
impl PdfiumSource {
    /// Bind to the pdfium library installed on the system.
    pub fn new() -> Result<Self> {
        use pdfium_render::prelude::Pdfium;

        let bindings = Pdfium::bind_to_system_library()
            .map_err(|e| Error::Decode(format!("pdfium unavailable: {}", e)))?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

#[cfg(feature = "pdf")]
impl RasterSource for PdfiumSource {
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<Vec<PageImage>> {
        use pdfium_render::prelude::PdfRenderConfig;

        if bytes.is_empty() {
            return Err(Error::EmptyInput(name.to_string()));
        }
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| Error::Decode(format!("{}: {}", name, e)))?;
        let config = PdfRenderConfig::new().scale_page_by_factor(PDF_RENDER_SCALE);

        let mut pages = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| Error::Decode(format!("{} page {}: {}", name, index + 1, e)))?;
            pages.push(PageImage::from_dynamic(bitmap.as_image())?);
        }
        log::debug!("Rendered {} pages from {}", pages.len(), name);
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        crate::raster::encode_png(&img).unwrap()
    }

    #[test]
    fn test_detect_by_magic_bytes() {
        assert_eq!(detect_input_kind("a", &png_bytes(2, 2)), Some(InputKind::Image));
        assert_eq!(detect_input_kind("a", b"%PDF-1.4\n"), Some(InputKind::Pdf));
    }

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(detect_input_kind("Scan.PDF", b"garbage"), Some(InputKind::Pdf));
        assert_eq!(detect_input_kind("photo.jpeg", b"garbage"), Some(InputKind::Image));
        assert_eq!(detect_input_kind("readme", b"garbage"), None);
    }

    #[test]
    fn test_decode_png_single_page() {
        let pages = FileRasterSource.decode("page.png", &png_bytes(30, 20)).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!((pages[0].width(), pages[0].height()), (30, 20));
    }

    #[test]
    fn test_decode_empty_file() {
        let err = FileRasterSource.decode("empty.png", &[]).unwrap_err();
        assert!(matches!(err, Error::EmptyInput(name) if name == "empty.png"));
    }

    #[test]
    fn test_decode_unknown_type() {
        let err = FileRasterSource.decode("notes.txt", b"just text").unwrap_err();
        assert!(matches!(err, Error::UnsupportedInput(_)));
    }

    #[test]
    fn test_decode_corrupt_png() {
        let mut bytes = png_bytes(8, 8);
        bytes.truncate(20);
        let err = FileRasterSource.decode("broken.png", &bytes).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[cfg(not(feature = "pdf"))]
    #[test]
    fn test_pdf_without_feature_is_unsupported() {
        let err = FileRasterSource.decode("doc.pdf", b"%PDF-1.7\n").unwrap_err();
        assert!(matches!(err, Error::UnsupportedInput(_)));
    }
}
