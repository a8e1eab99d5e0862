//! Candidate content block detection.
//!
//! Two complementary strategies run over the same page and their boxes are
//! pooled without deduplication. Recall matters more than precision here:
//! overlapping and duplicate boxes are collapsed later by
//! [`crate::layout::clustering::merge_blocks`].
//!
//! - **Gradient**: Sobel magnitude, Otsu threshold and a wide dilation fuse
//!   printed strokes into line-shaped blobs.
//! - **Adaptive**: a local mean threshold survives uneven illumination on
//!   photographed pages.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::filter::gaussian_blur_f32;

use crate::config::ExtractorConfig;
use crate::geometry::Rect;
use crate::raster::filters::{
    adaptive_threshold_inverted, binarize_otsu, dilate_rect, gradient_magnitude,
};
use crate::raster::PageImage;

/// Sigma of a 3x3 Gaussian kernel.
const BLUR_SIGMA_3X3: f32 = 0.8;

/// Detect candidate blocks on `page` with both strategies.
///
/// Gradient boxes come first, then adaptive boxes, each in contour
/// discovery order.
pub fn detect_blocks(page: &PageImage, config: &ExtractorConfig) -> Vec<Rect> {
    let gray = page.to_gray();
    let mut blocks = gradient_blocks(&gray, config);
    let gradient_count = blocks.len();
    blocks.extend(adaptive_blocks(&gray, config));
    log::debug!(
        "Detected {} raw blocks ({} gradient, {} adaptive)",
        blocks.len(),
        gradient_count,
        blocks.len() - gradient_count
    );
    blocks
}

/// Gradient-magnitude strategy.
pub fn gradient_blocks(gray: &GrayImage, config: &ExtractorConfig) -> Vec<Rect> {
    let dilated = {
        let gradient = gradient_magnitude(gray);
        let binary = binarize_otsu(&gradient);
        dilate_rect(
            &binary,
            config.gradient_kernel_width,
            config.gradient_kernel_height,
            config.gradient_iterations,
        )
    };
    let limits = SizeLimits::new(gray, config.gradient_min_size, config.max_block_fraction);
    external_boxes(&dilated)
        .into_iter()
        .filter(|r| limits.accepts(r))
        .collect()
}

/// Adaptive-threshold strategy.
pub fn adaptive_blocks(gray: &GrayImage, config: &ExtractorConfig) -> Vec<Rect> {
    let dilated = {
        let blurred = gaussian_blur_f32(gray, BLUR_SIGMA_3X3);
        let binary =
            adaptive_threshold_inverted(&blurred, config.adaptive_block_size, config.adaptive_c);
        dilate_rect(&binary, config.adaptive_kernel, config.adaptive_kernel, 1)
    };
    let limits = SizeLimits::new(gray, config.adaptive_min_size, config.max_block_fraction);
    external_boxes(&dilated)
        .into_iter()
        .filter(|r| limits.accepts(r))
        .collect()
}

/// Bounding boxes of the outermost foreground components.
///
/// Components nested inside a hole of another component are skipped, as are
/// hole borders themselves.
fn external_boxes(binary: &GrayImage) -> Vec<Rect> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| {
            let xs = c.points.iter().map(|p| p.x);
            let ys = c.points.iter().map(|p| p.y);
            let (x1, x2) = (xs.clone().min()?, xs.max()?);
            let (y1, y2) = (ys.clone().min()?, ys.max()?);
            Some(Rect::new(x1 as u32, y1 as u32, x2 as u32 + 1, y2 as u32 + 1))
        })
        .collect()
}

/// Strict size window `min < side < fraction * page_side` on both axes.
struct SizeLimits {
    min: u32,
    max_width: f32,
    max_height: f32,
}

impl SizeLimits {
    fn new(gray: &GrayImage, min: u32, fraction: f32) -> Self {
        Self {
            min,
            max_width: gray.width() as f32 * fraction,
            max_height: gray.height() as f32 * fraction,
        }
    }

    fn accepts(&self, r: &Rect) -> bool {
        let (w, h) = (r.width(), r.height());
        w > self.min && h > self.min && (w as f32) < self.max_width && (h as f32) < self.max_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba, RgbaImage};

    fn page_with_boxes(width: u32, height: u32, boxes: &[Rect]) -> PageImage {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            let ink = boxes.iter().any(|b| x >= b.x1 && x < b.x2 && y >= b.y1 && y < b.y2);
            if ink {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        PageImage::new(img).unwrap()
    }

    fn near(a: &Rect, b: &Rect, tol: u32) -> bool {
        a.x1.abs_diff(b.x1) <= tol
            && a.y1.abs_diff(b.y1) <= tol
            && a.x2.abs_diff(b.x2) <= tol
            && a.y2.abs_diff(b.y2) <= tol
    }

    #[test]
    fn test_blank_page_has_no_blocks() {
        let page = page_with_boxes(300, 400, &[]);
        assert!(detect_blocks(&page, &ExtractorConfig::default()).is_empty());
    }

    #[test]
    fn test_external_boxes_skip_holes_and_nested() {
        // Ring with a dot inside its hole
        let img = GrayImage::from_fn(40, 40, |x, y| {
            let ring = (5..35).contains(&x)
                && (5..35).contains(&y)
                && !((10..30).contains(&x) && (10..30).contains(&y));
            let dot = (18..22).contains(&x) && (18..22).contains(&y);
            Luma([if ring || dot { 255 } else { 0 }])
        });
        assert_eq!(external_boxes(&img), vec![Rect::new(5, 5, 35, 35)]);
    }

    #[test]
    fn test_both_strategies_find_solid_box() {
        let target = Rect::new(60, 80, 260, 160);
        let page = page_with_boxes(400, 500, &[target]);
        let config = ExtractorConfig::default();
        let gray = page.to_gray();

        let gradient = gradient_blocks(&gray, &config);
        assert_eq!(gradient.len(), 1);
        // Dilation widens by up to 14px horizontally and 2px vertically
        assert!(gradient[0].contains(&Rect::new(62, 82, 258, 158)));
        assert!(near(&gradient[0], &target, 16));

        let adaptive = adaptive_blocks(&gray, &config);
        assert_eq!(adaptive.len(), 1);
        assert!(near(&adaptive[0], &target, 4));

        let pooled = detect_blocks(&page, &config);
        assert_eq!(pooled.len(), 2);
        assert_eq!(pooled[0], gradient[0]);
        assert_eq!(pooled[1], adaptive[0]);
    }

    #[test]
    fn test_small_specks_rejected() {
        let page = page_with_boxes(300, 300, &[Rect::new(100, 100, 104, 104)]);
        assert!(detect_blocks(&page, &ExtractorConfig::default()).is_empty());
    }

    #[test]
    fn test_full_height_band_rejected() {
        let page = page_with_boxes(300, 300, &[Rect::new(140, 0, 160, 300)]);
        assert!(detect_blocks(&page, &ExtractorConfig::default()).is_empty());
    }

    #[test]
    fn test_size_limits_are_strict() {
        let gray = GrayImage::new(100, 100);
        let limits = SizeLimits::new(&gray, 10, 0.95);
        assert!(!limits.accepts(&Rect::from_xywh(0, 0, 10, 50)));
        assert!(limits.accepts(&Rect::from_xywh(0, 0, 11, 50)));
        assert!(!limits.accepts(&Rect::from_xywh(0, 0, 95, 50)));
        assert!(limits.accepts(&Rect::from_xywh(0, 0, 94, 50)));
    }
}
