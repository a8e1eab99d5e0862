//! Thresholding, gradient and morphology helpers on grayscale buffers.
//!
//! Binary images use `0` for background and `255` for foreground.

use image::{GrayImage, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use imageproc::morphology::{grayscale_dilate, Mask};

/// Largest kernel side a structuring element may have.
pub const MAX_KERNEL: u32 = 511;

/// Inverted fixed threshold: pixels brighter than `threshold` become
/// background, everything else (ink) becomes foreground.
pub fn binarize_inverted(gray: &GrayImage, level: u8) -> GrayImage {
    threshold(gray, level, ThresholdType::BinaryInverted)
}

/// Global Otsu binarization: pixels strictly above the Otsu level become
/// foreground.
pub fn binarize_otsu(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    log::trace!("Otsu level {}", level);
    threshold(gray, level, ThresholdType::Binary)
}

/// Equal-weighted Sobel gradient magnitude, `0.5 * |gx| + 0.5 * |gy|`, with
/// each absolute response saturated to 255 first.
pub fn gradient_magnitude(gray: &GrayImage) -> GrayImage {
    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);
    let (width, height) = gray.dimensions();

    GrayImage::from_fn(width, height, |x, y| {
        let ax = gx.get_pixel(x, y).0[0].unsigned_abs().min(255);
        let ay = gy.get_pixel(x, y).0[0].unsigned_abs().min(255);
        Luma([((ax + ay + 1) / 2) as u8])
    })
}

/// Inverted adaptive mean threshold.
///
/// For each pixel the local mean is taken over a `block_size` square window
/// (shrunk at the borders). A pixel is foreground when it is not brighter
/// than `mean - c`, so flat regions of any brightness stay background.
pub fn adaptive_threshold_inverted(gray: &GrayImage, block_size: u32, c: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let integral = IntegralImage::new(gray);
    let radius = block_size / 2;

    GrayImage::from_fn(width, height, |x, y| {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius).min(width - 1);
        let y1 = (y + radius).min(height - 1);
        let mean = integral.mean(x0, y0, x1, y1);
        let value = gray.get_pixel(x, y).0[0] as f32;
        Luma([if value > mean - c { 0 } else { 255 }])
    })
}

/// Dilate a binary image with a `kernel_width` x `kernel_height` rectangle
/// anchored at `(kernel_width / 2, kernel_height / 2)`, `iterations` times.
///
/// Kernel sides are clamped to `1..=MAX_KERNEL`. Pixels outside the image
/// never contribute.
pub fn dilate_rect(
    binary: &GrayImage,
    kernel_width: u32,
    kernel_height: u32,
    iterations: u32,
) -> GrayImage {
    let mask = rect_mask(kernel_width, kernel_height);
    let mut out = binary.clone();
    for _ in 0..iterations {
        out = grayscale_dilate(&out, &mask);
    }
    out
}

fn rect_mask(kernel_width: u32, kernel_height: u32) -> Mask {
    let width = kernel_width.clamp(1, MAX_KERNEL);
    let height = kernel_height.clamp(1, MAX_KERNEL);
    let element = GrayImage::from_pixel(width, height, Luma([255]));
    // Centers are at most 255 after the clamp
    Mask::from_image(&element, (width / 2) as u8, (height / 2) as u8)
}

/// Summed-area table with a zero row and column in front.
struct IntegralImage {
    sums: Vec<u64>,
    stride: usize,
}

impl IntegralImage {
    fn new(gray: &GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        let stride = width as usize + 1;
        let mut sums = vec![0u64; stride * (height as usize + 1)];

        for y in 0..height as usize {
            let mut row_sum = 0u64;
            for x in 0..width as usize {
                row_sum += u64::from(gray.get_pixel(x as u32, y as u32).0[0]);
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }
        Self { sums, stride }
    }

    /// Mean over the inclusive window `[x0, x1] x [y0, y1]`.
    fn mean(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> f32 {
        let (x0, y0, x1, y1) = (x0 as usize, y0 as usize, x1 as usize + 1, y1 as usize + 1);
        let s = self.stride;
        let total = self.sums[y1 * s + x1] + self.sums[y0 * s + x0]
            - self.sums[y0 * s + x1]
            - self.sums[y1 * s + x0];
        let count = ((x1 - x0) * (y1 - y0)) as f32;
        total as f32 / count
    }
}
