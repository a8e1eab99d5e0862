//! Column divider detection.
//!
//! Two-column worksheets print a vertical rule between the columns. The
//! detector searches a strip around the page center for long, nearly
//! vertical line segments and summarizes them with independent medians of
//! slope and intercept, which tolerates stray segments from nearby text.

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::hough::{detect_lines, LineDetectionOptions, PolarLine};

use crate::config::ExtractorConfig;
use crate::geometry::Point;
use crate::raster::filters::binarize_inverted;
use crate::raster::PageImage;

use super::Side;

/// The line `x(y) = x + slope * y` separating the two columns, with `y`
/// measured from the top of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Divider {
    /// Horizontal position of the line at `y = 0`
    pub x: f32,
    /// Horizontal displacement per unit of vertical distance
    pub slope: f32,
}

impl Divider {
    /// Create a divider from its intercept and slope.
    pub fn new(x: f32, slope: f32) -> Self {
        Self { x, slope }
    }

    /// Fallback divider: a vertical line through the page center.
    ///
    /// # Examples
    ///
    /// ```
    /// use question_extractor::layout::Divider;
    ///
    /// assert_eq!(Divider::default_for_width(1000), Divider::new(500.0, 0.0));
    /// ```
    pub fn default_for_width(width: u32) -> Self {
        Self {
            x: width as f32 / 2.0,
            slope: 0.0,
        }
    }

    /// Horizontal position of the divider at height `y`.
    pub fn x_at(&self, y: f32) -> f32 {
        self.x + self.slope * y
    }

    /// Which column a point falls in. Points exactly on the line go right.
    ///
    /// # Examples
    ///
    /// ```
    /// use question_extractor::geometry::Point;
    /// use question_extractor::layout::{Divider, Side};
    ///
    /// let divider = Divider::new(500.0, 0.1);
    /// assert_eq!(divider.side_of(Point::new(540.0, 500.0)), Side::Left);
    /// assert_eq!(divider.side_of(Point::new(560.0, 500.0)), Side::Right);
    /// ```
    pub fn side_of(&self, p: Point) -> Side {
        if p.x < self.x_at(p.y) {
            Side::Left
        } else {
            Side::Right
        }
    }
}

/// A finite line segment in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// Start x
    pub x1: f32,
    /// Start y
    pub y1: f32,
    /// End x
    pub x2: f32,
    /// End y
    pub y2: f32,
}

impl LineSegment {
    /// Euclidean length.
    pub fn length(&self) -> f32 {
        ((self.x2 - self.x1).powi(2) + (self.y2 - self.y1).powi(2)).sqrt()
    }
}

/// Parameters for [`find_line_segments`].
#[derive(Debug, Clone, Copy)]
pub struct SegmentSearch {
    /// Minimum Hough accumulator votes for a candidate line
    pub vote_threshold: u32,
    /// Segments shorter than this are discarded
    pub min_length: f32,
    /// Runs of missing edge pixels up to this length are bridged
    pub max_gap: u32,
}

/// Estimate the column divider of `page`.
///
/// Returns [`Divider::default_for_width`] when no near-vertical segment is
/// found in the search strip.
pub fn detect_divider(page: &PageImage, config: &ExtractorConfig) -> Divider {
    let width = page.width();
    let height = page.height();
    let fallback = Divider::default_for_width(width);

    let strip_x = (width as f32 * config.divider_strip_start).floor() as u32;
    let strip_w = (width as f32 * config.divider_strip_width).floor() as u32;
    if strip_w == 0 {
        return fallback;
    }

    let edges = {
        let gray = page.strip_to_gray(strip_x, strip_w);
        let binary = binarize_inverted(&gray, config.divider_binary_threshold);
        canny(&binary, config.canny_low, config.canny_high)
    };

    let search = SegmentSearch {
        vote_threshold: (height / 8).max(1),
        min_length: height as f32 / 5.0,
        max_gap: config.hough_max_gap,
    };
    let segments = find_line_segments(&edges, &search);

    let mut slopes = Vec::new();
    let mut intercepts = Vec::new();
    for seg in &segments {
        if seg.y1 == seg.y2 {
            continue;
        }
        let m = (seg.x2 - seg.x1) / (seg.y2 - seg.y1);
        if m.abs() < config.max_divider_slope {
            slopes.push(m);
            intercepts.push(seg.x1 + strip_x as f32 - m * seg.y1);
        }
    }

    let (Some(slope), Some(intercept)) = (median(&mut slopes), median(&mut intercepts)) else {
        log::debug!(
            "No divider segment among {} candidates; using page center",
            segments.len()
        );
        return fallback;
    };

    let lo = width as f32 * config.divider_clamp;
    let hi = width as f32 * (1.0 - config.divider_clamp);
    let divider = Divider::new(intercept.clamp(lo, hi), slope);
    log::debug!(
        "Divider at x={:.1} slope={:.4} from {} segments",
        divider.x,
        divider.slope,
        slopes.len()
    );
    divider
}

/// Upper median (element `n / 2` after sorting). `None` when empty.
fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    Some(values[values.len() / 2])
}

/// Recover finite segments from an edge image.
///
/// Candidate lines come from a Hough transform; each is then walked across
/// the image along its dominant axis, collecting runs of edge pixels (within
/// one pixel of the line) separated by at most `max_gap` misses.
pub fn find_line_segments(edges: &GrayImage, search: &SegmentSearch) -> Vec<LineSegment> {
    let options = LineDetectionOptions {
        vote_threshold: search.vote_threshold,
        suppression_radius: 2,
    };
    let lines = detect_lines(edges, options);
    log::trace!("{} Hough lines above {} votes", lines.len(), search.vote_threshold);

    let mut segments = Vec::new();
    for line in &lines {
        trace_line(edges, line, search, &mut segments);
    }
    segments
}

fn trace_line(
    edges: &GrayImage,
    line: &PolarLine,
    search: &SegmentSearch,
    out: &mut Vec<LineSegment>,
) {
    let (sin, cos) = (line.angle_in_degrees as f32).to_radians().sin_cos();
    let steep = cos.abs() >= sin.abs();

    // Walk the dominant axis; the other coordinate follows from
    // x*cos + y*sin = r.
    let steps = if steep { edges.height() } else { edges.width() };
    let mut run: Option<((f32, f32), (f32, f32))> = None;
    let mut gap = 0u32;

    for t in 0..steps {
        let t = t as f32;
        let (x, y) = if steep {
            ((line.r - t * sin) / cos, t)
        } else {
            (t, (line.r - t * cos) / sin)
        };

        if has_edge_near(edges, x.round() as i64, y.round() as i64, steep) {
            run = Some(match run {
                Some((start, _)) => (start, (x, y)),
                None => ((x, y), (x, y)),
            });
            gap = 0;
        } else if run.is_some() {
            gap += 1;
            if gap > search.max_gap {
                push_run(run.take(), search.min_length, out);
                gap = 0;
            }
        }
    }
    push_run(run, search.min_length, out);
}

fn push_run(run: Option<((f32, f32), (f32, f32))>, min_length: f32, out: &mut Vec<LineSegment>) {
    if let Some(((x1, y1), (x2, y2))) = run {
        let seg = LineSegment { x1, y1, x2, y2 };
        if seg.length() >= min_length {
            out.push(seg);
        }
    }
}

/// Whether an edge pixel lies within one pixel of `(x, y)` across the
/// walking direction.
fn has_edge_near(edges: &GrayImage, x: i64, y: i64, steep: bool) -> bool {
    let (width, height) = (i64::from(edges.width()), i64::from(edges.height()));
    (-1..=1).any(|d| {
        let (cx, cy) = if steep { (x + d, y) } else { (x, y + d) };
        cx >= 0 && cy >= 0 && cx < width && cy < height && edges.get_pixel(cx as u32, cy as u32).0[0] > 0
    })
}
