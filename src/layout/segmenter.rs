//! Page segmentation into question crops.
//!
//! Runs divider detection, block detection and per-column merging for one
//! page, then crops each surviving block from the unmasked raster.

use crate::config::ExtractorConfig;
use crate::error::Result;
use crate::geometry::Rect;
use crate::raster::{encode_png, PageImage};

use super::block_detector::detect_blocks;
use super::clustering::merge_blocks;
use super::divider::{detect_divider, Divider};
use super::question::{question_id, Question, Side};

/// Blocks of one page split by column, before merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SidedBlocks {
    /// Blocks whose centroid lies left of the divider
    pub left: Vec<Rect>,
    /// Remaining blocks
    pub right: Vec<Rect>,
}

/// Assign each block to a column by its centroid.
pub fn partition_blocks(blocks: Vec<Rect>, divider: &Divider) -> SidedBlocks {
    let mut sided = SidedBlocks::default();
    for block in blocks {
        match divider.side_of(block.center()) {
            Side::Left => sided.left.push(block),
            Side::Right => sided.right.push(block),
        }
    }
    sided
}

/// Extracts question crops from page rasters.
///
/// The extractor only holds configuration; every buffer it needs is created
/// and dropped inside [`QuestionExtractor::process_page`], so one instance can
/// be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct QuestionExtractor {
    config: ExtractorConfig,
}

impl QuestionExtractor {
    /// Create an extractor with the given configuration.
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Create an extractor, rejecting invalid configurations.
    pub fn try_new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Estimate the column divider of a page.
    pub fn divider(&self, page: &PageImage) -> Divider {
        detect_divider(page, &self.config)
    }

    /// Merge one column's blocks and return them in reading order with
    /// undersized blocks removed.
    pub fn column_blocks(&self, blocks: &[Rect]) -> Vec<Rect> {
        let mut merged = merge_blocks(blocks, self.config.h_gap, self.config.v_gap);
        merged.sort_by_key(|b| b.y1);
        merged.retain(|b| {
            b.height() >= self.config.min_height && b.width() >= self.config.min_width
        });
        merged
    }

    /// Segment one page into question crops.
    ///
    /// Questions come back left column first, each column top to bottom.
    /// Ids are `p{page_number}_{side}_q{rank}`. A blank page yields an empty
    /// list.
    pub fn process_page(&self, page: &PageImage, page_number: u32) -> Result<Vec<Question>> {
        let divider = self.divider(page);

        let raw = {
            let height = page.height() as f32;
            let masked = page.with_vertical_band(
                divider.x,
                divider.x_at(height),
                self.config.mask_thickness,
            );
            detect_blocks(&masked, &self.config)
        };
        let sided = partition_blocks(raw, &divider);
        log::debug!(
            "Page {}: {} left / {} right raw blocks",
            page_number,
            sided.left.len(),
            sided.right.len()
        );

        let mut questions = Vec::new();
        for (side, blocks) in [(Side::Left, &sided.left), (Side::Right, &sided.right)] {
            for (index, block) in self.column_blocks(blocks).into_iter().enumerate() {
                questions.push(self.crop_question(page, page_number, side, index + 1, block)?);
            }
        }

        if questions.is_empty() {
            log::info!("Page {}: no questions found", page_number);
        } else {
            log::info!("Page {}: {} questions", page_number, questions.len());
        }
        Ok(questions)
    }

    fn crop_question(
        &self,
        page: &PageImage,
        page_number: u32,
        side: Side,
        rank: usize,
        block: Rect,
    ) -> Result<Question> {
        let bbox = block.expand_clamped(self.config.padding, page.width(), page.height());
        let image_data = encode_png(&page.crop(&bbox))?;
        Ok(Question {
            id: question_id(page_number, side, rank),
            page: page_number,
            side,
            rank,
            bbox,
            source_bbox: block,
            image_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

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

    #[test]
    fn test_partition_by_centroid() {
        let divider = Divider::new(500.0, 0.0);
        let blocks = vec![
            Rect::new(50, 50, 400, 150),
            Rect::new(450, 0, 560, 10), // centroid x=505
            Rect::new(440, 0, 550, 10), // centroid x=495
        ];
        let sided = partition_blocks(blocks, &divider);
        assert_eq!(sided.left, vec![Rect::new(50, 50, 400, 150), Rect::new(440, 0, 550, 10)]);
        assert_eq!(sided.right, vec![Rect::new(450, 0, 560, 10)]);
    }

    #[test]
    fn test_column_blocks_sort_and_filter() {
        let extractor = QuestionExtractor::default();
        let blocks = vec![
            Rect::new(50, 900, 400, 1000),
            Rect::new(50, 100, 400, 200),
            Rect::new(50, 500, 120, 700), // too narrow
            Rect::new(50, 1300, 400, 1340), // too short
        ];
        let kept = extractor.column_blocks(&blocks);
        assert_eq!(kept, vec![Rect::new(50, 100, 400, 200), Rect::new(50, 900, 400, 1000)]);
    }

    #[test]
    fn test_column_blocks_size_filter_is_inclusive() {
        let extractor = QuestionExtractor::default();
        let exact = Rect::from_xywh(0, 0, 100, 50);
        assert_eq!(extractor.column_blocks(&[exact]), vec![exact]);
    }

    #[test]
    fn test_blank_page() {
        let page = page_with_boxes(600, 800, &[]);
        let extractor = QuestionExtractor::default();
        assert_eq!(extractor.divider(&page), Divider::default_for_width(600));
        assert!(extractor.process_page(&page, 1).unwrap().is_empty());
    }

    #[test]
    fn test_crop_is_padded_and_clamped() {
        let page = page_with_boxes(500, 600, &[Rect::new(5, 30, 200, 120)]);
        let extractor = QuestionExtractor::default();
        let questions = extractor.process_page(&page, 4).unwrap();
        assert_eq!(questions.len(), 1);

        let q = &questions[0];
        assert_eq!(q.id, "p4_left_q1");
        assert_eq!(q.bbox.x1, 0);
        assert!(q.bbox.contains(&q.source_bbox));
        let decoded = image::load_from_memory(&q.image_data).unwrap();
        assert_eq!(decoded.width(), q.bbox.width());
        assert_eq!(decoded.height(), q.bbox.height());
    }

    #[test]
    fn test_try_new_rejects_invalid_config() {
        let config = ExtractorConfig {
            adaptive_kernel: 0,
            ..Default::default()
        };
        assert!(QuestionExtractor::try_new(config).is_err());
    }
}
