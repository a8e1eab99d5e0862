//! Layout analysis for two-column question pages.
//!
//! This module provides the page segmentation pipeline:
//! - Column divider detection (edge + line segment search)
//! - Candidate block detection (gradient and adaptive-threshold strategies)
//! - Proximity clustering of blocks into questions
//! - Per-column ordering and cropping

pub mod block_detector;
pub mod clustering;
pub mod divider;
pub mod question;
pub mod segmenter;

// Re-export main types
pub use block_detector::detect_blocks;
pub use clustering::{cluster_blocks, merge_blocks};
pub use divider::{detect_divider, Divider, LineSegment};
pub use question::{question_id, Question, Side};
pub use segmenter::{partition_blocks, QuestionExtractor, SidedBlocks};
