// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::needless_range_loop)]
#![warn(missing_docs)]

//! # Question Extractor
//!
//! Splits scanned two-column exam pages into one image per question.
//!
//! ## Pipeline
//!
//! For every page raster:
//! - **Divider detection**: edge detection plus a line segment search in the
//!   central strip locates the (possibly slanted) column rule.
//! - **Block detection**: a morphological-gradient pass and an
//!   adaptive-threshold pass propose candidate text blocks, with the divider
//!   painted out so it cannot bridge the columns.
//! - **Merging**: blocks are split by column, then clustered by proximity
//!   into one box per question.
//! - **Cropping**: boxes are ordered top to bottom, filtered by size, padded
//!   and cropped from the unmasked page as PNG.
//!
//! Questions are identified as `p{page}_{side}_q{rank}`, e.g. `p2_right_q1`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use question_extractor::batch::{BatchProcessor, InputFile};
//! use question_extractor::raster::FileRasterSource;
//! use question_extractor::{export, ExtractorConfig, QuestionExtractor};
//!
//! # fn main() -> question_extractor::Result<()> {
//! let extractor = QuestionExtractor::try_new(ExtractorConfig::default())?;
//! let processor = BatchProcessor::new(extractor, FileRasterSource);
//!
//! let report = processor.run(vec![InputFile::from_path("exam.png")?]);
//! for question in report.questions.iter() {
//!     println!("{} at {:?}", question.id, question.bbox);
//! }
//! export::export_zip_file(&report.questions, "questions.zip")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `pdf`: render PDF inputs through `pdfium-render` (needs a system Pdfium
//!   library at runtime).

// Error handling
pub mod error;

// Configuration
pub mod config;

// Geometry primitives
pub mod geometry;

// Page rasters, decoding and pixel filters
pub mod raster;

// Divider, blocks, merging and page segmentation
pub mod layout;

// Multi-file orchestration and result selection
pub mod batch;

// Zip and directory export
pub mod export;

// Re-exports
pub use batch::{BatchOptions, BatchProcessor, BatchReport, InputFile, QuestionSet};
pub use config::ExtractorConfig;
pub use error::{Error, Result};
pub use geometry::{Point, Rect};
pub use layout::{Divider, Question, QuestionExtractor, Side};
pub use raster::PageImage;

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
