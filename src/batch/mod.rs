//! Multi-file batch processing.
//!
//! A [`BatchProcessor`] decodes each input through a [`RasterSource`], runs
//! every page through a [`QuestionExtractor`] and accumulates the questions
//! into a [`QuestionSet`]. Failures are recorded per file and never stop the
//! batch; a [`CancellationToken`] stops it at the next page boundary.

mod results;

pub use results::QuestionSet;

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::Result;
use crate::layout::{Question, QuestionExtractor};
use crate::raster::{PageImage, RasterSource};

/// One named input file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Display name, usually the file name
    pub name: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl InputFile {
    /// Create an input from a name and its bytes.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read an input from disk, naming it after the file name.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

/// Orchestrator behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Process the pages of each input on the rayon thread pool
    pub parallel: bool,
    /// Number pages across the whole batch instead of restarting at 1 per
    /// file, so question ids stay unique
    pub continuous_page_numbers: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            continuous_page_numbers: true,
        }
    }
}

impl BatchOptions {
    /// Enable or disable parallel page processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enable or disable batch-wide page numbering.
    pub fn with_continuous_page_numbers(mut self, continuous: bool) -> Self {
        self.continuous_page_numbers = continuous;
        self
    }
}

/// Shared flag that asks a running batch to stop.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create an untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear a previous request so the token can be reused.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Live counters, readable from other threads while a batch runs.
#[derive(Debug, Default)]
pub struct BatchProgress {
    pages_processed: AtomicUsize,
    questions_found: AtomicUsize,
}

impl BatchProgress {
    /// Pages finished so far.
    pub fn pages_processed(&self) -> usize {
        self.pages_processed.load(Ordering::Relaxed)
    }

    /// Questions found so far.
    pub fn questions_found(&self) -> usize {
        self.questions_found.load(Ordering::Relaxed)
    }

    fn record_page(&self, questions: usize) {
        self.pages_processed.fetch_add(1, Ordering::Relaxed);
        self.questions_found.fetch_add(questions, Ordering::Relaxed);
    }

    fn reset(&self) {
        self.pages_processed.store(0, Ordering::Relaxed);
        self.questions_found.store(0, Ordering::Relaxed);
    }
}

/// A file (or one page of it) that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// Input name, suffixed with the page for page-level failures
    pub name: String,
    /// Rendered error
    pub reason: String,
}

/// Outcome of [`BatchProcessor::run`].
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Accumulated questions, all selected
    pub questions: QuestionSet,
    /// Files and pages that failed
    pub failures: Vec<FileFailure>,
    /// Pages that went through segmentation
    pub pages_processed: usize,
    /// Whether the run stopped early on cancellation
    pub cancelled: bool,
}

impl BatchReport {
    /// Whether every input was processed without error.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// Runs question extraction over many input files.
pub struct BatchProcessor<S: RasterSource> {
    extractor: QuestionExtractor,
    source: S,
    options: BatchOptions,
    cancel: CancellationToken,
    progress: Arc<BatchProgress>,
}

impl<S: RasterSource> BatchProcessor<S> {
    /// Create a processor with default options.
    pub fn new(extractor: QuestionExtractor, source: S) -> Self {
        Self {
            extractor,
            source,
            options: BatchOptions::default(),
            cancel: CancellationToken::new(),
            progress: Arc::new(BatchProgress::default()),
        }
    }

    /// Replace the batch options.
    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels runs of this processor.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Progress counters of the current or last run.
    pub fn progress(&self) -> Arc<BatchProgress> {
        Arc::clone(&self.progress)
    }

    /// Options in use.
    pub fn options(&self) -> BatchOptions {
        self.options
    }

    /// Process `inputs` in order.
    ///
    /// Decode and page errors are recorded in [`BatchReport::failures`] and
    /// processing continues with the next page or file. When the
    /// cancellation token fires, pages already started finish and the
    /// report comes back with `cancelled` set.
    pub fn run<I>(&self, inputs: I) -> BatchReport
    where
        I: IntoIterator<Item = InputFile>,
    {
        self.progress.reset();
        let mut report = BatchReport::default();
        let mut next_page = 1u32;

        for input in inputs {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let pages = match self.source.decode(&input.name, &input.bytes) {
                Ok(pages) => pages,
                Err(e) => {
                    log::warn!("Skipping {}: {}", input.name, e);
                    report.failures.push(FileFailure {
                        name: input.name,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            log::info!("{}: {} page(s)", input.name, pages.len());

            let first_page = if self.options.continuous_page_numbers {
                next_page
            } else {
                1
            };
            let outcomes = self.process_pages(&input.name, &pages, first_page);
            next_page += pages.len() as u32;

            for (index, outcome) in outcomes.into_iter().enumerate() {
                let page_number = first_page + index as u32;
                match outcome {
                    Some(Ok(questions)) => {
                        report.pages_processed += 1;
                        report.questions.extend(questions);
                    }
                    Some(Err(e)) => {
                        report.pages_processed += 1;
                        log::warn!("{} page {}: {}", input.name, page_number, e);
                        report.failures.push(FileFailure {
                            name: format!("{} (page {})", input.name, page_number),
                            reason: e.to_string(),
                        });
                    }
                    None => report.cancelled = true,
                }
            }

            if report.cancelled {
                break;
            }
        }

        if report.cancelled {
            log::info!(
                "Batch cancelled after {} page(s); {} question(s) kept",
                report.pages_processed,
                report.questions.len()
            );
        } else {
            log::info!(
                "Extracted {} question(s) from {} page(s), {} failure(s)",
                report.questions.len(),
                report.pages_processed,
                report.failures.len()
            );
        }
        report
    }

    /// Segment every page of one input. `None` marks a page skipped on
    /// cancellation. Results are in page order in both modes.
    fn process_pages(
        &self,
        name: &str,
        pages: &[PageImage],
        first_page: u32,
    ) -> Vec<Option<Result<Vec<Question>>>> {
        let total = pages.len();
        let (extractor, cancel, progress) = (&self.extractor, &self.cancel, &*self.progress);
        let run_page = |index: usize, page: &PageImage| {
            if cancel.is_cancelled() {
                return None;
            }
            let page_number = first_page + index as u32;
            log::info!("{} - page {}/{}", name, index + 1, total);
            let outcome = extractor.process_page(page, page_number);
            progress.record_page(outcome.as_ref().map(Vec::len).unwrap_or(0));
            Some(outcome)
        };

        if self.options.parallel {
            pages
                .par_iter()
                .enumerate()
                .map(|(index, page)| run_page(index, page))
                .collect()
        } else {
            let mut outcomes = Vec::with_capacity(total);
            for (index, page) in pages.iter().enumerate() {
                let outcome = run_page(index, page);
                let stop = outcome.is_none();
                outcomes.push(outcome);
                if stop {
                    break;
                }
            }
            outcomes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::geometry::Rect;
    use image::{Rgba, RgbaImage};

    /// Source that decodes the first byte as a page count and fails on `0xFF`.
    struct CountingSource;

    impl RasterSource for CountingSource {
        fn decode(&self, name: &str, bytes: &[u8]) -> Result<Vec<PageImage>> {
            match bytes.first() {
                None => Err(Error::EmptyInput(name.to_string())),
                Some(0xFF) => Err(Error::Decode(format!("{}: corrupt", name))),
                Some(&count) => (0..count).map(|_| question_page()).collect(),
            }
        }
    }

    fn question_page() -> Result<PageImage> {
        let boxes = [Rect::new(40, 40, 300, 140), Rect::new(460, 40, 720, 140)];
        let img = RgbaImage::from_fn(800, 400, |x, y| {
            if boxes.iter().any(|b| x >= b.x1 && x < b.x2 && y >= b.y1 && y < b.y2) {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        PageImage::new(img)
    }

    fn processor() -> BatchProcessor<CountingSource> {
        BatchProcessor::new(QuestionExtractor::default(), CountingSource)
    }

    #[test]
    fn test_default_options() {
        let options = BatchOptions::default();
        assert!(!options.parallel);
        assert!(options.continuous_page_numbers);
    }

    #[test]
    fn test_failures_do_not_stop_batch() {
        let inputs = vec![
            InputFile::new("bad.pdf", vec![0xFF]),
            InputFile::new("empty.png", vec![]),
            InputFile::new("good.png", vec![1]),
        ];
        let report = processor().run(inputs);

        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].name, "bad.pdf");
        assert_eq!(report.failures[1].name, "empty.png");
        assert_eq!(report.pages_processed, 1);
        assert!(!report.questions.is_empty());
        assert!(!report.cancelled);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_continuous_page_numbers() {
        let inputs = vec![InputFile::new("a", vec![2]), InputFile::new("b", vec![1])];
        let report = processor().run(inputs);
        let pages: Vec<u32> = report.questions.iter().map(|q| q.page).collect();
        assert!(pages.contains(&3));
        assert!(pages.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_per_file_page_numbers_collapse_duplicates() {
        let options = BatchOptions::default().with_continuous_page_numbers(false);
        let inputs = vec![InputFile::new("a", vec![1]), InputFile::new("b", vec![1])];
        let report = processor().with_options(options).run(inputs);
        assert_eq!(report.pages_processed, 2);
        assert!(report.questions.iter().all(|q| q.page == 1));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let inputs = || vec![InputFile::new("a", vec![3]), InputFile::new("b", vec![2])];
        let sequential = processor().run(inputs());
        let parallel = processor()
            .with_options(BatchOptions::default().with_parallel(true))
            .run(inputs());

        let seq_ids: Vec<_> = sequential.questions.ids().collect();
        let par_ids: Vec<_> = parallel.questions.ids().collect();
        assert_eq!(seq_ids, par_ids);
        assert_eq!(sequential.pages_processed, 5);
    }

    #[test]
    fn test_cancelled_before_start() {
        let processor = processor();
        processor.cancellation_token().cancel();
        let report = processor.run(vec![InputFile::new("a", vec![2])]);
        assert!(report.cancelled);
        assert_eq!(report.pages_processed, 0);
        assert!(report.questions.is_empty());
    }

    #[test]
    fn test_progress_counters() {
        let processor = processor();
        let report = processor.run(vec![InputFile::new("a", vec![2])]);
        let progress = processor.progress();
        assert_eq!(progress.pages_processed(), 2);
        assert_eq!(progress.questions_found(), report.questions.len());
    }

    #[test]
    fn test_token_reset() {
        let token = CancellationToken::new();
        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!shared.is_cancelled());
    }
}
