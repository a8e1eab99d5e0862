//! Packaging of selected questions.
//!
//! The archive layout is:
//!
//! ```text
//! questions/p1_left_q1.png
//! questions/p1_left_q2.png
//! ...
//! manifest.json
//! ```
//!
//! `manifest.json` lists every exported question (id, page, side, rank, boxes)
//! together with the name of its PNG entry.

use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::batch::QuestionSet;
use crate::error::Result;
use crate::layout::Question;

/// Directory inside the archive holding the crops.
pub const ARCHIVE_DIR: &str = "questions";

/// Name of the manifest entry.
pub const MANIFEST_NAME: &str = "manifest.json";

#[derive(Serialize)]
struct ManifestEntry<'a> {
    #[serde(flatten)]
    question: &'a Question,
    file: String,
}

fn entry_name(question: &Question) -> String {
    format!("{}/{}", ARCHIVE_DIR, question.file_name())
}

/// Write the selected questions of `set` as a zip archive into `writer`.
///
/// Returns the number of crops written. PNG entries are stored as-is since
/// they are already compressed; the manifest is deflated.
pub fn write_zip_archive<W: Write + Seek>(set: &QuestionSet, writer: W) -> Result<usize> {
    let mut zip = ZipWriter::new(writer);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut manifest = Vec::new();
    for question in set.selected() {
        let name = entry_name(question);
        zip.start_file(name.as_str(), stored)?;
        zip.write_all(&question.image_data)?;
        manifest.push(ManifestEntry {
            question,
            file: name,
        });
    }

    zip.start_file(MANIFEST_NAME, deflated)?;
    serde_json::to_writer_pretty(&mut zip, &manifest)?;
    zip.finish()?;

    log::info!("Wrote {} question(s) to archive", manifest.len());
    Ok(manifest.len())
}

/// Write the selected questions of `set` to a zip file at `path`.
pub fn export_zip_file(set: &QuestionSet, path: impl AsRef<Path>) -> Result<usize> {
    let file = File::create(path.as_ref())?;
    write_zip_archive(set, BufWriter::new(file))
}

/// Write each selected question as `{id}.png` into `dir`, creating it if
/// needed.
pub fn export_png_files(set: &QuestionSet, dir: impl AsRef<Path>) -> Result<usize> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut count = 0;
    for question in set.selected() {
        fs::write(dir.join(question.file_name()), &question.image_data)?;
        count += 1;
    }
    log::info!("Wrote {} question(s) to {}", count, dir.display());
    Ok(count)
}
