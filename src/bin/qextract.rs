//! Extract question crops from worksheet scans
//!
//! Segments every page of the given images or PDFs into question crops and
//! writes the result as a zip archive (or a directory of PNG files).
//!
//! Usage:
//!   qextract page1.png page2.jpg
//!   qextract exam.pdf --output exam_questions.zip --parallel
//!   qextract scans/*.png --dir crops --config extractor.json --verbose

use question_extractor::batch::{BatchOptions, BatchProcessor, InputFile};
use question_extractor::raster::FileRasterSource;
use question_extractor::{export, ExtractorConfig, QuestionExtractor};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

struct CliConfig {
    inputs: Vec<PathBuf>,
    output: PathBuf,
    output_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    scale: Option<f32>,
    parallel: bool,
    per_file_pages: bool,
    verbose: bool,
}

impl CliConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut config = Self {
            inputs: Vec::new(),
            output: PathBuf::from("questions.zip"),
            output_dir: None,
            config_path: None,
            scale: None,
            parallel: false,
            per_file_pages: false,
            verbose: false,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output" | "-o" => {
                    i += 1;
                    let value = args.get(i).ok_or("--output needs a path")?;
                    config.output = PathBuf::from(value);
                },
                "--dir" => {
                    i += 1;
                    let value = args.get(i).ok_or("--dir needs a path")?;
                    config.output_dir = Some(PathBuf::from(value));
                },
                "--config" => {
                    i += 1;
                    let value = args.get(i).ok_or("--config needs a path")?;
                    config.config_path = Some(PathBuf::from(value));
                },
                "--scale" => {
                    i += 1;
                    let value = args.get(i).ok_or("--scale needs a number")?;
                    let factor = value
                        .parse::<f32>()
                        .map_err(|_| format!("invalid scale: {}", value))?;
                    config.scale = Some(factor);
                },
                "--parallel" => config.parallel = true,
                "--per-file-pages" => config.per_file_pages = true,
                "--verbose" | "-v" => config.verbose = true,
                "--help" | "-h" => return Err(String::new()),
                flag if flag.starts_with('-') => return Err(format!("unknown option: {}", flag)),
                path => config.inputs.push(PathBuf::from(path)),
            }
            i += 1;
        }

        if config.inputs.is_empty() {
            return Err("no input files given".to_string());
        }
        Ok(config)
    }
}

fn print_usage() {
    eprintln!("Usage: qextract [OPTIONS] <FILE>...");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <ZIP>     Zip archive to write (default: questions.zip)");
    eprintln!("      --dir <DIR>        Write PNG files into DIR instead of a zip");
    eprintln!("      --config <JSON>    Load extractor settings from a JSON file");
    eprintln!("      --scale <FACTOR>   Scale pixel thresholds for other render sizes");
    eprintln!("      --parallel         Process the pages of each file in parallel");
    eprintln!("      --per-file-pages   Restart page numbers at 1 for every file");
    eprintln!("  -v, --verbose          Debug logging");
}

fn build_extractor(cli: &CliConfig) -> question_extractor::Result<QuestionExtractor> {
    let mut config = match &cli.config_path {
        Some(path) => ExtractorConfig::from_json_file(path)?,
        None => ExtractorConfig::default(),
    };
    if let Some(factor) = cli.scale {
        config = config.scaled(factor);
    }
    QuestionExtractor::try_new(config)
}

fn main() -> ExitCode {
    let cli = match CliConfig::from_args() {
        Ok(cli) => cli,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("Error: {}\n", message);
            }
            print_usage();
            return ExitCode::from(2);
        },
    };

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let extractor = match build_extractor(&cli) {
        Ok(extractor) => extractor,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        },
    };

    let mut inputs = Vec::new();
    let mut unreadable = 0;
    for path in &cli.inputs {
        match InputFile::from_path(path) {
            Ok(input) => inputs.push(input),
            Err(e) => {
                eprintln!("✗ {}: {}", path.display(), e);
                unreadable += 1;
            },
        }
    }

    let options = BatchOptions::default()
        .with_parallel(cli.parallel)
        .with_continuous_page_numbers(!cli.per_file_pages);
    let processor = BatchProcessor::new(extractor, FileRasterSource).with_options(options);

    let start = Instant::now();
    let report = processor.run(inputs);
    let elapsed = start.elapsed();

    for failure in &report.failures {
        eprintln!("✗ {}: {}", failure.name, failure.reason);
    }

    let written = match &cli.output_dir {
        Some(dir) => export::export_png_files(&report.questions, dir),
        None => export::export_zip_file(&report.questions, &cli.output),
    };
    let written = match written {
        Ok(count) => count,
        Err(e) => {
            eprintln!("Error writing output: {}", e);
            return ExitCode::FAILURE;
        },
    };

    let destination = cli.output_dir.as_ref().unwrap_or(&cli.output);
    println!("\n{}", "=".repeat(70));
    println!("Extraction Complete");
    println!("{}", "=".repeat(70));
    println!("Pages: {}", report.pages_processed);
    println!("Questions: {}", written);
    println!("Failures: {}", report.failures.len() + unreadable);
    println!("Time: {:?}", elapsed);
    println!("Output: {}", destination.display());
    println!("{}", "=".repeat(70));

    if report.failures.is_empty() && unreadable == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
