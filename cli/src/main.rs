//! pagewise CLI - page-wise PDF export tool

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pagewise::parser::source_stem;
use pagewise::{
    parser_for_path, ConversionSummary, ConvertOptions, ConvertStatus, FormatSelection,
    OutputFormat, PageConverter, PageRequest, PageStore,
};

#[derive(Parser)]
#[command(name = "pagewise")]
#[command(version)]
#[command(about = "Export PDF pages to Markdown, HTML, text, JSON, YAML, CSV and XML", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one or more documents to one or all formats
    Convert {
        /// Input PDFs (or serialized document JSON files)
        #[arg(value_name = "FILE", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output directory (default: {stem}_output per input)
        #[arg(short, long, value_name = "DIR", env = "PAGEWISE_OUTPUT_DIR")]
        output: Option<PathBuf>,

        /// Format to produce ("all" or one format name)
        #[arg(short, long, default_value = "all")]
        format: FormatSelection,

        /// Export page, table and picture images
        #[arg(long)]
        images: bool,

        /// Convert formats one after another
        #[arg(long)]
        sequential: bool,

        /// Skip the consolidated {stem}.{ext} files
        #[arg(long)]
        no_consolidated: bool,

        /// Print the conversion summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print cached pages of a converted document
    Page {
        /// Input file the cache was built from
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Format to read
        #[arg(short, long)]
        format: OutputFormat,

        /// Page number or comma-separated list (e.g., "4", "1,2,4")
        #[arg(short, long)]
        pages: PageRequest,

        /// Output directory holding the cache (default: {stem}_output)
        #[arg(short, long, value_name = "DIR", env = "PAGEWISE_OUTPUT_DIR")]
        output: Option<PathBuf>,
    },

    /// Show document information and cache state
    Info {
        /// Input PDF (or serialized document JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory holding the cache (default: {stem}_output)
        #[arg(short, long, value_name = "DIR", env = "PAGEWISE_OUTPUT_DIR")]
        output: Option<PathBuf>,
    },

    /// List supported formats
    Formats,

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            inputs,
            output,
            format,
            images,
            sequential,
            no_consolidated,
            json,
        } => {
            let options = ConvertOptions::new()
                .with_parallel(!sequential)
                .with_consolidated(!no_consolidated)
                .with_images(images);
            cmd_convert(&inputs, output.as_deref(), format, options, json)
        }
        Commands::Page {
            input,
            format,
            pages,
            output,
        } => cmd_page(&input, format, &pages, output.as_deref()),
        Commands::Info { input, output } => cmd_info(&input, output.as_deref()),
        Commands::Formats => {
            cmd_formats();
            Ok(())
        }
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn output_dir_for(input: &Path, output: Option<&Path>) -> PathBuf {
    output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{}_output", source_stem(input))))
}

/// Outcome of converting one input of a batch.
struct BatchEntry {
    input: PathBuf,
    output_dir: PathBuf,
    elapsed: Duration,
    outcome: Result<ConversionSummary, String>,
}

impl BatchEntry {
    fn is_success(&self, selection: FormatSelection) -> bool {
        match &self.outcome {
            Ok(summary) => match selection {
                FormatSelection::All => true,
                FormatSelection::One(format) => !summary.failed.iter().any(|(f, _)| *f == format),
            },
            Err(_) => false,
        }
    }
}

fn cmd_convert(
    inputs: &[PathBuf],
    output: Option<&Path>,
    selection: FormatSelection,
    options: ConvertOptions,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let batch = Instant::now();
    let mut entries = Vec::with_capacity(inputs.len());

    for input in inputs {
        let output_dir = output_dir_for(input, output);
        let started = Instant::now();
        let outcome = convert_document(input, &output_dir, selection, &options, !json)
            .map_err(|e| e.to_string());
        let elapsed = started.elapsed();

        match &outcome {
            Ok(_) => log::info!("Converted {} in {:.2?}", input.display(), elapsed),
            Err(e) => log::warn!(
                "Conversion of {} failed after {:.2?}: {}",
                input.display(),
                elapsed,
                e
            ),
        }
        let entry = BatchEntry {
            input: input.clone(),
            output_dir,
            elapsed,
            outcome,
        };
        if !json {
            print_entry(&entry);
        }
        entries.push(entry);
    }

    let failed = entries.iter().filter(|e| !e.is_success(selection)).count();
    if json {
        let report: Vec<serde_json::Value> = entries.iter().map(entry_json).collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if inputs.len() > 1 {
        println!(
            "\n{} {} of {} documents converted in {:.2?}",
            "Done!".green().bold(),
            entries.len() - failed,
            entries.len(),
            batch.elapsed()
        );
    }

    if failed > 0 {
        return Err(format!("{} of {} documents failed", failed, entries.len()).into());
    }
    Ok(())
}

fn convert_document(
    input: &Path,
    output_dir: &Path,
    selection: FormatSelection,
    options: &ConvertOptions,
    show_progress: bool,
) -> Result<ConversionSummary, Box<dyn std::error::Error>> {
    let formats: Vec<OutputFormat> = match selection {
        FormatSelection::All => OutputFormat::ALL.to_vec(),
        FormatSelection::One(format) => vec![format],
    };

    let pb = if show_progress {
        ProgressBar::new(formats.len() as u64 + 1)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message(format!("Parsing {}...", input.display()));
    let parser = parser_for_path(input);
    let document = parser.parse(input)?;
    let store = PageStore::open_dir(output_dir)?;
    let converter = PageConverter::new(document, input, store, options.clone())?;
    pb.inc(1);

    let mut summary = if options.parallel && formats.len() > 1 {
        pb.set_message(format!("Converting {} formats...", formats.len()));
        let summary = converter.convert_all();
        pb.inc(formats.len() as u64);
        summary
    } else {
        let mut summary = ConversionSummary::default();
        for format in formats {
            pb.set_message(format!("Converting to {}...", format));
            summary.record(format, converter.convert_format(format));
            pb.inc(1);
        }
        summary
    };

    if options.export_images {
        pb.set_message("Exporting images...");
        summary.images = converter.export_images();
    }
    pb.finish_and_clear();
    Ok(summary)
}

fn print_entry(entry: &BatchEntry) {
    match &entry.outcome {
        Ok(summary) => {
            println!(
                "\n{} {} ({:.2?})",
                "Converted".green().bold(),
                entry.input.display(),
                entry.elapsed
            );
            print_summary(summary, &entry.output_dir);
        }
        Err(e) => println!(
            "\n{} {} ({:.2?}): {}",
            "Failed".red().bold(),
            entry.input.display(),
            entry.elapsed,
            e
        ),
    }
}

fn entry_json(entry: &BatchEntry) -> serde_json::Value {
    let mut value = match &entry.outcome {
        Ok(summary) => summary_json(summary),
        Err(e) => serde_json::json!({ "error": e }),
    };
    if let Some(map) = value.as_object_mut() {
        map.insert("input".into(), entry.input.display().to_string().into());
        map.insert("output_dir".into(), entry.output_dir.display().to_string().into());
        map.insert(
            "elapsed_ms".into(),
            (entry.elapsed.as_millis() as u64).into(),
        );
    }
    value
}

fn print_summary(summary: &ConversionSummary, output_dir: &Path) {
    println!("{} {}", "Output directory:".green().bold(), output_dir.display());
    for format in OutputFormat::ALL {
        let status = if summary.converted.contains(&format) {
            Some(ConvertStatus::Converted)
        } else if summary.cached.contains(&format) {
            Some(ConvertStatus::Cached)
        } else {
            None
        };
        match status {
            Some(ConvertStatus::Converted) => {
                println!("  {} {:<9} {}", "├─".dimmed(), format.name(), "converted".green())
            }
            Some(ConvertStatus::Cached) => {
                println!("  {} {:<9} {}", "├─".dimmed(), format.name(), "cached".cyan())
            }
            None => {
                if let Some((_, e)) = summary.failed.iter().find(|(f, _)| *f == format) {
                    println!(
                        "  {} {:<9} {} {}",
                        "├─".dimmed(),
                        format.name(),
                        "failed".red(),
                        e.to_string().dimmed()
                    );
                }
            }
        }
    }
    println!("  {} images/ ({} written)", "└─".dimmed(), summary.images.len());
}

fn summary_json(summary: &ConversionSummary) -> serde_json::Value {
    let names = |formats: &[OutputFormat]| -> Vec<&str> {
        formats.iter().map(|f| f.name()).collect()
    };
    let failed: serde_json::Map<String, serde_json::Value> = summary
        .failed
        .iter()
        .map(|(f, e)| (f.name().to_string(), serde_json::Value::String(e.to_string())))
        .collect();
    serde_json::json!({
        "converted": names(&summary.converted),
        "cached": names(&summary.cached),
        "failed": failed,
        "images": summary
            .images
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>(),
    })
}

fn cmd_page(
    input: &Path,
    format: OutputFormat,
    pages: &PageRequest,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output_dir_for(input, output);
    let stem = source_stem(input);
    if !output_dir.is_dir() {
        return Err(format!("output directory {} does not exist", output_dir.display()).into());
    }
    let store = PageStore::open_dir(&output_dir)?;

    if !store.exists(&stem, format) {
        return Err(format!(
            "no {} cache for {} in {} (run `pagewise convert` first)",
            format,
            stem,
            output_dir.display()
        )
        .into());
    }

    match store.get_plain_text(&stem, format, pages) {
        Some(text) => {
            println!("{}", text);
            Ok(())
        }
        None => Err(format!("pages {} not available in the {} cache", pages, format).into()),
    }
}

fn cmd_info(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let parser = parser_for_path(input);
    let doc = parser.parse(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Parser".bold(), parser.name());
    if let Some(ref version) = doc.metadata.pdf_version {
        println!("{}: PDF {}", "Format".bold(), version);
    }
    println!("{}: {}", "Pages".bold(), doc.page_count());
    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }

    println!();
    println!("{}", "Cache".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let output_dir = output_dir_for(input, output);
    let stem = source_stem(input);
    println!("{}: {}", "Directory".bold(), output_dir.display());
    if !output_dir.is_dir() {
        println!("{}", "not converted yet".dimmed());
        return Ok(());
    }
    let store = PageStore::open_dir(&output_dir)?;
    for format in OutputFormat::ALL {
        let state = if store.exists(&stem, format) {
            "cached".green()
        } else {
            "pending".yellow()
        };
        println!("{:<10} {}", format.name(), state);
    }

    Ok(())
}

fn cmd_formats() {
    println!("{}", "Supported formats".cyan().bold());
    for format in OutputFormat::ALL {
        println!(
            "  {:<9} {}.{}.json  {}.{}",
            format.name(),
            "{stem}".dimmed(),
            format.name(),
            "{stem}".dimmed(),
            format.extension()
        );
    }
}

fn cmd_version() {
    println!("{} {}", "pagewise".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Page-wise PDF export tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewise::model::{DocItem, Document, Page, TextItem};

    fn write_document(dir: &Path, stem: &str) -> PathBuf {
        let mut doc = Document::new(stem);
        doc.add_page(Page::new(1));
        doc.add_item(DocItem::on_page(1, TextItem::paragraph("hello")));
        let path = dir.join(format!("{}.json", stem));
        std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_output_dir_defaults_to_stem() {
        assert_eq!(
            output_dir_for(Path::new("docs/report.pdf"), None),
            PathBuf::from("report_output")
        );
        assert_eq!(
            output_dir_for(Path::new("report.pdf"), Some(Path::new("out"))),
            PathBuf::from("out")
        );
    }

    #[test]
    fn test_batch_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_document(dir.path(), "first");
        let missing = dir.path().join("missing.json");
        let last = write_document(dir.path(), "last");
        let out = dir.path().join("out");

        let options = ConvertOptions::new().sequential();
        let result = cmd_convert(
            &[first, missing, last],
            Some(&out),
            FormatSelection::All,
            options,
            true,
        );

        assert!(result.is_err());
        assert!(out.join("first.txt.json").is_file());
        assert!(out.join("last.md").is_file());
        assert!(!out.join("missing.txt.json").exists());
    }

    #[test]
    fn test_single_format_batch_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_document(dir.path(), "only");
        let out = dir.path().join("out");

        cmd_convert(
            &[input],
            Some(&out),
            FormatSelection::One(OutputFormat::Csv),
            ConvertOptions::new(),
            true,
        )
        .unwrap();
        assert!(out.join("only.csv.json").is_file());
        assert!(!out.join("only.xml.json").exists());
    }
}
