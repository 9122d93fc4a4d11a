//! docrank CLI - persona-driven PDF outline and relevance ranking tool

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docrank::render::{write_json, OutlineReport};
use docrank::{
    collect_pdfs, document_name, AnalysisRequest, DocRank, Embedder, HashingEmbedder, JsonFormat,
};

/// Name of the report written by `analyze`.
const ANALYSIS_FILE: &str = "analysis.json";

#[derive(Parser)]
#[command(name = "docrank")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract PDF outlines and rank sections for a persona", long_about = None)]
struct Cli {
    /// Input directory with PDFs (and optionally persona.json)
    #[arg(value_name = "INPUT_DIR")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT_DIR")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the sections of every PDF in a directory for a persona and task
    Analyze {
        /// Input directory
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Output directory (default: <INPUT_DIR>/output)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Persona file (default: <INPUT_DIR>/persona.json, then the built-in persona)
        #[arg(long, value_name = "FILE")]
        persona: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Process documents one at a time
        #[arg(long)]
        sequential: bool,

        /// Embedding backend
        #[arg(long, value_enum, default_value = "hashing")]
        embedder: EmbedderKind,

        /// Vector size of the hashing embedder
        #[arg(long, default_value = "512")]
        dimensions: usize,

        /// Number of top sections mined for sentences
        #[arg(long, default_value = "5")]
        top_sections: usize,

        /// Maximum number of reported sentences
        #[arg(long, default_value = "10")]
        max_hits: usize,
    },

    /// Write the outline (title and headings) of PDFs as JSON
    Outline {
        /// PDF file or directory of PDFs
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum EmbedderKind {
    /// Token hashing (offline, deterministic)
    Hashing,
    /// ONNX sentence-transformer via fastembed
    Fastembed,
}

struct AnalyzeArgs {
    persona: Option<PathBuf>,
    compact: bool,
    sequential: bool,
    embedder: EmbedderKind,
    dimensions: usize,
    top_sections: usize,
    max_hits: usize,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            persona: None,
            compact: false,
            sequential: false,
            embedder: EmbedderKind::Hashing,
            dimensions: docrank::rank::DEFAULT_DIMENSIONS,
            top_sections: docrank::rank::SECTIONS_FOR_ANALYSIS,
            max_hits: docrank::rank::MAX_SUB_SECTIONS,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Analyze {
            input,
            output,
            persona,
            compact,
            sequential,
            embedder,
            dimensions,
            top_sections,
            max_hits,
        }) => cmd_analyze(
            &input,
            output.as_deref(),
            AnalyzeArgs {
                persona,
                compact,
                sequential,
                embedder,
                dimensions,
                top_sections,
                max_hits,
            },
        ),
        Some(Commands::Outline {
            input,
            output,
            compact,
        }) => cmd_outline(&input, output.as_deref(), compact),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: analyze if an input directory is provided
            if let Some(input) = cli.input {
                cmd_analyze(&input, cli.output.as_deref(), AnalyzeArgs::default())
            } else {
                println!("{}", "Usage: docrank <INPUT_DIR> [OUTPUT_DIR]".yellow());
                println!("       docrank --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn make_embedder(
    kind: EmbedderKind,
    dimensions: usize,
) -> Result<Box<dyn Embedder>, Box<dyn std::error::Error>> {
    let embedder: Box<dyn Embedder> = match kind {
        EmbedderKind::Hashing => Box::new(HashingEmbedder::new().with_dimensions(dimensions)),
        #[cfg(feature = "fastembed")]
        EmbedderKind::Fastembed => Box::new(docrank::FastEmbedder::new()?),
        #[cfg(not(feature = "fastembed"))]
        EmbedderKind::Fastembed => {
            return Err("this build of docrank does not include the `fastembed` feature".into())
        }
    };
    Ok(embedder)
}

fn cmd_analyze(
    input: &Path,
    output: Option<&Path>,
    args: AnalyzeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if !input.is_dir() {
        return Err(format!("{} is not a directory", input.display()).into());
    }
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| input.join("output"));

    let request = match &args.persona {
        Some(path) => AnalysisRequest::load(path)?,
        None => AnalysisRequest::load_or_default(input)?,
    };
    log::debug!("query: {}", request.query().as_str());
    let paths = collect_pdfs(input)?;
    if paths.is_empty() {
        println!("{} no PDF files in {}", "Warning:".yellow().bold(), input.display());
    }

    let mut builder = DocRank::new()
        .with_top_sections(args.top_sections)
        .with_max_hits(args.max_hits);
    if args.sequential {
        builder = builder.sequential();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Loading embedding model...");
    let analyzer = builder
        .analyzer()
        .with_boxed_embedder(make_embedder(args.embedder, args.dimensions)?);

    pb.set_message(format!("Analyzing {} documents...", paths.len()));
    let report = analyzer.analyze(&paths, &request)?;

    let output_path = output_dir.join(ANALYSIS_FILE);
    write_json(&output_path, &report, json_format(args.compact))?;
    pb.finish_with_message("Done!");

    println!("\n{}", "Top sections:".green().bold());
    for section in report.extracted_sections.iter().take(args.top_sections) {
        println!(
            "  {:>2}. {} {} (p. {}, {:.3})",
            section.importance_rank,
            section.section_title,
            format!("[{}]", section.document).dimmed(),
            section.page_number,
            section.relevance_score
        );
    }

    for failed in &report.metadata.failed_documents {
        println!(
            "{} {}: {}",
            "Skipped".yellow(),
            failed.document,
            failed.error
        );
    }

    println!(
        "\n{} {} ({:.2}s)",
        "Saved to".green(),
        output_path.display(),
        report.metadata.processing_time_seconds
    );

    Ok(())
}

fn cmd_outline(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (paths, default_output) = if input.is_dir() {
        (collect_pdfs(input)?, input.join("output"))
    } else {
        let parent = input.parent().unwrap_or_else(|| Path::new(""));
        (vec![input.to_path_buf()], parent.join("output"))
    };
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or(default_output);

    let analyzer = DocRank::new().analyzer();
    let format = json_format(compact);
    log::debug!("writing outlines to {}", output_dir.display());

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut failures = 0;
    for path in &paths {
        let name = document_name(path);
        pb.set_message(name.clone());

        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        let json_name = format!("{}.json", stem);

        match analyzer.outline(path) {
            Ok(outline) => {
                write_json(
                    &output_dir.join(&json_name),
                    &OutlineReport::from(&outline),
                    format,
                )?;
                pb.println(format!("Processed {} -> {}", name, json_name));
            }
            Err(e) => {
                failures += 1;
                pb.println(format!("{} {}: {}", "Failed".red(), name, e));
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    if !paths.is_empty() && failures == paths.len() {
        return Err(format!("none of the {} documents could be read", paths.len()).into());
    }

    println!(
        "\n{} {} of {} documents written to {}",
        "Done!".green().bold(),
        paths.len() - failures,
        paths.len(),
        output_dir.display()
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docrank".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Persona-driven PDF outline extraction and section ranking");
    println!();
    println!("Embedders: hashing{}", if cfg!(feature = "fastembed") { ", fastembed" } else { "" });
    println!("License: MIT");
}
