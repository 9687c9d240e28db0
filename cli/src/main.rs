//! outliner CLI - PDF heading outlines and persona-driven section ranking

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use outliner::classify::classify_lines;
use outliner::rank::rank_request;
use outliner::render::{to_json, write_json};
use outliner::{
    ExtractOptions, HashEmbedder, HashEmbedderConfig, JsonFormat, LineSource, Outliner,
    RankOptions, RankRequest, SourceRegistry, TextEmbedder,
};

#[derive(Parser)]
#[command(name = "outliner")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract PDF heading outlines and rank sections for a persona", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract outlines for every PDF in a directory
    Extract {
        /// Directory containing PDF files
        #[arg(value_name = "PDF_DIR")]
        input: PathBuf,

        /// Output directory (default: <PDF_DIR>/../extracted)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Heading classifier weights (JSON)
        #[arg(long, value_name = "FILE", env = "OUTLINER_MODEL")]
        model: Option<PathBuf>,

        /// Process documents one at a time
        #[arg(long)]
        sequential: bool,

        /// Skip unreadable pages instead of failing
        #[arg(long)]
        lenient: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Extract the outline of a single document
    Outline {
        /// Input PDF (or .jsonl line dump)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Heading classifier weights (JSON)
        #[arg(long, value_name = "FILE", env = "OUTLINER_MODEL")]
        model: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print classified line features as JSON Lines
    Lines {
        /// Input PDF (or .jsonl line dump)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Heading classifier weights (JSON)
        #[arg(long, value_name = "FILE", env = "OUTLINER_MODEL")]
        model: Option<PathBuf>,
    },

    /// Rank the headings of a document collection for a persona and task
    Rank {
        /// Request JSON (persona, job_to_be_done, documents)
        #[arg(value_name = "REQUEST")]
        request: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Collection directory, searched in the given order
        /// (default: the request file's directory)
        #[arg(
            short,
            long = "collection",
            value_name = "DIR",
            env = "OUTLINER_COLLECTIONS",
            value_delimiter = ','
        )]
        collections: Vec<PathBuf>,

        /// Number of sections to keep
        #[arg(long, default_value_t = outliner::options::DEFAULT_TOP_K)]
        top_k: usize,

        /// Embedding dimensions
        #[arg(long, default_value_t = HashEmbedderConfig::DEFAULT_DIMENSIONS)]
        dims: usize,

        /// Embedding hash seed
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Rank with a sentence model (HuggingFace id or local directory)
        /// instead of the hash embedder; needs the `bert` feature
        #[arg(long, value_name = "MODEL", env = "OUTLINER_SENTENCE_MODEL")]
        sentence_model: Option<String>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Extract {
            input,
            output,
            model,
            sequential,
            lenient,
            compact,
        }) => cmd_extract(
            &input,
            output.as_deref(),
            model.as_deref(),
            sequential,
            lenient,
            compact,
        ),
        Some(Commands::Outline {
            input,
            output,
            model,
            compact,
        }) => cmd_outline(&input, output.as_deref(), model.as_deref(), compact),
        Some(Commands::Lines { input, model }) => cmd_lines(&input, model.as_deref()),
        Some(Commands::Rank {
            request,
            output,
            collections,
            top_k,
            dims,
            seed,
            sentence_model,
            compact,
        }) => build_embedder(
            HashEmbedderConfig {
                dimensions: dims,
                seed,
            },
            sentence_model.as_deref(),
        )
        .and_then(|embedder| {
            cmd_rank(
                &request,
                output.as_deref(),
                collections,
                top_k,
                embedder.as_ref(),
                compact,
            )
        }),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: outliner <COMMAND>".yellow());
            println!("       outliner --help for more information");
            Ok(())
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

fn build_outliner(model: Option<&Path>) -> Result<Outliner, Box<dyn std::error::Error>> {
    let outliner = Outliner::new();
    match model {
        Some(path) => Ok(outliner.with_model(path)?),
        None => Ok(outliner),
    }
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    model: Option<&Path>,
    sequential: bool,
    lenient: bool,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output.map(Path::to_path_buf).unwrap_or_else(|| {
        input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("extracted")
    });

    let mut options = ExtractOptions::new()
        .with_parallel(!sequential)
        .with_format(json_format(compact));
    if lenient {
        options = options.lenient();
    }
    let outliner = build_outliner(model)?.with_options(options);

    let source = SourceRegistry::with_error_mode(outliner.options().error_mode);
    let extractor = outliner.extractor(&source);
    let total = extractor.list_documents(input)?.len();
    if total == 0 {
        println!("{} {}", "No documents found in".yellow(), input.display());
        return Ok(());
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = extractor.extract_directory_with(input, &output_dir, |doc| {
        let name = doc.source.file_name().unwrap_or_default().to_string_lossy();
        pb.set_message(name.to_string());
        pb.inc(1);
    })?;
    pb.finish_with_message("Done!");

    println!("\n{}", "Extracted outlines:".green().bold());
    for (i, doc) in report.iter().enumerate() {
        let branch = if i + 1 == report.len() { "└─" } else { "├─" };
        let name = doc.output.file_name().unwrap_or_default().to_string_lossy();
        let title = if doc.title.is_empty() {
            "(no title)".dimmed().to_string()
        } else {
            doc.title.clone()
        };
        println!(
            "  {} {} {} ({} headings)",
            branch.dimmed(),
            name,
            title,
            doc.headings
        );
    }
    println!("{} {}", "Saved to".green(), output_dir.display());

    Ok(())
}

fn cmd_outline(
    input: &Path,
    output: Option<&Path>,
    model: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = json_format(compact);
    let outline = build_outliner(model)?.extract(input)?;

    if let Some(path) = output {
        write_json(path, &outline, format)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", to_json(&outline, format)?);
    }

    Ok(())
}

fn cmd_lines(input: &Path, model: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let outliner = build_outliner(model)?;
    let source = SourceRegistry::with_defaults();
    let lines = classify_lines(outliner.classifier(), source.lines(input)?)?;

    for line in &lines {
        println!("{}", to_json(line, JsonFormat::Compact)?);
    }

    Ok(())
}

fn build_embedder(
    hash: HashEmbedderConfig,
    sentence_model: Option<&str>,
) -> Result<Box<dyn TextEmbedder>, Box<dyn std::error::Error>> {
    match sentence_model {
        None => Ok(Box::new(HashEmbedder::new(hash)?)),
        #[cfg(feature = "bert")]
        Some(model) => Ok(Box::new(outliner::BertEmbedder::from_pretrained(model)?)),
        #[cfg(not(feature = "bert"))]
        Some(model) => Err(format!(
            "cannot load sentence model {}: built without the `bert` feature",
            model
        )
        .into()),
    }
}

fn cmd_rank(
    request_path: &Path,
    output: Option<&Path>,
    collections: Vec<PathBuf>,
    top_k: usize,
    embedder: &dyn TextEmbedder,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = RankRequest::load(request_path)?;

    let collections = if collections.is_empty() {
        vec![request_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()]
    } else {
        collections
    };
    log::debug!("collection directories: {:?}", collections);
    let format = json_format(compact);
    let options = RankOptions::new()
        .with_top_k(top_k)
        .with_collections(collections)
        .with_format(format);

    let ranked = rank_request(&request, &options, embedder)?;

    if let Some(path) = output {
        write_json(path, &ranked, options.format)?;
        println!(
            "{} {} ({} sections)",
            "Saved to".green(),
            path.display(),
            ranked.len()
        );
    } else {
        println!("{}", to_json(&ranked, options.format)?);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "outliner".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF heading outline extraction and section ranking");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/outliner".dimmed());
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_rank_collections() {
        let cli = Cli::try_parse_from([
            "outliner", "rank", "input.json", "-c", "a", "--collection", "b", "--top-k", "3",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Rank {
                collections,
                top_k,
                dims,
                sentence_model,
                ..
            }) => {
                assert_eq!(collections, [PathBuf::from("a"), PathBuf::from("b")]);
                assert_eq!(top_k, 3);
                assert_eq!(dims, HashEmbedderConfig::DEFAULT_DIMENSIONS);
                assert_eq!(sentence_model, None);
            }
            _ => panic!("expected rank command"),
        }
    }

    #[test]
    fn test_build_embedder_defaults_to_hash() {
        let embedder = build_embedder(HashEmbedderConfig::default(), None).unwrap();
        assert_eq!(embedder.name(), "hash");
        assert_eq!(embedder.dimensions(), HashEmbedderConfig::DEFAULT_DIMENSIONS);
    }

    #[cfg(not(feature = "bert"))]
    #[test]
    fn test_sentence_model_needs_feature() {
        assert!(build_embedder(HashEmbedderConfig::default(), Some("any/model")).is_err());
    }

    #[test]
    fn test_rank_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let outline = outliner::DocumentOutline::new(
            "Guide",
            vec![outliner::OutlineEntry::new(
                outliner::HeadingLevel::H1,
                "Packing list",
                2,
            )],
        );
        write_json(
            dir.path().join("extracted").join("guide.json"),
            &outline,
            JsonFormat::Pretty,
        )
        .unwrap();
        let request = RankRequest::new("Traveler", "Pack for a trip").with_document("guide.pdf");
        let request_path = dir.path().join("input.json");
        write_json(&request_path, &request, JsonFormat::Pretty).unwrap();
        let output = dir.path().join("out").join("ranked.json");

        cmd_rank(
            &request_path,
            Some(output.as_path()),
            Vec::new(),
            5,
            &HashEmbedder::default(),
            false,
        )
        .unwrap();

        let written: outliner::RankedOutput =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written.extracted_sections[0].section_title, "Packing list");
    }
}
