use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use spimi_core::{merge, BuildStats, DirectorySource, DocumentErrorPolicy, IndexBuilder, IndexerConfig, MergeStrategy};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a term-to-document inverted index with blocked construction and merge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Streaming,
    InMemory,
}

impl From<StrategyArg> for MergeStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Streaming => MergeStrategy::Streaming,
            StrategyArg::InMemory => MergeStrategy::InMemory,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Index every file of a directory; each file name is the document id
    Build {
        /// Directory holding the documents
        #[arg(long)]
        input: PathBuf,
        /// Final index file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Directory for transient sub-index files
        #[arg(long)]
        work_dir: Option<PathBuf>,
        /// JSON config file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,
        /// Maximum distinct terms per block
        #[arg(long)]
        max_terms: Option<usize>,
        /// Maximum source bytes per block
        #[arg(long)]
        max_block_bytes: Option<u64>,
        #[arg(long, value_enum)]
        merge_strategy: Option<StrategyArg>,
        /// Log and skip documents that cannot be read instead of aborting
        #[arg(long, default_value_t = false)]
        skip_bad_documents: bool,
        /// Print the build summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Merge existing sub-index files into a final index, then delete them
    Merge {
        #[arg(long)]
        output: PathBuf,
        #[arg(long, value_enum, default_value = "streaming")]
        merge_strategy: StrategyArg,
        #[arg(required = true)]
        sub_indexes: Vec<PathBuf>,
    },
}

#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    stats: &'a BuildStats,
    finished_at: String,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output,
            work_dir,
            config,
            max_terms,
            max_block_bytes,
            merge_strategy,
            skip_bad_documents,
            json,
        } => {
            let mut cfg = match config {
                Some(path) => IndexerConfig::from_json_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => IndexerConfig::default(),
            };
            if let Some(output) = output { cfg.output = output; }
            if let Some(dir) = work_dir { cfg.work_dir = dir; }
            if let Some(n) = max_terms { cfg.max_terms_per_block = n; }
            if let Some(n) = max_block_bytes { cfg.max_block_bytes = n; }
            if let Some(s) = merge_strategy { cfg.merge_strategy = s.into(); }
            if skip_bad_documents { cfg.on_document_error = DocumentErrorPolicy::Skip; }
            build_index(&input, cfg, json)
        }
        Commands::Merge { output, merge_strategy, sub_indexes } => {
            let outcome = merge(&sub_indexes, &output, merge_strategy.into())?;
            println!("merged {} sub-indexes into {} ({} terms)", sub_indexes.len(), outcome.output.display(), outcome.terms);
            for stale in &outcome.stale {
                eprintln!("warning: could not remove {}", stale.display());
            }
            Ok(())
        }
    }
}

fn build_index(input: &Path, cfg: IndexerConfig, json: bool) -> Result<()> {
    tracing::info!(input = %input.display(), output = %cfg.output.display(), max_terms = cfg.max_terms_per_block, max_bytes = cfg.max_block_bytes, "starting build");
    let builder = IndexBuilder::new(cfg)?;
    let source = DirectorySource::open(input)?;
    let stats = builder.build(source)?;

    if json {
        let report = Report {
            stats: &stats,
            finished_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "indexed {} documents ({} skipped, {} bytes) in {} blocks: {} terms -> {}",
            stats.documents,
            stats.skipped,
            stats.bytes,
            stats.blocks,
            stats.terms,
            stats.output.display()
        );
    }
    for name in &stats.skipped_documents {
        eprintln!("warning: skipped document {name}");
    }
    for stale in &stats.stale_sub_indexes {
        eprintln!("warning: could not remove {}", stale.display());
    }
    Ok(())
}
