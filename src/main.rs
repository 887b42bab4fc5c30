use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};

use playtei::discovery::{self, DiscoveryConfig};
use playtei::sources::SourceTable;
use playtei::{process_files_parallel, write_run_stats, ConversionConfig, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "playtei")]
#[command(about = "Converts théâtre-documentation HTML plays into TEI for DraCor")]
#[command(version)]
struct Args {
    /// Directory holding one HTML page per play
    root_dir: PathBuf,

    /// Output directory for TEI files (default: <root_dir>/tei)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Tab-separated listing mapping file names to source URLs
    #[arg(long)]
    sources: Option<PathBuf>,

    /// Look for pages in subdirectories too
    #[arg(long)]
    recursive: bool,

    /// Overwrite even complete output files
    #[arg(long)]
    overwrite_all: bool,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Use memory-mapped I/O instead of async buffered
    #[arg(long)]
    use_mmap: bool,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,

    /// Join split paragraphs and unwrap style spans before extraction
    #[arg(long)]
    prenormalize: bool,

    /// Also write the extracted document tree as JSON
    #[arg(long)]
    emit_json: bool,

    /// Plays converted concurrently
    #[arg(long, default_value_t = num_cpus::get())]
    jobs: usize,

    /// Accepted edit distance for any declared character
    #[arg(long, default_value_t = 3)]
    max_distance: usize,

    /// Accepted edit distance for a character announced in the scene
    #[arg(long, default_value_t = 5)]
    scene_distance: usize,

    /// Stats output file path
    #[arg(long, default_value = "run_stats.json")]
    stats_out: PathBuf,

    /// Run summary report path
    #[arg(long, default_value = "stats_characters.txt")]
    report: PathBuf,

    /// Debug-level logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .json()
        .init();

    info!("Starting playtei");
    info!(?args, "Parsed CLI arguments");

    if !args.root_dir.exists() {
        anyhow::bail!("Root directory does not exist: {}", args.root_dir.display());
    }
    if !args.root_dir.is_dir() {
        anyhow::bail!("Root path is not a directory: {}", args.root_dir.display());
    }

    let sources = match &args.sources {
        Some(path) => SourceTable::load(path).await?,
        None => SourceTable::default(),
    };

    let discovery_config = DiscoveryConfig {
        fail_fast: args.fail_fast,
        recursive: args.recursive,
    };
    let discovered = discovery::collect_discovered_files(&args.root_dir, discovery_config).await?;
    let plays: Vec<PathBuf> = discovered
        .into_iter()
        .filter(|f| f.error.is_none())
        .map(|f| f.path)
        .collect();

    println!("playtei v{} - {} plays found", env!("CARGO_PKG_VERSION"), plays.len());

    let options = RunOptions {
        out_dir: args.out_dir.clone().unwrap_or_else(|| args.root_dir.join("tei")),
        jobs: args.jobs,
        overwrite_all: args.overwrite_all,
        fail_fast: args.fail_fast,
        use_mmap: args.use_mmap,
        prenormalize: args.prenormalize,
        emit_json: args.emit_json,
        show_progress: !args.no_progress,
        conversion: ConversionConfig {
            max_edit_distance: args.max_distance,
            scene_edit_distance: args.scene_distance,
        },
        change_date: chrono::Local::now().format("%Y-%m-%d").to_string(),
    };

    let stats = process_files_parallel(&plays, Arc::new(sources), options).await?;

    write_run_stats(&args.stats_out, &stats).await?;
    let report = stats.summary.render_text();
    tokio::fs::write(&args.report, &report).await?;
    info!("Stats written to {} and {}", args.stats_out.display(), args.report.display());

    print!("{report}");
    Ok(())
}
