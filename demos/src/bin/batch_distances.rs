//! Geodesic distances for a batch of drawn point pairs
//!
//! Each CSV row holds `start_x, start_y, end_x, end_y` in drawing pixels.
//! Rows with missing coordinates are skipped and counted.
//!
//! ```bash
//! batch_distances --data-dir data --variant female_left --queries pairs.csv --paths
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use drawmap_algorithms::{EdgeGraphBackend, GeodesicSession};
use drawmap_core::SessionOptions;
use drawmap_demos::{init_logging, OutputFormat, TemplateArgs};
use drawmap_io::{read_query_csv_file, DirectoryStore};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding prepared mesh caches
    #[arg(long)]
    data_dir: PathBuf,

    #[command(flatten)]
    template: TemplateArgs,

    /// Query CSV file
    #[arg(long)]
    queries: PathBuf,

    /// Also trace a surface path for every query
    #[arg(long)]
    paths: bool,

    /// Output format for results
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity (-v for info, -vv for debug)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let rows = read_query_csv_file(&cli.queries)
        .with_context(|| format!("reading {}", cli.queries.display()))?;

    let options =
        SessionOptions::new(cli.template.image_size()?).with_mapping(cli.template.mapping());
    let store = DirectoryStore::new(&cli.data_dir);
    let mut session = GeodesicSession::new(store, EdgeGraphBackend, options);
    session.load_variant(cli.template.variant)?;

    let report = session.analyze(&rows, cli.paths)?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!(
                "{}: {} queries, {} skipped",
                cli.template.variant, report.summary.retained, report.summary.dropped
            );
            for (idx, (distance, &(start, end))) in report
                .distances
                .iter()
                .zip(session.vertex_pairs())
                .enumerate()
            {
                println!(
                    "  query {:>3}: vertex {} -> {}  distance {:.4}",
                    idx, start, end, distance
                );
            }
            if let Some(paths) = &report.paths {
                for (label, points) in paths {
                    println!("  {}: {} points", label, points.len());
                }
            }
        }
    }
    Ok(())
}
