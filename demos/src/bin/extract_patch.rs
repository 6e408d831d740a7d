//! Extract the surface patch enclosed by a drawn border
//!
//! The border CSV lists the drawn outline as ordered `x, y` pixels.
//!
//! ```bash
//! extract_patch --data-dir data --variant male_left --border outline.csv --format json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use drawmap_algorithms::RegionExtractor;
use drawmap_core::{ContainmentStrategy, MeshStore, RegionOptions};
use drawmap_demos::{init_logging, OutputFormat, TemplateArgs};
use drawmap_io::{read_border_csv_file, DirectoryStore};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding prepared mesh caches
    #[arg(long)]
    data_dir: PathBuf,

    #[command(flatten)]
    template: TemplateArgs,

    /// Border CSV file
    #[arg(long)]
    border: PathBuf,

    /// Test every UV point instead of pre-filtering by bounding box
    #[arg(long)]
    exhaustive: bool,

    /// Output format for results
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity (-v for info, -vv for debug)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct PatchReport<'a> {
    variant: String,
    vertex_ids: &'a [usize],
    points: Vec<[f64; 3]>,
    area: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let border = read_border_csv_file(&cli.border)
        .with_context(|| format!("reading {}", cli.border.display()))?;
    let image = cli.template.image_size()?;

    let store = DirectoryStore::new(&cli.data_dir);
    let mesh = store.load_variant(cli.template.variant)?;

    let containment = if cli.exhaustive {
        ContainmentStrategy::Exhaustive
    } else {
        ContainmentStrategy::BoundingBox
    };
    let options = RegionOptions::default()
        .with_mapping(cli.template.mapping())
        .with_containment(containment);

    let patch = RegionExtractor::new(&mesh, options)?.extract_patch(&border, &image)?;
    let area = patch.area(&mesh);

    match cli.format {
        OutputFormat::Json => {
            let report = PatchReport {
                variant: cli.template.variant.to_string(),
                vertex_ids: &patch.vertex_ids,
                points: patch.points.iter().map(|p| [p.x, p.y, p.z]).collect(),
                area,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!(
                "{}: {} border pixels enclose {} vertices, surface area {:.4}",
                cli.template.variant,
                border.len(),
                patch.len(),
                area
            );
        }
    }
    Ok(())
}
