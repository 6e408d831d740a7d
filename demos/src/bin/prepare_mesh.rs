//! Prepare a mesh variant for querying
//!
//! Parses a base OBJ (or pre-converted text) mesh plus any secondary UV
//! layouts of the same mesh, merges the UV tables and writes the variant's
//! cache file into the data directory.
//!
//! ```bash
//! prepare_mesh --data-dir data --variant male_right \
//!     --base male_right.obj --addition male_right_hand.obj
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use drawmap_core::MeshVariant;
use drawmap_demos::init_logging;
use drawmap_io::{convert_obj_file, prepare_variant, DirectoryStore};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding prepared mesh caches
    #[arg(long)]
    data_dir: PathBuf,

    /// Mesh variant, e.g. male_right or "Female Left Arm"
    #[arg(long)]
    variant: MeshVariant,

    /// Base mesh file (.obj or .txt)
    #[arg(long)]
    base: PathBuf,

    /// Secondary UV layout of the same mesh; may be repeated
    #[arg(long = "addition")]
    additions: Vec<PathBuf>,

    /// Also write the base mesh as a trimmed text file
    #[arg(long)]
    text_out: Option<PathBuf>,

    /// Increase output verbosity (-v for info, -vv for debug)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(text_out) = &cli.text_out {
        let lines = convert_obj_file(&cli.base, text_out)
            .with_context(|| format!("converting {}", cli.base.display()))?;
        println!("Wrote {} lines to {}", lines, text_out.display());
    }

    let store = DirectoryStore::new(&cli.data_dir);
    let path = prepare_variant(&store, cli.variant, &cli.base, &cli.additions)
        .with_context(|| format!("preparing {}", cli.variant))?;

    println!("Prepared {} -> {}", cli.variant, path.display());
    Ok(())
}
