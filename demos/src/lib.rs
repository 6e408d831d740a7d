//! Shared setup for the drawmap demo binaries
//!
//! Set the `RUST_LOG` environment variable to control log output, e.g.
//! `RUST_LOG=drawmap_algorithms=debug`. Without it, `-v` flags raise the level.

use anyhow::Result;
use clap::{Args, ValueEnum};
use drawmap_core::{ImageSize, MappingOptions, MeshVariant, VerticalAxis};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

/// Template image and axis flags shared by the query demos
#[derive(Debug, Args)]
pub struct TemplateArgs {
    /// Mesh variant, e.g. male_right or "Female Left Arm"
    #[arg(long)]
    pub variant: MeshVariant,

    /// Width of the location drawing in pixels
    #[arg(long, default_value = "500")]
    pub width: f64,

    /// Height of the location drawing in pixels
    #[arg(long, default_value = "500")]
    pub height: f64,

    /// Treat image rows as growing upwards, like UV space
    #[arg(long)]
    pub aligned: bool,
}

impl TemplateArgs {
    pub fn image_size(&self) -> Result<ImageSize> {
        Ok(ImageSize::new(self.width, self.height)?)
    }

    pub fn mapping(&self) -> MappingOptions {
        let axis = if self.aligned {
            VerticalAxis::Aligned
        } else {
            VerticalAxis::Flipped
        };
        MappingOptions::default().with_vertical_axis(axis)
    }
}

/// Install a stderr subscriber honoring `RUST_LOG`, else the verbosity count
pub fn init_logging(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "drawmap_algorithms=info,drawmap_io=info",
            2 => "drawmap_algorithms=debug,drawmap_io=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}
