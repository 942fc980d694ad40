//! Lightbox CLI
//!
//! Headless access to the Lightbox viewer: render a saved session or a single
//! image through the filter pipeline and write the result as PNG.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lightbox_core::FilterMode;

/// Lightbox - render image overlays from the command line
#[derive(Parser, Debug)]
#[command(name = "lightbox")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a layer of a saved session
    #[command(name = "render")]
    Render {
        /// Path to the session JSON file
        session: PathBuf,

        /// Layer to render instead of the session's active layer
        #[arg(short, long)]
        layer: Option<usize>,

        /// Where to write the PNG
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Filter a single PNG or JPEG image
    #[command(name = "filter")]
    Filter {
        /// Path to the source image
        image: PathBuf,

        /// normal, threshold or threshold_inverted
        #[arg(short, long, default_value = "normal", value_parser = parse_mode)]
        mode: FilterMode,

        /// Threshold cutoff as a percentage of full brightness
        #[arg(short, long, default_value_t = lightbox_core::DEFAULT_THRESHOLD_PERCENT)]
        threshold: f64,

        /// Convert to grayscale before thresholding
        #[arg(short, long)]
        grayscale: bool,

        /// Where to write the PNG
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the layers of a saved session
    #[command(name = "info")]
    Info {
        /// Path to the session JSON file
        session: PathBuf,
    },
}

fn parse_mode(name: &str) -> Result<FilterMode, String> {
    FilterMode::from_name(name).ok_or_else(|| {
        format!(
            "unknown mode '{}' (expected normal, threshold or threshold_inverted)",
            name
        )
    })
}
