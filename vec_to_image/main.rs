//! vec-to-image
//!
//! Turns digit vectors into pictures and pictures into digit vectors.
//!
//! Run with:
//!   cargo run --bin vec-to-image -- grid --wide 5 --high 5
//!   cargo run --bin vec-to-image -- handmade handmade.png
//!
//! Both commands write an unlabeled CSV that `digit-net --mode eval` scores.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use digit_net::app::rng_from_seed;
use digit_net::data::writers::write_feature_rows;
use digit_net::imaging::digits::{handmade_file_to_features, render_grid};
use digit_net::{DataTable, LabelColumn};

#[derive(Parser)]
#[command(name = "vec-to-image")]
#[command(about = "Convert between 784-pixel digit vectors and images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tile random training digits into one PNG
    Grid {
        /// Digits per row
        #[arg(long, default_value_t = 5)]
        wide: u32,

        /// Digits per column
        #[arg(long, default_value_t = 5)]
        high: u32,

        /// Cached training table
        #[arg(long, default_value = "data/train.data")]
        cache: PathBuf,

        /// CSV source used when the cache is missing
        #[arg(long, default_value = "data/mnist_digits/train.csv")]
        source: PathBuf,

        #[arg(long, default_value = "data/images/mnist.png")]
        image: PathBuf,

        /// Sampled vectors, one unlabeled row per digit
        #[arg(long, default_value = "data/manual_test_set.csv")]
        csv: PathBuf,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Convert a hand-drawn PNG into an unlabeled input row
    Handmade {
        #[arg(value_name = "IMAGE", default_value = "handmade.png")]
        input: PathBuf,

        #[arg(long, default_value = "data/manual_test_set.csv")]
        csv: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Commands::Grid { wide, high, cache, source, image, csv, seed } => {
            let table = DataTable::load_or_build(&cache, &source, LabelColumn::Index(0))
                .context("loading training table")?;
            let mut rng = rng_from_seed(seed);
            let (picture, rows) = render_grid(&table, wide, high, &mut rng)?;

            if let Some(dir) = image.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
            picture
                .save(&image)
                .with_context(|| format!("writing {}", image.display()))?;
            write_feature_rows(&csv, &rows)?;

            log::info!("{} digits drawn to {}, vectors in {}", rows.len(), image.display(), csv.display());
        }
        Commands::Handmade { input, csv } => {
            let features = handmade_file_to_features(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            write_feature_rows(&csv, &[features])?;
            log::info!("{} converted into {}", input.display(), csv.display());
        }
    }

    Ok(())
}
