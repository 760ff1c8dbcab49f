//! Train the digit classifier or score unlabeled images with saved weights.
//!
//! Usage:
//!   digit-net --mode train --alpha 0.05 --hidden-nodes 300
//!   digit-net --mode eval

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use digit_net::app::{run_eval, run_train, Paths};
use digit_net::{LabelColumn, Topology, TrainConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Train,
    Eval,
}

#[derive(Debug, Parser)]
#[command(name = "digit-net", version, about = "Single-hidden-layer MNIST digit classifier")]
struct Cli {
    #[arg(short, long, value_enum, default_value_t = Mode::Train)]
    mode: Mode,

    /// Output-layer learning rate; the hidden layer uses a tenth of it
    #[arg(short, long, default_value_t = 0.05)]
    alpha: f64,

    /// Hidden-layer activation: sigmoid or tanh
    #[arg(long, alias = "hidden_func", default_value = "tanh")]
    hidden_func: String,

    /// Output-layer activation
    #[arg(long, alias = "output_func", default_value = "softmax")]
    output_func: String,

    /// Hidden-layer width; overridden by loaded weights in eval mode
    #[arg(long, alias = "hidden_nodes", default_value_t = 300)]
    hidden_nodes: usize,

    /// Directory holding the default data files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    #[arg(long)]
    train_csv: Option<PathBuf>,

    #[arg(long)]
    train_cache: Option<PathBuf>,

    #[arg(long)]
    weights: Option<PathBuf>,

    #[arg(long)]
    eval_csv: Option<PathBuf>,

    #[arg(long)]
    submission: Option<PathBuf>,

    /// Column of the training CSV holding the digit
    #[arg(long, default_value_t = 0)]
    label_index: usize,

    /// Iterations before the stop rule is considered
    #[arg(long, default_value_t = 60_000)]
    min_iterations: usize,

    /// Stop once short/long accuracy falls below this
    #[arg(long, default_value_t = 1.0)]
    ratio_threshold: f64,

    #[arg(long, default_value_t = 1_000)]
    short_window: usize,

    #[arg(long, default_value_t = 5_000)]
    long_window: usize,

    /// Log running averages every N iterations
    #[arg(long, default_value_t = 1_000)]
    log_every: usize,

    /// Seed for reproducible weight init and sampling
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn paths(&self) -> Paths {
        let defaults = Paths::under(&self.data_dir);
        Paths {
            train_csv: self.train_csv.clone().unwrap_or(defaults.train_csv),
            train_cache: self.train_cache.clone().unwrap_or(defaults.train_cache),
            weights: self.weights.clone().unwrap_or(defaults.weights),
            eval_csv: self.eval_csv.clone().unwrap_or(defaults.eval_csv),
            submission: self.submission.clone().unwrap_or(defaults.submission),
        }
    }

    fn train_config(&self) -> TrainConfig {
        TrainConfig {
            min_iterations: self.min_iterations,
            accuracy_ratio_threshold: self.ratio_threshold,
            short_window: self.short_window,
            long_window: self.long_window,
            log_every: self.log_every,
            ..TrainConfig::new(self.alpha)
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!(
        "mode={:?} alpha={} hidden_func={} output_func={} hidden_nodes={}",
        cli.mode,
        cli.alpha,
        cli.hidden_func,
        cli.output_func,
        cli.hidden_nodes
    );

    let topology = Topology::from_names(cli.hidden_nodes, &cli.hidden_func, &cli.output_func)
        .context("invalid network configuration")?;
    let paths = cli.paths();

    match cli.mode {
        Mode::Train => {
            let outcome = run_train(
                &paths,
                LabelColumn::Index(cli.label_index),
                topology,
                cli.train_config(),
                cli.seed,
            )
            .context("training failed")?;
            log::info!(
                "final accuracy ({}) {:.4}, weights at {}",
                cli.short_window,
                outcome.last.avg_accuracy_short,
                paths.weights.display()
            );
        }
        Mode::Eval => {
            let predictions = run_eval(&paths, topology).context("evaluation failed")?;
            println!("{} predictions written to {}", predictions.len(), paths.submission.display());
        }
    }

    Ok(())
}
