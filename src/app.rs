//! Train and eval entry points shared by the binaries.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::data::data_table::{DataTable, LabelColumn};
use crate::data::writers::write_submission;
use crate::error::{Result, Stage};
use crate::network::network::Network;
use crate::network::topology::Topology;
use crate::network::weights::WeightStore;
use crate::train::loop_fn::{train_loop, TrainOutcome};
use crate::train::train_config::TrainConfig;

/// Files a run reads from and writes to.
#[derive(Debug, Clone)]
pub struct Paths {
    pub train_csv: PathBuf,
    pub train_cache: PathBuf,
    pub weights: PathBuf,
    pub eval_csv: PathBuf,
    pub submission: PathBuf,
}

impl Paths {
    /// The conventional layout under one data directory.
    pub fn under<P: Into<PathBuf>>(data_dir: P) -> Paths {
        let dir = data_dir.into();
        Paths {
            train_csv: dir.join("mnist_digits").join("train.csv"),
            train_cache: dir.join("train.data"),
            weights: dir.join("weights.json"),
            eval_csv: dir.join("manual_test_set.csv"),
            submission: dir.join("submission.csv"),
        }
    }
}

impl Default for Paths {
    fn default() -> Self {
        Paths::under("data")
    }
}

/// RNG seeded from `seed`, or from OS entropy when none is given.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Loads (or builds) the training table, trains fresh weights to
/// convergence and persists them to `paths.weights`.
pub fn run_train(
    paths: &Paths,
    label_column: LabelColumn,
    topology: Topology,
    config: TrainConfig,
    seed: Option<u64>,
) -> Result<TrainOutcome> {
    let table = DataTable::load_or_build(&paths.train_cache, &paths.train_csv, label_column)
        .map_err(|e| e.at(Stage::Load))?;
    log::info!("training on {} observations", table.len());

    let mut rng = rng_from_seed(seed);
    let network = Network::new(topology, &mut rng)?;
    let store = WeightStore::new(&paths.weights);

    train_loop(network, &table, &store, config, rng)
}

/// Loads trained weights and writes one prediction per row of
/// `paths.eval_csv` to `paths.submission`. Returns the predictions.
///
/// Missing or unreadable weights are fatal: there is nothing to classify
/// with.
pub fn run_eval(paths: &Paths, topology: Topology) -> Result<Vec<usize>> {
    let weights = WeightStore::new(&paths.weights).load().map_err(|e| e.at(Stage::Load))?;
    let network = Network::from_weights(topology, weights).map_err(|e| e.at(Stage::Load))?;

    let table = DataTable::from_csv(&paths.eval_csv, LabelColumn::None).map_err(|e| e.at(Stage::Load))?;
    log::info!("creating submission for {} observations", table.len());

    let predictions = classify(&network, &table)?;

    write_submission(&paths.submission, &predictions).map_err(|e| e.at(Stage::Persist))?;
    log::info!("submission written to {}", paths.submission.display());
    Ok(predictions)
}

/// Predicted digit for every observation, in table order.
pub fn classify(network: &Network, table: &DataTable) -> Result<Vec<usize>> {
    let mut predictions = Vec::with_capacity(table.len());
    for (i, observation) in table.observations().iter().enumerate() {
        let digit = network
            .predict(observation.features())
            .map_err(|e| e.at(Stage::Forward))?;
        predictions.push(digit);
        if (i + 1) % 1000 == 0 {
            log::info!("classified {}/{}", i + 1, table.len());
        }
    }
    Ok(predictions)
}
