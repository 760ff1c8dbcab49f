use std::time::Instant;

use rand::Rng;

use crate::data::data_table::DataTable;
use crate::error::{Error, Result, Stage};
use crate::network::network::Network;
use crate::network::weights::WeightStore;
use crate::optim::sgd::Sgd;
use crate::train::iteration_stats::IterationStats;
use crate::train::metrics::MetricsTracker;
use crate::train::train_config::TrainConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Converged,
}

/// Result of a training run that reached convergence.
#[derive(Debug)]
pub struct TrainOutcome {
    pub network: Network,
    pub metrics: MetricsTracker,
    /// Value of the iteration counter when the stop rule fired.
    pub iterations: usize,
    pub last: IterationStats,
}

// ---------------------------------------------------------------------------
// TrainingLoop
// ---------------------------------------------------------------------------

/// Online SGD over random draws from a labeled table, stopped by the
/// accuracy-ratio heuristic.
///
/// Each [`TrainingLoop::step`] samples one observation (with replacement),
/// runs forward + backprop, updates the running averages and checks the stop
/// rule. When the rule fires the weights are written to the `WeightStore`
/// and the loop moves to `Converged`.
pub struct TrainingLoop<'a, R: Rng> {
    network: Network,
    table: &'a DataTable,
    store: &'a WeightStore,
    sgd: Sgd,
    config: TrainConfig,
    metrics: MetricsTracker,
    iteration: usize,
    state: LoopState,
    last: Option<IterationStats>,
    rng: R,
}

impl<'a, R: Rng> TrainingLoop<'a, R> {
    pub fn new(
        network: Network,
        table: &'a DataTable,
        store: &'a WeightStore,
        config: TrainConfig,
        rng: R,
    ) -> Result<Self> {
        if table.is_empty() {
            return Err(Error::EmptyDataset);
        }
        if !table.is_labeled() {
            return Err(Error::Config("training requires a labeled dataset".into()));
        }
        if config.short_window == 0 || config.long_window == 0 {
            return Err(Error::Config("running-average windows must be non-zero".into()));
        }

        let sgd = Sgd { learning_rate: config.alpha, hidden_damping: config.hidden_damping };

        Ok(TrainingLoop {
            network,
            table,
            store,
            sgd,
            config,
            metrics: MetricsTracker::new(),
            iteration: 0,
            state: LoopState::Running,
            last: None,
            rng,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn metrics(&self) -> &MetricsTracker {
        &self.metrics
    }

    pub fn last_stats(&self) -> Option<IterationStats> {
        self.last
    }

    /// Runs one iteration. A converged loop does nothing and stays converged.
    pub fn step(&mut self) -> Result<LoopState> {
        if self.state == LoopState::Converged {
            return Ok(self.state);
        }

        // ── Sample ─────────────────────────────────────────────────────────
        let table = self.table;
        let observation = table.sample(&mut self.rng).ok_or(Error::EmptyDataset)?;
        let label = observation.label().ok_or_else(|| {
            Error::Config("training requires a labeled dataset".into())
        })?;

        // ── Forward + backprop ─────────────────────────────────────────────
        let forward = self
            .network
            .forward(observation.features())
            .map_err(|e| e.at(Stage::Forward))?;
        self.sgd
            .step(&mut self.network, &forward, label, &mut self.metrics)
            .map_err(|e| e.at(Stage::Backprop))?;

        // ── Running averages ───────────────────────────────────────────────
        let stats = self.stats();
        self.last = Some(stats);
        self.report(&stats);

        // ── Stop rule ──────────────────────────────────────────────────────
        if self.should_stop(&stats) {
            self.store
                .persist(&self.network.weights)
                .map_err(|e| e.at(Stage::Persist))?;
            self.state = LoopState::Converged;
            return Ok(self.state);
        }

        self.iteration += 1;
        Ok(self.state)
    }

    /// Steps until the stop rule fires. There is no iteration cap beyond
    /// the rule itself.
    pub fn run(mut self) -> Result<TrainOutcome> {
        log::info!(
            "training: alpha={} hidden={} ({}) min_iterations={} ratio<{}",
            self.config.alpha,
            self.network.topology.hidden_nodes,
            self.network.topology.hidden,
            self.config.min_iterations,
            self.config.accuracy_ratio_threshold
        );
        let start = Instant::now();

        while self.step()? == LoopState::Running {}

        log::info!(
            "converged after {} iterations; total training time was {} sec",
            self.iteration,
            start.elapsed().as_secs()
        );
        self.into_outcome()
    }

    fn into_outcome(self) -> Result<TrainOutcome> {
        let last = self.last.ok_or(Error::EmptyDataset)?;
        Ok(TrainOutcome {
            network: self.network,
            metrics: self.metrics,
            iterations: self.iteration,
            last,
        })
    }

    fn stats(&self) -> IterationStats {
        let avg_accuracy_short = self.metrics.average_accuracy(self.config.short_window);
        let avg_accuracy_long = self.metrics.average_accuracy(self.config.long_window);
        let ratio = if avg_accuracy_long > 0.0 {
            Some(avg_accuracy_short / avg_accuracy_long)
        } else {
            None
        };

        IterationStats {
            iteration: self.iteration,
            avg_error_short: self.metrics.average_error(self.config.short_window),
            avg_error_long: self.metrics.average_error(self.config.long_window),
            avg_accuracy_short,
            avg_accuracy_long,
            ratio,
        }
    }

    /// Past the iteration floor and short-term accuracy no longer beats the
    /// long-term trend. An undefined ratio never stops the loop.
    fn should_stop(&self, stats: &IterationStats) -> bool {
        stats.iteration > self.config.min_iterations
            && stats.ratio.map_or(false, |r| r < self.config.accuracy_ratio_threshold)
    }

    fn report(&self, stats: &IterationStats) {
        let ratio = stats.ratio.map_or_else(|| "n/a".to_string(), |r| format!("{:.4}", r));
        log::debug!(
            "iter={} err({})={:.4} err({})={:.4} acc({})={:.4} acc({})={:.4} ratio={}",
            stats.iteration,
            self.config.short_window,
            stats.avg_error_short,
            self.config.long_window,
            stats.avg_error_long,
            self.config.short_window,
            stats.avg_accuracy_short,
            self.config.long_window,
            stats.avg_accuracy_long,
            ratio
        );
        if self.config.log_every > 0 && stats.iteration % self.config.log_every == 0 {
            log::info!(
                "iteration {:>7}  error {:.4} / {:.4}  accuracy {:.4} / {:.4}  ratio {}",
                stats.iteration,
                stats.avg_error_short,
                stats.avg_error_long,
                stats.avg_accuracy_short,
                stats.avg_accuracy_long,
                ratio
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` on `table` until convergence and persists the final
/// weights to `store`.
pub fn train_loop<R: Rng>(
    network: Network,
    table: &DataTable,
    store: &WeightStore,
    config: TrainConfig,
    rng: R,
) -> Result<TrainOutcome> {
    TrainingLoop::new(network, table, store, config, rng)?.run()
}
