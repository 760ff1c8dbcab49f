use crate::optim::sgd::{DEFAULT_ALPHA, DEFAULT_HIDDEN_DAMPING};

/// Hyperparameters of a training run.
///
/// # Fields
/// - `alpha`                     — output-layer learning rate
/// - `hidden_damping`            — `w1` learns at `alpha * hidden_damping`
/// - `min_iterations`            — no stop is considered until the iteration
///                                 counter exceeds this
/// - `accuracy_ratio_threshold`  — stop once short/long accuracy drops below it
/// - `short_window`              — iterations in the short running average
/// - `long_window`               — iterations in the long running average
/// - `log_every`                 — progress is logged at `info` this often
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    pub alpha: f64,
    pub hidden_damping: f64,
    pub min_iterations: usize,
    pub accuracy_ratio_threshold: f64,
    pub short_window: usize,
    pub long_window: usize,
    pub log_every: usize,
}

impl TrainConfig {
    /// Defaults with the given learning rate.
    pub fn new(alpha: f64) -> Self {
        TrainConfig { alpha, ..TrainConfig::default() }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            alpha: DEFAULT_ALPHA,
            hidden_damping: DEFAULT_HIDDEN_DAMPING,
            min_iterations: 60_000,
            accuracy_ratio_threshold: 1.0,
            short_window: 1_000,
            long_window: 5_000,
            log_every: 1_000,
        }
    }
}
