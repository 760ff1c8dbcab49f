pub mod iteration_stats;
pub mod loop_fn;
pub mod metrics;
pub mod train_config;

pub use iteration_stats::IterationStats;
pub use loop_fn::{train_loop, LoopState, TrainOutcome, TrainingLoop};
pub use metrics::{running_average, MetricsTracker};
pub use train_config::TrainConfig;
