pub mod activation;
pub mod app;
pub mod data;
pub mod error;
pub mod imaging;
pub mod math;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use activation::activation::ActivationFunction;
pub use data::data_table::{DataTable, LabelColumn, Observation};
pub use error::{Error, Result, Stage};
pub use math::matrix::Matrix;
pub use network::forward::ForwardState;
pub use network::network::Network;
pub use network::topology::Topology;
pub use network::weights::{WeightStore, Weights};
pub use optim::sgd::Sgd;
pub use train::loop_fn::{train_loop, LoopState, TrainOutcome, TrainingLoop};
pub use train::metrics::MetricsTracker;
pub use train::train_config::TrainConfig;
