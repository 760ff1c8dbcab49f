pub mod sgd;

pub use sgd::{one_hot, Sgd};
