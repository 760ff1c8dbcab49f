pub mod activation;

pub use activation::{sigmoid, softmax, ActivationFunction};
