use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::network::forward::ForwardState;
use crate::network::network::Network;
use crate::train::metrics::MetricsTracker;

/// Default learning rate.
pub const DEFAULT_ALPHA: f64 = 0.05;
/// Fraction of `alpha` applied to the input-to-hidden weights.
pub const DEFAULT_HIDDEN_DAMPING: f64 = 0.1;

/// Plain per-observation stochastic gradient descent for the
/// softmax/cross-entropy network.
#[derive(Debug, Clone, Copy)]
pub struct Sgd {
    pub learning_rate: f64,
    /// Multiplier on `learning_rate` for `w1`. The hidden layer has a much
    /// larger fan-in, so it moves at a tenth of the output layer's rate.
    pub hidden_damping: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate, hidden_damping: DEFAULT_HIDDEN_DAMPING }
    }

    /// Backpropagates one forward pass against the true `label` and updates
    /// the network weights in place.
    ///
    /// Records `Σ|a3 - y|` and whether the prediction was right into `metrics`.
    pub fn step(
        &self,
        network: &mut Network,
        state: &ForwardState,
        label: usize,
        metrics: &mut MetricsTracker,
    ) -> Result<()> {
        let hidden_nodes = network.topology.hidden_nodes;
        let y = one_hot(label, network.topology.output_size)?;

        // Combined softmax + cross-entropy gradient w.r.t. z3.
        let d3 = state.a3.subtract(&y)?;

        // Error reaching the hidden layer; the bias row of w2 gets none.
        let hidden_deriv = network
            .topology
            .hidden
            .apply_derivative(&state.z2.transpose())
            .ok_or_else(|| {
                Error::Config(format!("{} has no element-wise derivative", network.topology.hidden))
            })?;
        let d3_t = d3.transpose();
        let d2 = network
            .weights
            .w2
            .matmul(&d3_t)?
            .take_rows(hidden_nodes)?
            .elementwise_multiply(&hidden_deriv)?;

        let grad1 = d2.matmul(&state.a1)?;
        let grad2 = d3_t.matmul(&state.a2_with_bias)?;

        let lr1 = self.learning_rate * self.hidden_damping;
        let lr2 = self.learning_rate;
        network.weights.w1.subtract_assign(&grad1.transpose().scale(lr1))?;
        network.weights.w2.subtract_assign(&grad2.transpose().scale(lr2))?;

        // Only completed updates are counted.
        metrics.record(d3.sum_abs(), state.prediction() == label);
        Ok(())
    }
}

impl Default for Sgd {
    fn default() -> Self {
        Sgd::new(DEFAULT_ALPHA)
    }
}

/// Row vector of length `classes` with 1.0 at `label`.
pub fn one_hot(label: usize, classes: usize) -> Result<Matrix> {
    if label >= classes {
        return Err(Error::ShapeMismatch {
            op: "one_hot",
            left: (1, label + 1),
            right: (1, classes),
        });
    }
    let mut y = Matrix::zeros(1, classes);
    y.set(0, label, 1.0);
    Ok(y)
}
