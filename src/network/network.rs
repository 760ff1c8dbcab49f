use rand::Rng;

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::network::forward::ForwardState;
use crate::network::topology::Topology;
use crate::network::weights::Weights;

/// Scale applied to raw pixel intensities before they enter the network.
pub const PIXEL_MAX: f64 = 255.0;

/// Single-hidden-layer classifier: topology plus its current weights.
#[derive(Debug, Clone)]
pub struct Network {
    pub topology: Topology,
    pub weights: Weights,
}

impl Network {
    /// Network with freshly initialized weights.
    pub fn new<R: Rng + ?Sized>(topology: Topology, rng: &mut R) -> Result<Network> {
        topology.validate()?;
        let weights = Weights::initialize(
            topology.input_size,
            topology.hidden_nodes,
            topology.output_size,
            rng,
        );
        Ok(Network { topology, weights })
    }

    /// Wraps loaded weights. The weights are authoritative: their hidden
    /// width replaces `topology.hidden_nodes`, while input and output sizes
    /// must agree.
    pub fn from_weights(topology: Topology, weights: Weights) -> Result<Network> {
        let hidden = weights.hidden_nodes();
        if hidden != topology.hidden_nodes {
            log::warn!(
                "configured hidden_nodes={} overridden by loaded weights (hidden_nodes={})",
                topology.hidden_nodes,
                hidden
            );
        }
        let topology = topology.with_hidden_nodes(hidden)?;

        if weights.w1.shape() != topology.w1_shape() {
            return Err(Error::ShapeMismatch {
                op: "w1",
                left: weights.w1.shape(),
                right: topology.w1_shape(),
            });
        }
        if weights.w2.shape() != topology.w2_shape() {
            return Err(Error::ShapeMismatch {
                op: "w2",
                left: weights.w2.shape(),
                right: topology.w2_shape(),
            });
        }
        Ok(Network { topology, weights })
    }

    /// Forward pass over raw pixel values; never touches the weights.
    pub fn forward(&self, features: &[u8]) -> Result<ForwardState> {
        if features.len() != self.topology.input_size {
            return Err(Error::ShapeMismatch {
                op: "forward",
                left: (1, features.len()),
                right: (1, self.topology.input_size),
            });
        }

        let a1 = Matrix::row(features.iter().map(|&p| p as f64 / PIXEL_MAX).collect()).with_bias()?;

        let z2 = a1.matmul(&self.weights.w1)?;
        let a2 = self.topology.hidden.apply(&z2);
        let a2_with_bias = a2.with_bias()?;

        let z3 = a2_with_bias.matmul(&self.weights.w2)?;
        let a3 = self.topology.output.apply(&z3);

        Ok(ForwardState { a1, z2, a2_with_bias, z3, a3 })
    }

    /// Eval-mode forward pass: the predicted digit.
    pub fn predict(&self, features: &[u8]) -> Result<usize> {
        Ok(self.forward(features)?.prediction())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use rand::{rngs::StdRng, SeedableRng};

    fn small_topology(hidden: usize) -> Topology {
        Topology::new(hidden, ActivationFunction::Tanh, ActivationFunction::Softmax).unwrap()
    }

    #[test]
    fn forward_shapes_follow_topology() {
        let mut rng = StdRng::seed_from_u64(11);
        let net = Network::new(small_topology(4), &mut rng).unwrap();
        let state = net.forward(&[0u8; 784]).unwrap();
        assert_eq!(state.a1.shape(), (1, 785));
        assert_eq!(state.z2.shape(), (1, 4));
        assert_eq!(state.a2_with_bias.shape(), (1, 5));
        assert_eq!(state.z3.shape(), (1, 10));
        assert_eq!(state.a3.shape(), (1, 10));
        assert_eq!(state.a1.get(0, 784), 1.0);
        assert_eq!(state.a2_with_bias.get(0, 4), 1.0);
    }

    #[test]
    fn forward_rejects_short_feature_vector() {
        let mut rng = StdRng::seed_from_u64(12);
        let net = Network::new(small_topology(4), &mut rng).unwrap();
        assert!(matches!(net.forward(&[0u8; 783]), Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn loaded_hidden_width_overrides_configuration() {
        let mut rng = StdRng::seed_from_u64(13);
        let weights = Weights::initialize(784, 7, 10, &mut rng);
        let net = Network::from_weights(Topology::default(), weights).unwrap();
        assert_eq!(net.topology.hidden_nodes, 7);
    }

    #[test]
    fn loaded_weights_with_wrong_input_size_are_rejected() {
        let mut rng = StdRng::seed_from_u64(14);
        let weights = Weights::initialize(100, 7, 10, &mut rng);
        assert!(Network::from_weights(Topology::default(), weights).is_err());
    }

    #[test]
    fn predict_picks_the_strongest_output() {
        let mut w2 = Matrix::zeros(3, 10);
        w2.set(2, 6, 5.0);
        let weights = Weights::from_matrices(Matrix::zeros(785, 2), w2).unwrap();
        let net = Network::from_weights(small_topology(2), weights).unwrap();
        assert_eq!(net.predict(&[17u8; 784]).unwrap(), 6);
    }
}
