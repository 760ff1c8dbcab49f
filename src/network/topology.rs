use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};

/// Pixels in a 28×28 input image.
pub const IMG_AREA: usize = 784;
/// Output classes, one per digit.
pub const DIGITS_COUNT: usize = 10;
/// Hidden-layer width used when none is configured.
pub const DEFAULT_HIDDEN_NODES: usize = 300;

/// Shape and activations of the single-hidden-layer network.
///
/// Fields:
/// - `input_size`   — features per observation (784 for MNIST)
/// - `hidden_nodes` — width of the hidden layer, `H`
/// - `output_size`  — number of classes (10)
/// - `hidden`       — element-wise activation of the hidden layer
/// - `output`       — activation of the output layer; always softmax
///
/// Built through [`Topology::new`], which rejects combinations the engine
/// cannot train before any iteration runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    pub input_size: usize,
    pub hidden_nodes: usize,
    pub output_size: usize,
    pub hidden: ActivationFunction,
    pub output: ActivationFunction,
}

impl Topology {
    pub fn new(
        hidden_nodes: usize,
        hidden: ActivationFunction,
        output: ActivationFunction,
    ) -> Result<Topology> {
        let topology = Topology {
            input_size: IMG_AREA,
            hidden_nodes,
            output_size: DIGITS_COUNT,
            hidden,
            output,
        };
        topology.validate()?;
        Ok(topology)
    }

    /// Parses activation names the way the CLI passes them.
    pub fn from_names(hidden_nodes: usize, hidden: &str, output: &str) -> Result<Topology> {
        Topology::new(hidden_nodes, hidden.parse()?, output.parse()?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hidden_nodes == 0 {
            return Err(Error::Config("hidden layer needs at least one node".into()));
        }
        if self.input_size == 0 || self.output_size == 0 {
            return Err(Error::Config("input and output sizes must be non-zero".into()));
        }
        if !self.hidden.is_elementwise() {
            return Err(Error::Config(format!(
                "{} cannot be used as the hidden-layer function",
                self.hidden
            )));
        }
        if self.output != ActivationFunction::Softmax {
            return Err(Error::Config(format!(
                "output layer must use softmax, got {}",
                self.output
            )));
        }
        Ok(())
    }

    /// Same topology with a different hidden width. Used when loaded weights
    /// dictate the hidden dimension.
    pub fn with_hidden_nodes(self, hidden_nodes: usize) -> Result<Topology> {
        let topology = Topology { hidden_nodes, ..self };
        topology.validate()?;
        Ok(topology)
    }

    /// Expected shape of the input-to-hidden weights, bias row included.
    pub fn w1_shape(&self) -> (usize, usize) {
        (self.input_size + 1, self.hidden_nodes)
    }

    /// Expected shape of the hidden-to-output weights, bias row included.
    pub fn w2_shape(&self) -> (usize, usize) {
        (self.hidden_nodes + 1, self.output_size)
    }
}

impl Default for Topology {
    fn default() -> Self {
        Topology {
            input_size: IMG_AREA,
            hidden_nodes: DEFAULT_HIDDEN_NODES,
            output_size: DIGITS_COUNT,
            hidden: ActivationFunction::Tanh,
            output: ActivationFunction::Softmax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_cli_defaults() {
        let t = Topology::default();
        assert_eq!(t.hidden_nodes, 300);
        assert_eq!(t.hidden, ActivationFunction::Tanh);
        assert_eq!(t.output, ActivationFunction::Softmax);
        assert_eq!(t.w1_shape(), (785, 300));
        assert_eq!(t.w2_shape(), (301, 10));
        assert!(t.validate().is_ok());
    }

    #[test]
    fn softmax_hidden_layer_is_rejected() {
        let err = Topology::from_names(300, "softmax", "softmax").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(matches!(Topology::from_names(300, "relu", "softmax"), Err(Error::Config(_))));
        assert!(matches!(Topology::from_names(300, "tanh", "gelu"), Err(Error::Config(_))));
    }

    #[test]
    fn non_softmax_output_is_rejected() {
        assert!(Topology::from_names(300, "sigmoid", "tanh").is_err());
    }

    #[test]
    fn zero_hidden_nodes_is_rejected() {
        assert!(Topology::from_names(0, "tanh", "softmax").is_err());
    }
}
