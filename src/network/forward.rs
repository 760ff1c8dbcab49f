use crate::math::matrix::Matrix;

/// Everything backprop needs from one forward pass over one observation.
///
/// Shapes for a network with `H` hidden nodes:
/// - `a1`           — 1×785, scaled pixels plus the bias entry
/// - `z2`           — 1×H, hidden pre-activations
/// - `a2_with_bias` — 1×(H+1), hidden activations plus the bias entry
/// - `z3`           — 1×10, output pre-activations
/// - `a3`           — 1×10, output probabilities
#[derive(Debug, Clone)]
pub struct ForwardState {
    pub a1: Matrix,
    pub z2: Matrix,
    pub a2_with_bias: Matrix,
    pub z3: Matrix,
    pub a3: Matrix,
}

impl ForwardState {
    /// Predicted class: index of the largest output probability, first index
    /// on ties.
    pub fn prediction(&self) -> usize {
        self.a3.argmax()
    }
}
