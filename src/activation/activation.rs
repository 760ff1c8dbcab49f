use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::math::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationFunction {
    Sigmoid,
    Tanh,
    /// Vector-valued; normalizes a whole row, so it only makes sense on the
    /// output layer and has no element-wise derivative.
    Softmax,
}

impl ActivationFunction {
    /// Element-wise activation. `Softmax` is not element-wise and returns
    /// `None`; use [`ActivationFunction::apply`] for whole rows.
    pub fn function(&self, x: f64) -> Option<f64> {
        match self {
            ActivationFunction::Sigmoid => Some(sigmoid(x)),
            ActivationFunction::Tanh => Some(x.tanh()),
            ActivationFunction::Softmax => None,
        }
    }

    /// Element-wise derivative, evaluated at the pre-activation `x`.
    ///
    /// Softmax has none: the output error is taken straight from the
    /// softmax/cross-entropy identity `a3 - y` during backprop.
    pub fn derivative(&self, x: f64) -> Option<f64> {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = sigmoid(x);
                Some(fx * (1.0 - fx))
            }
            ActivationFunction::Tanh => {
                let t = x.tanh();
                Some((1.0 - t) * (1.0 + t))
            }
            ActivationFunction::Softmax => None,
        }
    }

    /// Applies the activation to a matrix. Softmax normalizes each row into a
    /// probability distribution.
    pub fn apply(&self, z: &Matrix) -> Matrix {
        match self {
            ActivationFunction::Sigmoid => z.map(sigmoid),
            ActivationFunction::Tanh => z.map(f64::tanh),
            ActivationFunction::Softmax => softmax(z),
        }
    }

    /// Element-wise derivative of a whole matrix, or `None` for softmax.
    pub fn apply_derivative(&self, z: &Matrix) -> Option<Matrix> {
        match self {
            ActivationFunction::Softmax => None,
            other => Some(z.map(|x| other.derivative(x).unwrap_or(0.0))),
        }
    }

    pub fn is_elementwise(&self) -> bool {
        !matches!(self, ActivationFunction::Softmax)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::Tanh => "tanh",
            ActivationFunction::Softmax => "softmax",
        }
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActivationFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sigmoid" => Ok(ActivationFunction::Sigmoid),
            "tanh" => Ok(ActivationFunction::Tanh),
            "softmax" => Ok(ActivationFunction::Softmax),
            other => Err(Error::Config(format!(
                "unknown activation function '{}' (expected sigmoid, tanh or softmax)",
                other
            ))),
        }
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Row-wise softmax. The row maximum is subtracted before exponentiating,
/// which leaves the result unchanged and keeps `exp` finite for large logits.
pub fn softmax(z: &Matrix) -> Matrix {
    let mut out = Matrix::zeros(z.rows, z.cols);
    for i in 0..z.rows {
        let max = (0..z.cols).map(|j| z.get(i, j)).fold(f64::NEG_INFINITY, f64::max);
        let mut sum = 0.0;
        for j in 0..z.cols {
            let e = (z.get(i, j) - max).exp();
            out.set(i, j, e);
            sum += e;
        }
        for j in 0..z.cols {
            out.set(i, j, out.get(i, j) / sum);
        }
    }
    out
}
