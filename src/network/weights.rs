use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// The two trainable matrices of the network.
///
/// - `w1` — input-to-hidden, shape `(input + 1, hidden)`; the last row holds
///   the hidden-layer bias weights.
/// - `w2` — hidden-to-output, shape `(hidden + 1, output)`; the last row holds
///   the output-layer bias weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Weights {
    pub w1: Matrix,
    pub w2: Matrix,
}

impl Weights {
    /// Fresh small-magnitude weights.
    ///
    /// Entries are drawn from U[-0.5, 0.5] and scaled by
    /// `0.01 / sqrt(input + 1)` for `w1` and `0.01 / sqrt(hidden)` for `w2`,
    /// which keeps the first hidden-layer sums well inside the linear range of
    /// tanh/sigmoid.
    pub fn initialize<R: Rng + ?Sized>(
        input_size: usize,
        hidden_nodes: usize,
        output_size: usize,
        rng: &mut R,
    ) -> Weights {
        let init_factor_1 = 0.01 / ((input_size + 1) as f64).sqrt();
        let init_factor_2 = 0.01 / (hidden_nodes as f64).sqrt();

        let w1 = Matrix::random_centered(input_size + 1, hidden_nodes, rng).scale(init_factor_1);
        let w2 = Matrix::random_centered(hidden_nodes + 1, output_size, rng).scale(init_factor_2);

        Weights { w1, w2 }
    }

    /// Builds a weight pair from explicit matrices, checking that they chain:
    /// `w2` must have one row per hidden node plus the bias row.
    pub fn from_matrices(w1: Matrix, w2: Matrix) -> Result<Weights> {
        if w1.rows < 2 || w1.cols == 0 || w2.rows != w1.cols + 1 || w2.cols == 0 {
            return Err(Error::ShapeMismatch {
                op: "weights",
                left: w1.shape(),
                right: w2.shape(),
            });
        }
        Ok(Weights { w1, w2 })
    }

    pub fn input_size(&self) -> usize {
        self.w1.rows - 1
    }

    pub fn hidden_nodes(&self) -> usize {
        self.w1.cols
    }

    pub fn output_size(&self) -> usize {
        self.w2.cols
    }

    /// Serializes both matrices as JSON (`{rows, cols, values}` per matrix,
    /// values row-major).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&WeightsRecord::from(self))?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Weights> {
        let record: WeightsRecord = serde_json::from_slice(bytes)?;
        record.into_weights()
    }
}

// ---------------------------------------------------------------------------
// On-disk format
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct MatrixRecord {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct WeightsRecord {
    w1: MatrixRecord,
    w2: MatrixRecord,
}

impl From<&Matrix> for MatrixRecord {
    fn from(m: &Matrix) -> Self {
        MatrixRecord { rows: m.rows, cols: m.cols, values: m.as_slice().to_vec() }
    }
}

impl From<&Weights> for WeightsRecord {
    fn from(w: &Weights) -> Self {
        WeightsRecord { w1: (&w.w1).into(), w2: (&w.w2).into() }
    }
}

impl WeightsRecord {
    fn into_weights(self) -> Result<Weights> {
        let w1 = Matrix::from_vec(self.w1.rows, self.w1.cols, self.w1.values)?;
        let w2 = Matrix::from_vec(self.w2.rows, self.w2.cols, self.w2.values)?;
        Weights::from_matrices(w1, w2)
    }
}

// ---------------------------------------------------------------------------
// WeightStore
// ---------------------------------------------------------------------------

/// File-backed home of the trained weights.
#[derive(Debug, Clone)]
pub struct WeightStore {
    path: PathBuf,
}

impl WeightStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> WeightStore {
        WeightStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the weights as pretty-printed JSON, creating parent directories
    /// as needed.
    pub fn persist(&self, weights: &Weights) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let file = File::create(&self.path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &WeightsRecord::from(weights))?;
        log::info!("weights saved to {}", self.path.display());
        Ok(())
    }

    /// Reads weights previously written by [`WeightStore::persist`].
    ///
    /// Any failure (missing file, bad JSON, inconsistent shapes) is reported
    /// as `Error::WeightLoad`.
    pub fn load(&self) -> Result<Weights> {
        let fail = |reason: String| Error::WeightLoad { path: self.path.clone(), reason };

        let file = File::open(&self.path).map_err(|e| fail(e.to_string()))?;
        let reader = BufReader::new(file);
        let record: WeightsRecord =
            serde_json::from_reader(reader).map_err(|e| fail(e.to_string()))?;
        record.into_weights().map_err(|e| fail(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn initialize_has_bias_rows_and_scaled_entries() {
        let mut rng = StdRng::seed_from_u64(1);
        let w = Weights::initialize(784, 300, 10, &mut rng);
        assert_eq!(w.w1.shape(), (785, 300));
        assert_eq!(w.w2.shape(), (301, 10));

        let bound1 = 0.5 * 0.01 / 785f64.sqrt();
        let bound2 = 0.5 * 0.01 / 300f64.sqrt();
        assert!(w.w1.as_slice().iter().all(|x| x.abs() <= bound1));
        assert!(w.w2.as_slice().iter().all(|x| x.abs() <= bound2));
        assert!(w.w1.as_slice().iter().any(|&x| x != 0.0));
    }

    #[test]
    fn bytes_round_trip_exactly() {
        let mut rng = StdRng::seed_from_u64(2);
        let w = Weights::initialize(6, 3, 2, &mut rng);
        let back = Weights::from_bytes(&w.to_bytes().unwrap()).unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn from_matrices_rejects_unchained_shapes() {
        let err = Weights::from_matrices(Matrix::zeros(785, 4), Matrix::zeros(4, 10));
        assert!(matches!(err, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn load_of_missing_file_is_weight_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = WeightStore::new(dir.path().join("absent.json"));
        assert!(matches!(store.load(), Err(Error::WeightLoad { .. })));
    }

    #[test]
    fn load_of_malformed_file_is_weight_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, b"{\"w1\": {\"rows\": 2, \"cols\": 2, \"values\": [1.0]}}").unwrap();
        assert!(matches!(WeightStore::new(&path).load(), Err(Error::WeightLoad { .. })));
    }

    #[test]
    fn persist_then_load_returns_same_weights() {
        let dir = tempfile::tempdir().unwrap();
        let store = WeightStore::new(dir.path().join("nested").join("weights.json"));
        let mut rng = StdRng::seed_from_u64(3);
        let w = Weights::initialize(784, 5, 10, &mut rng);
        store.persist(&w).unwrap();
        assert_eq!(store.load().unwrap(), w);
    }
}
