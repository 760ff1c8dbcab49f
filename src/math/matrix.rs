use rand::Rng;

use crate::error::{Error, Result};

/// Dense row-major matrix of `f64`.
///
/// Every binary operation checks shapes up front and returns
/// `Error::ShapeMismatch` instead of broadcasting.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix { rows, cols, data: vec![0.0; rows * cols] }
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix { rows, cols, data: vec![value; rows * cols] }
    }

    /// Samples every entry uniformly from [-0.5, 0.5).
    pub fn random_centered<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let data = (0..rows * cols).map(|_| rng.gen::<f64>() - 0.5).collect();
        Matrix { rows, cols, data }
    }

    /// Builds a matrix from row-major values; `values.len()` must equal `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, values: Vec<f64>) -> Result<Matrix> {
        if values.len() != rows * cols {
            return Err(Error::ShapeMismatch {
                op: "from_vec",
                left: (rows, cols),
                right: (1, values.len()),
            });
        }
        Ok(Matrix { rows, cols, data: values })
    }

    /// Single-row matrix holding `values`.
    pub fn row(values: Vec<f64>) -> Matrix {
        Matrix { rows: 1, cols: values.len(), data: values }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Row-major view of all entries.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "add", |a, b| a + b)
    }

    pub fn subtract(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "subtract", |a, b| a - b)
    }

    /// Element-wise (Hadamard) product.
    pub fn elementwise_multiply(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "elementwise_multiply", |a, b| a * b)
    }

    /// In-place `self -= rhs`. Used by the weight update so the large
    /// input-to-hidden matrix is not reallocated every iteration.
    pub fn subtract_assign(&mut self, rhs: &Matrix) -> Result<()> {
        self.check_same_shape(rhs, "subtract_assign")?;
        for (a, b) in self.data.iter_mut().zip(rhs.data.iter()) {
            *a -= b;
        }
        Ok(())
    }

    /// Matrix product `self · rhs`; requires `self.cols == rhs.rows`.
    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(Error::ShapeMismatch {
                op: "matmul",
                left: self.shape(),
                right: rhs.shape(),
            });
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        // i-k-j order walks both operands row-major.
        for i in 0..self.rows {
            let out = &mut res.data[i * rhs.cols..(i + 1) * rhs.cols];
            for k in 0..self.cols {
                let lhs = self.data[i * self.cols + k];
                if lhs == 0.0 {
                    continue;
                }
                let rhs_row = &rhs.data[k * rhs.cols..(k + 1) * rhs.cols];
                for (o, r) in out.iter_mut().zip(rhs_row.iter()) {
                    *o += lhs * r;
                }
            }
        }

        Ok(res)
    }

    /// Copies rows `[0, count)` into a new matrix.
    pub fn take_rows(&self, count: usize) -> Result<Matrix> {
        if count > self.rows {
            return Err(Error::ShapeMismatch {
                op: "take_rows",
                left: self.shape(),
                right: (count, self.cols),
            });
        }
        Ok(Matrix {
            rows: count,
            cols: self.cols,
            data: self.data[..count * self.cols].to_vec(),
        })
    }

    /// Extends a single row by one trailing bias entry fixed at 1.0.
    pub fn with_bias(&self) -> Result<Matrix> {
        if self.rows != 1 {
            return Err(Error::ShapeMismatch {
                op: "with_bias",
                left: self.shape(),
                right: (1, self.cols),
            });
        }
        let mut data = Vec::with_capacity(self.cols + 1);
        data.extend_from_slice(&self.data);
        data.push(1.0);
        Ok(Matrix::row(data))
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    pub fn sum_abs(&self) -> f64 {
        self.data.iter().map(|x| x.abs()).sum()
    }

    /// Index of the largest entry in row-major order; the first maximum wins
    /// on ties. Returns 0 for an empty matrix.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &x) in self.data.iter().enumerate() {
            if x > self.data[best] {
                best = i;
            }
        }
        best
    }

    fn check_same_shape(&self, rhs: &Matrix, op: &'static str) -> Result<()> {
        if self.shape() != rhs.shape() {
            return Err(Error::ShapeMismatch { op, left: self.shape(), right: rhs.shape() });
        }
        Ok(())
    }

    fn zip_with<F>(&self, rhs: &Matrix, op: &'static str, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_same_shape(rhs, op)?;
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(rhs.data.iter()).map(|(&a, &b)| f(a, b)).collect(),
        })
    }
}
