use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Dense 2D matrix of `f64`, the only numeric container the network needs.
///
/// Shape is fixed at construction; elements are freely mutable. Operations
/// that combine two matrices check shapes and report
/// [`Error::DimensionMismatch`] instead of panicking or returning garbage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    /// Zero-filled matrix. Degenerate shapes are a caller bug.
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        assert!(rows > 0 && cols > 0, "matrix dimensions must be positive");
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        assert!(!data.is_empty() && !data[0].is_empty(), "matrix data must be non-empty");
        let cols = data[0].len();
        assert!(data.iter().all(|row| row.len() == cols), "matrix rows must have equal length");
        Matrix {
            rows: data.len(),
            cols,
            data,
        }
    }

    /// Builds an `(n, 1)` column vector from a slice — the canonical way to
    /// turn a feature vector into a matrix operand.
    pub fn from_column(values: &[f64]) -> Matrix {
        assert!(!values.is_empty(), "column vector must be non-empty");
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values.iter().map(|&v| vec![v]).collect(),
        }
    }

    /// Flattens a row or column vector back into a `Vec<f64>`.
    ///
    /// Fails when neither dimension is 1; collapsing a genuinely 2D matrix
    /// along an arbitrary axis is never meaningful to a caller.
    pub fn to_vector(&self) -> Result<Vec<f64>> {
        if self.cols == 1 {
            Ok(self.data.iter().map(|row| row[0]).collect())
        } else if self.rows == 1 {
            Ok(self.data[0].clone())
        } else {
            Err(Error::DimensionMismatch {
                op: "to_vector",
                left_rows: self.rows,
                left_cols: self.cols,
                right_rows: 1,
                right_cols: 1,
            })
        }
    }

    pub fn random<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        res.randomize(rng);
        res
    }

    /// Fills every element with an independent uniform draw from `[-1, 1)`.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        for row in &mut self.data {
            for value in row {
                *value = rng.gen::<f64>() * 2.0 - 1.0;
            }
        }
    }

    /// Elementwise `self += other`; shapes must match.
    pub fn add_assign_matrix(&mut self, other: &Matrix) -> Result<()> {
        self.check_same_shape("add", other)?;
        for (row, other_row) in self.data.iter_mut().zip(&other.data) {
            for (value, &n) in row.iter_mut().zip(other_row) {
                *value += n;
            }
        }
        Ok(())
    }

    /// Adds a constant to every element.
    pub fn add_assign_scalar(&mut self, n: f64) {
        for row in &mut self.data {
            for value in row {
                *value += n;
            }
        }
    }

    /// Elementwise `a - b` as a new matrix; shapes must match.
    pub fn subtract(a: &Matrix, b: &Matrix) -> Result<Matrix> {
        a.check_same_shape("subtract", b)?;
        let mut res = Matrix::zeros(a.rows, a.cols);
        for i in 0..a.rows {
            for j in 0..a.cols {
                res.data[i][j] = a.data[i][j] - b.data[i][j];
            }
        }
        Ok(res)
    }

    /// Elementwise (Hadamard) product, `self ⊙= other`; shapes must match.
    pub fn hadamard_assign(&mut self, other: &Matrix) -> Result<()> {
        self.check_same_shape("hadamard", other)?;
        for (row, other_row) in self.data.iter_mut().zip(&other.data) {
            for (value, &n) in row.iter_mut().zip(other_row) {
                *value *= n;
            }
        }
        Ok(())
    }

    /// Multiplies every element by a constant.
    pub fn scale(&mut self, n: f64) {
        for row in &mut self.data {
            for value in row {
                *value *= n;
            }
        }
    }

    /// Standard linear-algebra product; requires `a.cols == b.rows` and
    /// yields an `(a.rows, b.cols)` matrix.
    pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix> {
        if a.cols != b.rows {
            return Err(Error::DimensionMismatch {
                op: "multiply",
                left_rows: a.rows,
                left_cols: a.cols,
                right_rows: b.rows,
                right_cols: b.cols,
            });
        }

        let mut res = Matrix::zeros(a.rows, b.cols);
        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;
                for k in 0..a.cols {
                    sum += a.data[i][k] * b.data[k][j];
                }
                res.data[i][j] = sum;
            }
        }
        Ok(res)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);
        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }
        res
    }

    /// Applies `f` elementwise into a new matrix of the same shape.
    pub fn map<F>(&self, f: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(|&x| f(x)).collect())
                .collect(),
        }
    }

    /// Applies `f` elementwise in place.
    pub fn map_assign<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64,
    {
        for row in &mut self.data {
            for value in row {
                *value = f(*value);
            }
        }
    }

    /// Renders the matrix in the persistence text format: a `rows cols`
    /// header line followed by `rows` lines of `cols` values.
    pub fn to_text(&self) -> String {
        let mut out = format!("{} {}\n", self.rows, self.cols);
        for row in &self.data {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        out
    }

    /// Parses the text format written by [`Matrix::to_text`].
    ///
    /// The token count must agree exactly with the declared shape; short
    /// files, trailing junk, and unparseable numbers all fail. The declared
    /// shape is checked against the body before anything is allocated, so a
    /// tiny file claiming a huge matrix fails cleanly instead of exhausting
    /// memory.
    pub fn from_text(text: &str) -> Result<Matrix> {
        let tokens: Vec<&str> = text.split_whitespace().collect();

        let rows = parse_dimension(tokens.first().copied(), "rows")?;
        let cols = parse_dimension(tokens.get(1).copied(), "cols")?;
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            Error::Format(format!("declared shape {rows}x{cols} overflows"))
        })?;

        let values = &tokens[2..];
        if values.len() != expected {
            return Err(Error::Format(format!(
                "expected {expected} values for a {rows}x{cols} matrix, found {}",
                values.len()
            )));
        }

        let mut data = vec![vec![0.0; cols]; rows];
        for (index, token) in values.iter().enumerate() {
            data[index / cols][index % cols] = token
                .parse::<f64>()
                .map_err(|_| Error::Format(format!("invalid value token {token:?}")))?;
        }

        Ok(Matrix { rows, cols, data })
    }

    /// True when the stored `data` dimensions agree with the declared
    /// `rows`/`cols`. Decoded snapshots can lie about either.
    pub(crate) fn shape_is_consistent(&self) -> bool {
        self.rows > 0
            && self.cols > 0
            && self.data.len() == self.rows
            && self.data.iter().all(|row| row.len() == self.cols)
    }

    fn check_same_shape(&self, op: &'static str, other: &Matrix) -> Result<()> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(Error::DimensionMismatch {
                op,
                left_rows: self.rows,
                left_cols: self.cols,
                right_rows: other.rows,
                right_cols: other.cols,
            });
        }
        Ok(())
    }
}

fn parse_dimension(token: Option<&str>, name: &str) -> Result<usize> {
    let token = token.ok_or_else(|| Error::Format(format!("missing {name} in header")))?;
    let value = token
        .parse::<usize>()
        .map_err(|_| Error::Format(format!("invalid {name} token {token:?}")))?;
    if value == 0 {
        return Err(Error::Format(format!("{name} must be positive")));
    }
    Ok(value)
}
