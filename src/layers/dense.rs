use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::error::Result;
use crate::math::Matrix;

/// One fully-connected layer: `weights (size × input_size)`,
/// `biases (size × 1)`, and the activation applied to `z = W·a + b`.
///
/// The layer retains its most recent activation column (`neurons`) because
/// the backward pass needs every intermediate activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub weights: Matrix,
    pub biases: Matrix,
    pub activation: Activation,
    neurons: Matrix,
}

impl Layer {
    pub fn new<R: Rng>(size: usize, input_size: usize, activation: Activation, rng: &mut R) -> Layer {
        Layer {
            weights: Matrix::random(size, input_size, rng),
            biases: Matrix::random(size, 1, rng),
            activation,
            neurons: Matrix::zeros(size, 1),
        }
    }

    /// Rebuilds a layer from persisted parameters. Shape consistency is the
    /// caller's responsibility (the persistence loader validates it).
    pub fn from_parts(weights: Matrix, biases: Matrix, activation: Activation) -> Layer {
        let size = weights.rows;
        Layer {
            weights,
            biases,
            activation,
            neurons: Matrix::zeros(size, 1),
        }
    }

    /// Number of inputs this layer consumes.
    pub fn input_size(&self) -> usize {
        self.weights.cols
    }

    /// Number of neurons in this layer.
    pub fn size(&self) -> usize {
        self.weights.rows
    }

    /// Computes `a = f(W·input + b)`, stores it, and returns a copy.
    pub fn feed(&mut self, input: &Matrix) -> Result<Matrix> {
        let activation = self.activation;
        let mut z = Matrix::multiply(&self.weights, input)?;
        z.add_assign_matrix(&self.biases)?;
        z.map_assign(|x| activation.apply(x));
        self.neurons = z.clone();
        Ok(z)
    }

    /// The activation column retained by the last [`Layer::feed`] call.
    pub fn neurons(&self) -> &Matrix {
        &self.neurons
    }
}
