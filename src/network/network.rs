use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::error::{Error, Result};
use crate::layers::Layer;
use crate::loss::MseLoss;
use crate::math::Matrix;

/// Multilayer feedforward network trained by single-example gradient
/// descent with a fixed learning rate.
///
/// There is no train/infer mode split: the network has exactly one state,
/// constructed and ready, and every training step mutates the parameters in
/// place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
    pub learning_rate: f64,
}

impl Network {
    /// Random-initialized network using the sigmoid activation everywhere.
    pub fn new<R: Rng>(
        input_size: usize,
        hidden_sizes: &[usize],
        output_size: usize,
        learning_rate: f64,
        rng: &mut R,
    ) -> Result<Network> {
        let activations = vec![Activation::Sigmoid; hidden_sizes.len() + 1];
        Network::with_activations(
            input_size,
            hidden_sizes,
            output_size,
            learning_rate,
            &activations,
            rng,
        )
    }

    /// Random-initialized network with one activation per layer, ordered
    /// hidden layers first, output layer last.
    ///
    /// Fails with [`Error::Configuration`] when the activation count does
    /// not equal `hidden_sizes.len() + 1`; no partially initialized network
    /// ever exists.
    pub fn with_activations<R: Rng>(
        input_size: usize,
        hidden_sizes: &[usize],
        output_size: usize,
        learning_rate: f64,
        activations: &[Activation],
        rng: &mut R,
    ) -> Result<Network> {
        let expected = hidden_sizes.len() + 1;
        if activations.len() != expected {
            return Err(Error::Configuration(format!(
                "expected {expected} activation functions (one per hidden layer plus output), got {}",
                activations.len()
            )));
        }
        if input_size == 0
            || output_size == 0
            || hidden_sizes.iter().any(|&s| s == 0)
        {
            return Err(Error::Configuration(
                "layer sizes must all be positive".to_string(),
            ));
        }

        let mut sizes = Vec::with_capacity(hidden_sizes.len() + 2);
        sizes.push(input_size);
        sizes.extend_from_slice(hidden_sizes);
        sizes.push(output_size);

        let layers = sizes
            .windows(2)
            .zip(activations)
            .map(|(pair, &activation)| Layer::new(pair[1], pair[0], activation, rng))
            .collect();

        Ok(Network {
            layers,
            learning_rate,
        })
    }

    /// Rebuilds a network from already-validated layers (persistence path).
    pub(crate) fn from_layers(layers: Vec<Layer>, learning_rate: f64) -> Network {
        Network {
            layers,
            learning_rate,
        }
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].size()
    }

    /// Forward pass: `a[i+1] = f_i(W_i·a[i] + b_i)` through every layer.
    ///
    /// Each layer retains its activation column, so a following backward
    /// pass can reuse the intermediates.
    pub fn feed_forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        let mut a = self.input_column(input)?;
        for layer in &mut self.layers {
            a = layer.feed(&a)?;
        }
        a.to_vector()
    }

    /// Single-example training step: forward pass, then backpropagation
    /// updating every layer's weights and biases in place.
    ///
    /// Returns the example's mean squared error, measured before the
    /// update. The step is atomic — once it returns, every layer has been
    /// updated.
    pub fn train(&mut self, input: &[f64], target: &[f64]) -> Result<f64> {
        let input_column = self.input_column(input)?;
        if target.len() != self.output_size() {
            return Err(Error::DimensionMismatch {
                op: "train",
                left_rows: target.len(),
                left_cols: 1,
                right_rows: self.output_size(),
                right_cols: 1,
            });
        }

        // Forward, retaining per-layer activations in the layers.
        let mut a = input_column.clone();
        for layer in &mut self.layers {
            a = layer.feed(&a)?;
        }

        let target_column = Matrix::from_column(target);
        let mut error = Matrix::subtract(&target_column, &a)?;
        let loss = MseLoss::loss(&a.to_vector()?, target);

        for i in (0..self.layers.len()).rev() {
            let activation = self.layers[i].activation;

            // G = f'(a) ⊙ E × lr, with the derivative evaluated on the
            // activated value.
            let mut gradient = self.layers[i]
                .neurons()
                .map(|v| activation.derivative_from_output(v));
            gradient.hadamard_assign(&error)?;
            gradient.scale(self.learning_rate);

            let upstream = if i == 0 {
                input_column.clone()
            } else {
                self.layers[i - 1].neurons().clone()
            };

            // Snapshot the transpose before the update below mutates the
            // weights; the error must propagate through pre-update weights.
            let weights_t = self.layers[i].weights.transpose();

            let weight_deltas = Matrix::multiply(&gradient, &upstream.transpose())?;
            self.layers[i].weights.add_assign_matrix(&weight_deltas)?;
            self.layers[i].biases.add_assign_matrix(&gradient)?;

            if i > 0 {
                error = Matrix::multiply(&weights_t, &error)?;
            }
        }

        Ok(loss)
    }

    fn input_column(&self, input: &[f64]) -> Result<Matrix> {
        if input.len() != self.input_size() {
            return Err(Error::DimensionMismatch {
                op: "input",
                left_rows: input.len(),
                left_cols: 1,
                right_rows: self.input_size(),
                right_cols: 1,
            });
        }
        Ok(Matrix::from_column(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn output_length_matches_output_size() {
        let mut rng = StdRng::seed_from_u64(1);
        for &(input, output) in &[(2usize, 1usize), (3, 2), (5, 5)] {
            let mut network = Network::new(input, &[4, 3], output, 0.1, &mut rng).unwrap();
            let sample = vec![0.25; input];
            assert_eq!(network.feed_forward(&sample).unwrap().len(), output);
        }
    }

    #[test]
    fn activation_count_mismatch_is_a_configuration_error() {
        let mut rng = StdRng::seed_from_u64(2);
        let result = Network::with_activations(
            2,
            &[4],
            1,
            0.1,
            &[Activation::Sigmoid], // needs 2: one hidden + output
            &mut rng,
        );
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn zero_layer_sizes_are_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            Network::new(2, &[0], 1, 0.1, &mut rng),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            Network::new(0, &[4], 1, 0.1, &mut rng),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn wrong_input_length_is_a_dimension_mismatch() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut network = Network::new(2, &[3], 1, 0.1, &mut rng).unwrap();
        assert!(matches!(
            network.feed_forward(&[1.0, 2.0, 3.0]),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(matches!(
            network.train(&[1.0], &[0.5]),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(matches!(
            network.train(&[1.0, 0.0], &[0.5, 0.5]),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn layer_shapes_follow_the_size_chain() {
        let mut rng = StdRng::seed_from_u64(5);
        let network = Network::new(3, &[5, 4], 2, 0.1, &mut rng).unwrap();
        let shapes: Vec<(usize, usize)> = network
            .layers
            .iter()
            .map(|l| (l.weights.rows, l.weights.cols))
            .collect();
        assert_eq!(shapes, vec![(5, 3), (4, 5), (2, 4)]);
        assert!(network.layers.iter().all(|l| l.biases.cols == 1));
        assert_eq!(network.input_size(), 3);
        assert_eq!(network.output_size(), 2);
    }

    #[test]
    fn a_training_step_reduces_error_on_the_same_example() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut network = Network::new(2, &[4], 1, 0.5, &mut rng).unwrap();

        let input = [1.0, 0.0];
        let target = [1.0];

        let before = network.train(&input, &target).unwrap();
        for _ in 0..50 {
            network.train(&input, &target).unwrap();
        }
        let after = network.train(&input, &target).unwrap();
        assert!(after < before, "loss should shrink: before={before}, after={after}");
    }

    #[test]
    fn per_layer_activations_are_honored() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut network = Network::with_activations(
            2,
            &[3],
            1,
            0.1,
            &[Activation::Tanh, Activation::Identity],
            &mut rng,
        )
        .unwrap();

        // Identity output can leave [0, 1]; sigmoid never could.
        let out = network.feed_forward(&[5.0, -5.0]).unwrap();
        assert_eq!(out.len(), 1);
        assert!(network.layers[0].neurons().data.iter().flatten().all(|&v| (-1.0..=1.0).contains(&v)));
    }

    #[test]
    fn training_step_returns_the_pre_update_mse() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut network = Network::new(2, &[2], 1, 0.0, &mut rng).unwrap();

        // With lr = 0 the step must not move the parameters.
        let out_before = network.feed_forward(&[0.3, 0.7]).unwrap();
        let loss = network.train(&[0.3, 0.7], &[1.0]).unwrap();
        let out_after = network.feed_forward(&[0.3, 0.7]).unwrap();

        assert_relative_eq!(out_before[0], out_after[0], epsilon = 1e-12);
        assert_relative_eq!(loss, (out_before[0] - 1.0).powi(2), epsilon = 1e-12);
    }
}
