use log::debug;
use rand::Rng;

use crate::error::{Error, Result};
use crate::network::Network;
use crate::train::dataset::Dataset;

const PROGRESS_EVERY: usize = 1000;

/// Drives a network through a fixed number of single-example training
/// steps, each drawing one example uniformly at random (with replacement)
/// from the dataset. No convergence criterion, no early stopping.
#[derive(Debug, Default)]
pub struct Trainer {
    dataset: Option<Dataset>,
}

impl Trainer {
    pub fn new() -> Trainer {
        Trainer { dataset: None }
    }

    pub fn with_dataset(dataset: Dataset) -> Trainer {
        Trainer {
            dataset: Some(dataset),
        }
    }

    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(dataset);
    }

    /// Runs `steps` training steps and returns the mean per-step loss.
    ///
    /// Fails with [`Error::NoTrainingData`] when no dataset was supplied or
    /// the dataset is empty. Each step is atomic: it either completes the
    /// full forward/backward/update sequence or surfaces the error that
    /// interrupted it.
    pub fn run<R: Rng>(&self, network: &mut Network, steps: usize, rng: &mut R) -> Result<f64> {
        let dataset = match &self.dataset {
            Some(d) if !d.is_empty() => d,
            _ => return Err(Error::NoTrainingData),
        };

        let mut total_loss = 0.0;
        for step in 1..=steps {
            let (input, target) = dataset.example(rng.gen_range(0..dataset.len()));
            total_loss += network.train(input, target)?;

            if step % PROGRESS_EVERY == 0 {
                debug!(
                    "step {step}/{steps}: running mean loss = {:.6}",
                    total_loss / step as f64
                );
            }
        }

        if steps == 0 {
            Ok(0.0)
        } else {
            Ok(total_loss / steps as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn xor_dataset() -> Dataset {
        Dataset::new(
            vec![
                vec![0.0, 0.0],
                vec![0.0, 1.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
            ],
            vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]],
        )
        .unwrap()
    }

    #[test]
    fn missing_dataset_is_reported() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut network = Network::new(2, &[4], 1, 0.1, &mut rng).unwrap();
        let trainer = Trainer::new();
        assert!(matches!(
            trainer.run(&mut network, 10, &mut rng),
            Err(Error::NoTrainingData)
        ));
    }

    #[test]
    fn empty_dataset_is_reported() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut network = Network::new(2, &[4], 1, 0.1, &mut rng).unwrap();
        let trainer = Trainer::with_dataset(Dataset::new(vec![], vec![]).unwrap());
        assert!(matches!(
            trainer.run(&mut network, 10, &mut rng),
            Err(Error::NoTrainingData)
        ));
    }

    #[test]
    fn running_lowers_the_mean_loss() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut network = Network::new(2, &[4], 1, 0.5, &mut rng).unwrap();
        let trainer = Trainer::with_dataset(xor_dataset());

        let early = trainer.run(&mut network, 500, &mut rng).unwrap();
        let late = trainer.run(&mut network, 5000, &mut rng).unwrap();
        assert!(late < early, "mean loss should fall: early={early}, late={late}");
    }

    #[test]
    fn zero_steps_touch_nothing() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut network = Network::new(2, &[4], 1, 0.5, &mut rng).unwrap();
        let trainer = Trainer::with_dataset(xor_dataset());

        let snapshot = network.clone();
        let loss = trainer.run(&mut network, 0, &mut rng).unwrap();
        assert_eq!(loss, 0.0);
        for (a, b) in network.layers.iter().zip(snapshot.layers.iter()) {
            assert_eq!(a.weights, b.weights);
            assert_eq!(a.biases, b.biases);
        }
    }
}
