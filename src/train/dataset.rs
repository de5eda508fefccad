use crate::error::{Error, Result};

/// Parallel input/target sequences; read-only once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Vec<Vec<f64>>,
    targets: Vec<Vec<f64>>,
}

impl Dataset {
    /// Pairs inputs with targets. The two sequences must have equal length.
    pub fn new(inputs: Vec<Vec<f64>>, targets: Vec<Vec<f64>>) -> Result<Dataset> {
        if inputs.len() != targets.len() {
            return Err(Error::Configuration(format!(
                "dataset has {} inputs but {} targets",
                inputs.len(),
                targets.len()
            )));
        }
        Ok(Dataset { inputs, targets })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// The `(input, target)` pair at `index`.
    pub fn example(&self, index: usize) -> (&[f64], &[f64]) {
        (&self.inputs[index], &self.targets[index])
    }
}
