use std::fs;
use std::path::Path;

use log::info;

use crate::activation::Activation;
use crate::error::{Error, Result};
use crate::layers::Layer;
use crate::math::Matrix;
use crate::network::Network;

// Index-encoded file names. Loading constructs each expected path directly
// and never depends on directory-listing order.
fn weights_file(index: usize) -> String {
    format!("weights{index}.txt")
}

fn biases_file(index: usize) -> String {
    format!("biases{index}.txt")
}

impl Network {
    /// Writes one `weights{i}.txt` and one `biases{i}.txt` per layer into
    /// `directory` (created if absent), in the matrix text format.
    pub fn save_dir<P: AsRef<Path>>(&self, directory: P) -> Result<()> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory)?;

        for (i, layer) in self.layers.iter().enumerate() {
            fs::write(directory.join(weights_file(i)), layer.weights.to_text())?;
            fs::write(directory.join(biases_file(i)), layer.biases.to_text())?;
        }

        info!(
            "saved {} layers to {}",
            self.layers.len(),
            directory.display()
        );
        Ok(())
    }

    /// Reloads a network persisted by [`Network::save_dir`].
    ///
    /// Layer count comes from the contiguous run of `weights{i}.txt` files
    /// starting at index 0. The text format stores parameters only, so
    /// every layer gets the default sigmoid activation and the learning
    /// rate is supplied by the caller.
    ///
    /// Fails with [`Error::Persistence`] when no layer files exist, when a
    /// weights file lacks its biases counterpart (or the reverse), when the
    /// indices are non-contiguous, or when the stored shapes are not
    /// internally consistent.
    pub fn load_dir<P: AsRef<Path>>(directory: P, learning_rate: f64) -> Result<Network> {
        let directory = directory.as_ref();

        let mut layers: Vec<Layer> = Vec::new();
        loop {
            let i = layers.len();
            let weights_path = directory.join(weights_file(i));
            let biases_path = directory.join(biases_file(i));

            match (weights_path.exists(), biases_path.exists()) {
                (false, false) => break,
                (true, true) => {}
                (true, false) => {
                    return Err(Error::Persistence(format!(
                        "layer {i} has weights but no biases file"
                    )))
                }
                (false, true) => {
                    return Err(Error::Persistence(format!(
                        "layer {i} has biases but no weights file"
                    )))
                }
            }

            let weights = read_matrix(&weights_path)?;
            let biases = read_matrix(&biases_path)?;

            if biases.cols != 1 {
                return Err(Error::Persistence(format!(
                    "layer {i} biases must be a column vector, got {}x{}",
                    biases.rows, biases.cols
                )));
            }
            if biases.rows != weights.rows {
                return Err(Error::Persistence(format!(
                    "layer {i} bias rows ({}) do not match weight rows ({})",
                    biases.rows, weights.rows
                )));
            }
            if let Some(previous) = layers.last() {
                if weights.cols != previous.size() {
                    return Err(Error::Persistence(format!(
                        "layer {i} expects {} inputs but layer {} has {} neurons",
                        weights.cols,
                        i - 1,
                        previous.size()
                    )));
                }
            }

            layers.push(Layer::from_parts(weights, biases, Activation::default()));
        }

        if layers.is_empty() {
            return Err(Error::Persistence(format!(
                "no layer files found in {}",
                directory.display()
            )));
        }

        // Stray files above the contiguous run mean a corrupt save.
        let (stored_weights, stored_biases) = count_layer_files(directory)?;
        if stored_weights != layers.len() || stored_biases != layers.len() {
            return Err(Error::Persistence(format!(
                "found {stored_weights} weights and {stored_biases} biases files but only indices 0..{} are contiguous",
                layers.len()
            )));
        }

        info!(
            "loaded {} layers from {}",
            layers.len(),
            directory.display()
        );
        Ok(Network::from_layers(layers, learning_rate))
    }

    /// Serializes the whole network (parameters, activations, learning
    /// rate) to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file written by
    /// [`Network::save_json`].
    ///
    /// Decoded snapshots are untrusted: the structure is validated the same
    /// way `load_dir` validates its files, so a hand-edited or truncated
    /// snapshot fails with [`Error::Persistence`] instead of corrupting a
    /// later forward pass.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Network> {
        let file = fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let network: Network = serde_json::from_reader(reader)?;
        validate_layers(&network.layers)?;
        Ok(network)
    }
}

/// Structural checks for a decoded layer stack: non-empty, every matrix's
/// declared shape matching its data, biases shaped `(weights.rows, 1)`, and
/// each layer's fan-in equal to the previous layer's neuron count.
fn validate_layers(layers: &[Layer]) -> Result<()> {
    if layers.is_empty() {
        return Err(Error::Persistence("snapshot contains no layers".to_string()));
    }

    for (i, layer) in layers.iter().enumerate() {
        if !layer.weights.shape_is_consistent() {
            return Err(Error::Persistence(format!(
                "layer {i} weights declare {}x{} but the data disagrees",
                layer.weights.rows, layer.weights.cols
            )));
        }
        if !layer.biases.shape_is_consistent() {
            return Err(Error::Persistence(format!(
                "layer {i} biases declare {}x{} but the data disagrees",
                layer.biases.rows, layer.biases.cols
            )));
        }
        if layer.biases.cols != 1 || layer.biases.rows != layer.weights.rows {
            return Err(Error::Persistence(format!(
                "layer {i} biases must be {}x1, got {}x{}",
                layer.weights.rows, layer.biases.rows, layer.biases.cols
            )));
        }
        if i > 0 && layer.weights.cols != layers[i - 1].size() {
            return Err(Error::Persistence(format!(
                "layer {i} expects {} inputs but layer {} has {} neurons",
                layer.weights.cols,
                i - 1,
                layers[i - 1].size()
            )));
        }
    }
    Ok(())
}

fn read_matrix(path: &Path) -> Result<Matrix> {
    let text = fs::read_to_string(path)?;
    Matrix::from_text(&text)
        .map_err(|e| Error::Persistence(format!("{}: {e}", path.display())))
}

fn count_layer_files(directory: &Path) -> Result<(usize, usize)> {
    let mut weights = 0;
    let mut biases = 0;
    for entry in fs::read_dir(directory)? {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if name.ends_with(".txt") {
            if name.starts_with("weights") {
                weights += 1;
            } else if name.starts_with("biases") {
                biases += 1;
            }
        }
    }
    Ok((weights, biases))
}
