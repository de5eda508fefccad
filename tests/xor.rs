use ember_nn::{Dataset, Network, Trainer};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// End-to-end backpropagation check: a small sigmoid network must learn XOR
/// from repeated single-example steps.
#[test]
fn xor_training_drives_the_error_down() {
    let mut rng = StdRng::seed_from_u64(0xE3B0);
    let mut network = Network::new(2, &[4], 1, 0.5, &mut rng).unwrap();

    let inputs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let targets = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];

    let dataset = Dataset::new(inputs.clone(), targets.clone()).unwrap();
    let trainer = Trainer::with_dataset(dataset);
    trainer.run(&mut network, 100_000, &mut rng).unwrap();

    let mean_error: f64 = inputs
        .iter()
        .zip(targets.iter())
        .map(|(input, target)| {
            let output = network.feed_forward(input).unwrap();
            (output[0] - target[0]).abs()
        })
        .sum::<f64>()
        / inputs.len() as f64;

    assert!(
        mean_error < 0.1,
        "network failed to learn XOR: mean error = {mean_error}"
    );
}
