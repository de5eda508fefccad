use ember_nn::{Dataset, Network, Trainer};

fn main() {
    env_logger::init();

    let mut rng = rand::thread_rng();
    let mut network = Network::new(2, &[4], 1, 0.5, &mut rng).expect("valid architecture");

    let inputs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let targets = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];

    let dataset = Dataset::new(inputs.clone(), targets).expect("parallel sequences");
    let trainer = Trainer::with_dataset(dataset);

    for round in 1..=10 {
        let loss = trainer
            .run(&mut network, 5000, &mut rng)
            .expect("dataset is present");
        println!("round {round}: mean loss = {loss:.6}");
    }

    for input in &inputs {
        let output = network.feed_forward(input).expect("input matches network");
        println!("{:?} -> {:.4}", input, output[0]);
    }

    // Round-trip the parameters through the text directory format.
    let dir = std::env::temp_dir().join("ember-nn-xor");
    network.save_dir(&dir).expect("save");
    let mut reloaded = Network::load_dir(&dir, 0.5).expect("load");
    let check = reloaded.feed_forward(&inputs[1]).expect("same shape");
    println!("reloaded network: {:?} -> {:.4}", inputs[1], check[0]);
}
