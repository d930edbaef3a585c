use ferrite_classify::{
    fit, telemetry, Dataset, FitConfig, LayerSpec, Method, NetworkSpec, NeuralNet,
};

fn main() -> ferrite_classify::Result<()> {
    telemetry::init_tracing();

    let spec = NetworkSpec::new(2, 2).with_layers(vec![LayerSpec::sigmoid(4)]);
    let mut network = NeuralNet::new(&spec)?;

    let data = Dataset::from_rows(
        vec![
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 0.0],
        ],
        vec![1, 0, 1, 0],
    )?;

    let mut config = FitConfig::new(2000, Method::Adagrad);
    config.learning_rate = 0.5;
    config.batch_size = 4;

    // Four points leave nothing to hold out, so the training set doubles as dev set.
    let report = fit(&mut network, &data, Some(&data), &config)?;
    println!("{network}");
    println!("best epoch {} with error {:.2}", report.best_epoch, report.best_dev_error);

    let proba = network.p_y_given_x(&data.x);
    for (input, p) in data.x.data.iter().zip(proba.data.iter()) {
        println!("Input: {:?} -> P(1) = {:.4}", input, p[1]);
    }
    Ok(())
}
