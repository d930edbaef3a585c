use ferrite_classify::data::{gaussian_blobs, oversample_class, shuffle, train_test_split};
use ferrite_classify::metrics::{positive_scores, roc_auc};
use ferrite_classify::{
    telemetry, Classifier, FitConfig, GaussianNb, LayerSpec, Method, ModelMetadata, NetworkSpec,
    NeuralClassifier,
};

fn main() -> ferrite_classify::Result<()> {
    telemetry::init_tracing();

    // Imbalanced binary problem: 1 positive for every 9 negatives.
    let raw = gaussian_blobs(&[1800, 200], 8, 1.5, 42)?;

    // Weight the rare class by duplicating it before shuffling.
    let data = shuffle(&oversample_class(&raw, 1), 7);
    let (train, test) = train_test_split(&data, 0.2, 42)?;

    let mut spec = NetworkSpec::new(train.n_features(), 2)
        .with_layers(vec![LayerSpec::relu(32), LayerSpec::relu(32)])
        .with_dropout(vec![0.2, 0.5, 0.5]);
    spec.metadata = Some(ModelMetadata {
        class_labels: Some(vec!["negative".into(), "positive".into()]),
        ..ModelMetadata::default()
    });
    let config = FitConfig {
        patience: Some(10),
        rho: 0.98,
        verbose: true,
        ..FitConfig::new(50, Method::Adadelta)
    };

    let mut dnn = NeuralClassifier::new(&spec, config)?;
    let mut gnb = GaussianNb::new();

    let models: [(&str, &mut dyn Classifier); 2] = [("dropout net", &mut dnn), ("gaussian nb", &mut gnb)];
    for (name, model) in models {
        model.fit(&train)?;
        let scores = positive_scores(&model.predict_proba(&test.x)?, 1)?;
        println!(
            "{name:>12}: test error {:.4}, AUC {:.4}",
            model.score(&test)?,
            roc_auc(&test.y, &scores)?
        );
    }

    let meta = dnn.net.metadata.clone().unwrap_or_default();
    let predicted = dnn.predict(&test.x)?;
    for class in 0..dnn.net.n_outs() {
        let hits = predicted.iter().filter(|&&p| p == class).count();
        println!("{:>12}: {hits} of {} test rows", meta.class_label(class), test.len());
    }
    Ok(())
}
