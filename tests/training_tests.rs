// Integration tests for the training loop: optimizers, dropout,
// regularization and dev-set model selection working together.

use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};

use ferrite_classify::data::{gaussian_blobs, shuffle};
use ferrite_classify::train::error_rate;
use ferrite_classify::{
    fit, Dataset, Error, FitConfig, LayerSpec, Method, NetworkSpec, NeuralNet,
};

/// Two shuffled blobs along feature 0, centered so the ideal boundary is 0.
fn centered_blobs(per_class: usize, n_features: usize, separation: f64, seed: u64) -> Dataset {
    let mut data = gaussian_blobs(&[per_class, per_class], n_features, separation, seed).unwrap();
    for row in data.x.data.iter_mut() {
        row[0] -= separation / 2.0;
    }
    shuffle(&data, seed)
}

fn quiet_config(max_epochs: usize, method: Method) -> FitConfig {
    let mut cfg = FitConfig::new(max_epochs, method);
    cfg.batch_size = 20;
    cfg.learning_rate = 0.1;
    cfg
}

#[test]
fn every_method_separates_blobs() {
    let train = centered_blobs(200, 2, 4.0, 1);
    let dev = centered_blobs(100, 2, 4.0, 2);

    for method in [Method::Sgd, Method::Adagrad, Method::Adadelta] {
        let mut net = NeuralNet::new(&NetworkSpec::new(2, 2)).unwrap();
        let report = fit(&mut net, &train, Some(&dev), &quiet_config(15, method)).unwrap();
        let err = error_rate(&net, &dev, 100);
        assert!(err < 0.1, "{method}: dev error {err}");
        assert_eq!(report.history.len(), 15);
        assert!(report.history.iter().all(|s| s.mean_cost.is_finite()));
    }
}

#[test]
fn hidden_layers_learn_xor() {
    let data = Dataset::from_rows(
        vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]],
        vec![0, 1, 1, 0],
    ).unwrap();
    let spec = NetworkSpec::new(2, 2)
        .with_layers(vec![LayerSpec::sigmoid(8)])
        .with_seed(3);
    let mut net = NeuralNet::new(&spec).unwrap();
    let mut cfg = FitConfig::new(3000, Method::Adagrad);
    cfg.learning_rate = 0.5;
    cfg.batch_size = 4;

    let report = fit(&mut net, &data, Some(&data), &cfg).unwrap();
    assert_eq!(report.best_dev_error, 0.0);
    assert_eq!(net.y_pred(&data.x), vec![0, 1, 1, 0]);
}

#[test]
fn early_stopping_restores_the_best_dev_parameters() {
    let train = centered_blobs(150, 3, 2.0, 5);
    let dev = centered_blobs(60, 3, 2.0, 6);
    let spec = NetworkSpec::new(3, 2).with_layers(vec![LayerSpec::relu(16)]);
    let mut net = NeuralNet::new(&spec).unwrap();

    let report = fit(&mut net, &train, Some(&dev), &quiet_config(12, Method::Sgd)).unwrap();
    assert!(report.best_epoch >= 1);
    assert_eq!(error_rate(&net, &dev, 100), report.best_dev_error);

    let best = report.history.iter().map(|s| s.dev_error).fold(f64::INFINITY, f64::min);
    assert_eq!(report.best_dev_error, best);
    // The first epoch reaching the minimum wins ties.
    let first_best = report.history.iter().position(|s| s.dev_error == best).unwrap() + 1;
    assert_eq!(report.best_epoch, first_best);
    assert_eq!(report.history.iter().filter(|s| s.improved).last().unwrap().epoch, first_best);
}

#[test]
fn without_early_stopping_the_final_parameters_stay() {
    let train = centered_blobs(100, 2, 1.0, 8);
    let dev = centered_blobs(40, 2, 1.0, 9);
    let mut net = NeuralNet::new(&NetworkSpec::new(2, 2)).unwrap();
    let mut cfg = quiet_config(6, Method::Sgd);
    cfg.early_stopping = false;

    let report = fit(&mut net, &train, Some(&dev), &cfg).unwrap();
    let last = report.history.last().unwrap();
    assert_eq!(last.epoch, 6);
    assert_eq!(error_rate(&net, &dev, 100), last.dev_error);
}

#[test]
fn patience_stops_once_dev_error_plateaus() {
    let train = centered_blobs(100, 1, 10.0, 11);
    let dev = centered_blobs(50, 1, 10.0, 12);
    let mut net = NeuralNet::new(&NetworkSpec::new(1, 2)).unwrap();
    let mut cfg = quiet_config(30, Method::Sgd);
    cfg.patience = Some(2);

    let report = fit(&mut net, &train, Some(&dev), &cfg).unwrap();
    assert_eq!(report.best_epoch, 1);
    assert_eq!(report.best_dev_error, 0.0);
    assert_eq!(report.epochs_run, 3);
}

#[test]
fn missing_dev_set_is_split_from_train() {
    let train = centered_blobs(50, 2, 4.0, 13);
    let mut net = NeuralNet::new(&NetworkSpec::new(2, 2)).unwrap();
    let report = fit(&mut net, &train, None, &quiet_config(3, Method::Adadelta)).unwrap();
    // 10% of 100 samples are held out, so dev errors are multiples of 1/10.
    for stats in &report.history {
        let scaled = stats.dev_error * 10.0;
        assert!((scaled - scaled.round()).abs() < 1e-9);
    }
}

#[test]
fn dropout_net_trains_and_predicts_deterministically() {
    let train = centered_blobs(200, 4, 4.0, 21);
    let dev = centered_blobs(80, 4, 4.0, 22);
    let spec = NetworkSpec::new(4, 2)
        .with_layers(vec![LayerSpec::relu(32), LayerSpec::relu(32)])
        .with_dropout(vec![0.2, 0.5, 0.5]);
    let mut net = NeuralNet::new(&spec).unwrap();
    let mut cfg = quiet_config(20, Method::Adadelta);
    cfg.rho = 0.98;

    let report = fit(&mut net, &train, Some(&dev), &cfg).unwrap();
    assert!(report.best_dev_error < 0.2, "dev error {}", report.best_dev_error);

    let mut without_dropout = net.clone();
    without_dropout.dropout_rates.clear();
    assert_eq!(net.p_y_given_x(&dev.x), without_dropout.p_y_given_x(&dev.x));
    assert_eq!(error_rate(&net, &dev, 7), error_rate(&without_dropout, &dev, 100));
}

#[test]
fn l2_penalty_shrinks_weights() {
    let train = centered_blobs(150, 2, 4.0, 31);
    let dev = centered_blobs(50, 2, 4.0, 32);
    let base = NetworkSpec::new(2, 2).with_layers(vec![LayerSpec::relu(8)]);

    let mut plain = NeuralNet::new(&base).unwrap();
    let mut shrunk = NeuralNet::new(&base.clone().with_regularization(0.0, 0.1)).unwrap();
    let mut cfg = quiet_config(10, Method::Sgd);
    cfg.early_stopping = false;

    fit(&mut plain, &train, Some(&dev), &cfg).unwrap();
    fit(&mut shrunk, &train, Some(&dev), &cfg).unwrap();

    let norm = |net: &NeuralNet| net.params().iter().map(|p| p.sum_sq()).sum::<f64>();
    assert!(norm(&shrunk) < norm(&plain));
}

#[test]
fn randomized_batches_still_converge() {
    let train = centered_blobs(200, 2, 4.0, 41);
    let dev = centered_blobs(50, 2, 4.0, 42);
    let mut net = NeuralNet::new(&NetworkSpec::new(2, 2)).unwrap();
    let mut cfg = quiet_config(10, Method::Adagrad);
    cfg.shuffle_batches = true;

    let report = fit(&mut net, &train, Some(&dev), &cfg).unwrap();
    assert!(report.best_dev_error < 0.1);
}

#[test]
fn randomized_batches_need_a_full_batch_of_training_data() {
    let data = centered_blobs(50, 2, 4.0, 43);
    let mut net = NeuralNet::new(&NetworkSpec::new(2, 2)).unwrap();
    let before = net.snapshot();
    let mut cfg = FitConfig::default();
    cfg.shuffle_batches = true;

    // 90 samples remain after the dev split, short of the 100-row batch.
    assert!(matches!(fit(&mut net, &data, None, &cfg), Err(Error::InvalidConfig(_))));
    assert_eq!(net.snapshot(), before);

    cfg.batch_size = 30;
    let report = fit(&mut net, &data, None, &cfg).unwrap();
    assert!(report.history.iter().all(|s| s.mean_cost.is_finite() && s.mean_cost > 0.0));
    assert_ne!(net.snapshot(), before);
}

#[test]
fn stop_flag_and_dropped_receiver_end_training() {
    let train = centered_blobs(50, 2, 4.0, 51);
    let dev = centered_blobs(20, 2, 4.0, 52);

    let mut net = NeuralNet::new(&NetworkSpec::new(2, 2)).unwrap();
    let before = net.snapshot();
    let mut cfg = quiet_config(10, Method::Sgd);
    cfg.stop_flag = Some(Arc::new(AtomicBool::new(true)));
    let report = fit(&mut net, &train, Some(&dev), &cfg).unwrap();
    assert_eq!(report.epochs_run, 0);
    assert_eq!(net.snapshot(), before);

    let (tx, rx) = mpsc::channel();
    drop(rx);
    let mut cfg = quiet_config(10, Method::Sgd);
    cfg.progress_tx = Some(tx);
    let report = fit(&mut net, &train, Some(&dev), &cfg).unwrap();
    assert_eq!(report.epochs_run, 1);
}

#[test]
fn progress_channel_sees_every_epoch() {
    let train = centered_blobs(50, 2, 4.0, 61);
    let dev = centered_blobs(20, 2, 4.0, 62);
    let mut net = NeuralNet::new(&NetworkSpec::new(2, 2)).unwrap();
    let (tx, rx) = mpsc::channel();
    let mut cfg = quiet_config(4, Method::Adagrad);
    cfg.verbose = true;
    cfg.progress_tx = Some(tx);

    fit(&mut net, &train, Some(&dev), &cfg).unwrap();
    drop(cfg);
    let epochs: Vec<_> = rx.iter().collect();
    assert_eq!(epochs.iter().map(|s| s.epoch).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    assert!(epochs.iter().all(|s| s.train_error.is_some() && s.total_epochs == 4));
}

#[test]
fn fit_rejects_incompatible_data() {
    let mut net = NeuralNet::new(&NetworkSpec::new(3, 2)).unwrap();
    let narrow = centered_blobs(20, 2, 4.0, 71);
    assert!(matches!(
        fit(&mut net, &narrow, None, &FitConfig::default()),
        Err(Error::ShapeMismatch { expected: 3, got: 2 })
    ));

    let three_classes = gaussian_blobs(&[10, 10, 10], 3, 2.0, 72).unwrap();
    assert!(matches!(
        fit(&mut net, &three_classes, None, &FitConfig::default()),
        Err(Error::InvalidData(_))
    ));

    let mut bad = FitConfig::default();
    bad.max_epochs = 0;
    let ok_data = centered_blobs(20, 3, 4.0, 73);
    assert!(matches!(fit(&mut net, &ok_data, None, &bad), Err(Error::InvalidConfig(_))));
}

#[test]
fn trained_network_survives_json() {
    let train = centered_blobs(60, 2, 4.0, 81);
    let spec = NetworkSpec::new(2, 2)
        .with_layers(vec![LayerSpec::relu(4)])
        .with_dropout(vec![0.0, 0.5]);
    let mut net = NeuralNet::new(&spec).unwrap();
    fit(&mut net, &train, None, &quiet_config(3, Method::Adadelta)).unwrap();

    let path = std::env::temp_dir().join(format!("ferrite-classify-{}.json", std::process::id()));
    let path = path.to_str().unwrap();
    net.save_json(path).unwrap();
    let loaded = NeuralNet::load_json(path).unwrap();
    std::fs::remove_file(path).unwrap();

    assert_eq!(loaded.to_string(), net.to_string());
    let (a, b) = (loaded.p_y_given_x(&train.x), net.p_y_given_x(&train.x));
    for (ra, rb) in a.data.iter().zip(b.data.iter()) {
        for (x, y) in ra.iter().zip(rb.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }
}
