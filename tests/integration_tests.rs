//! Integration tests for the Kohonen SOM engine.

use kohonen::{
    DecaySchedule, DistanceMetric, InitPolicy, KohonenError, Som, SomConfig, TrainingMode,
    Variant, Winners,
};
use ndarray::{array, Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tempfile::tempdir;

/// Two tight clusters around `[0, 0]` and `[10, 10]`.
fn two_clusters(per_cluster: usize, eps: f64, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(per_cluster * 4);

    for center in [0.0, 10.0] {
        for _ in 0..per_cluster {
            rows.push(center + rng.gen_range(-eps..eps));
            rows.push(center + rng.gen_range(-eps..eps));
        }
    }
    Array2::from_shape_vec((per_cluster * 2, 2), rows).unwrap()
}

fn squared_distance(a: ndarray::ArrayView1<f64>, b: &Array1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

#[test]
fn test_end_to_end_incremental_two_clusters() {
    let config = SomConfig {
        dx: 3,
        dy: 3,
        dw: 2,
        learning_rate: 0.8,
        radius: 2,
        iterations: 5,
        init: InitPolicy::Uniform,
        mode: TrainingMode::Incremental,
        seed: Some(42),
        ..Default::default()
    };
    let mut som: Som = Som::new(&config).unwrap();
    let data = two_clusters(10, 0.05, 7);

    som.fit(data.view()).unwrap();

    // Quantization error shrinks on a 3-iteration moving average.
    let qe = som.quantization_error();
    assert_eq!(qe.len(), 5);
    let smoothed: Vec<f64> = qe.windows(3).map(|w| w.iter().sum::<f64>() / 3.0).collect();
    assert!(
        smoothed.windows(2).all(|w| w[1] <= w[0]),
        "smoothed error increased: {:?}",
        smoothed
    );

    // Each centroid has its own unit, and that unit sits on its side.
    let low = array![0.0, 0.0];
    let high = array![10.0, 10.0];
    let bmu_low = som.find_bmu(low.view()).unwrap().index;
    let bmu_high = som.find_bmu(high.view()).unwrap().index;
    assert_ne!(bmu_low, bmu_high);

    let w_low = som.weights().row(bmu_low);
    let w_high = som.weights().row(bmu_high);
    assert!(squared_distance(w_low, &low) < squared_distance(w_low, &high));
    assert!(squared_distance(w_high, &high) < squared_distance(w_high, &low));

    assert_eq!(som.trajectory().len(), 5 * 20);
    assert_eq!(som.winner_histogram().sum(), 5 * 20);
}

#[test]
fn test_end_to_end_batch_single_sample() {
    let config = SomConfig {
        dx: 4,
        dy: 4,
        dw: 3,
        radius: 2,
        iterations: 1,
        mode: TrainingMode::Batch,
        seed: Some(9),
        ..Default::default()
    };
    let mut som: Som = Som::new(&config).unwrap();
    let sample = array![[0.25, -1.5, 4.0]];

    som.fit(sample.view()).unwrap();

    // The weighted mean of a single point is the point itself.
    for row in som.weights().rows() {
        for (w, x) in row.iter().zip(sample.row(0).iter()) {
            assert!((w - x).abs() < 1e-12, "{} != {}", w, x);
        }
    }
    assert_eq!(som.quantization_error().len(), 1);
}

#[test]
fn test_batch_training_deterministic() {
    let config = SomConfig {
        dx: 5,
        dy: 4,
        dw: 2,
        radius: 3,
        iterations: 8,
        mode: TrainingMode::Batch,
        seed: Some(1234),
        ..Default::default()
    };
    let data = two_clusters(15, 0.5, 3);

    let mut first: Som = Som::new(&config).unwrap();
    let mut second: Som = Som::new(&config).unwrap();
    first.fit(data.view()).unwrap();
    second.fit(data.view()).unwrap();

    assert_eq!(first.weights(), second.weights());
    assert_eq!(first.quantization_error(), second.quantization_error());
}

#[test]
fn test_weights_shape_and_finite_after_init() {
    for (dx, dy, dw) in [(1, 1, 1), (2, 7, 4), (10, 3, 16)] {
        for init in [InitPolicy::Uniform, InitPolicy::Simplex] {
            let config = SomConfig {
                dx,
                dy,
                dw,
                init,
                seed: Some(5),
                ..Default::default()
            };
            let som: Som = Som::new(&config).unwrap();
            assert_eq!(som.weights().dim(), (dx * dy, dw));
            assert!(som.weights().iter().all(|w| w.is_finite()));
        }
    }
}

#[test]
fn test_winner_index_in_range() {
    let config = SomConfig {
        dx: 6,
        dy: 5,
        dw: 4,
        seed: Some(77),
        ..Default::default()
    };
    let som: Som = Som::new(&config).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    for metric in ["euclidean", "sqeuclidean", "cityblock", "chebyshev", "cosine"] {
        let config = SomConfig {
            metric: metric.parse().unwrap(),
            ..config.clone()
        };
        let mut other: Som = Som::new(&config).unwrap();
        other.set_weights(som.weights().clone()).unwrap();

        for _ in 0..50 {
            let x: Array1<f64> = (0..4).map(|_| rng.gen_range(-5.0..5.0)).collect();
            let bmu = other.find_bmu(x.view()).unwrap();
            assert!(bmu.index < 30);
        }
    }
}

#[test]
fn test_winners_dispatch_on_dimensionality() {
    let config = SomConfig {
        dx: 2,
        dy: 2,
        dw: 2,
        seed: Some(2),
        ..Default::default()
    };
    let som: Som = Som::new(&config).unwrap();

    let x = array![0.5, 0.5];
    match som.winners(x.view().into_dyn()).unwrap() {
        Winners::Single { index, scores } => {
            assert!(index < 4);
            assert_eq!(scores.len(), 4);
        }
        other => panic!("expected a single winner, got {:?}", other),
    }

    let data = array![[0.0, 0.0], [1.0, 1.0], [0.5, 0.2]];
    match som.winners(data.view().into_dyn()).unwrap() {
        Winners::Batch { indices, error } => {
            assert_eq!(indices.len(), 3);
            assert!(error >= 0.0);
        }
        other => panic!("expected batch winners, got {:?}", other),
    }

    let cube = data.clone().insert_axis(Axis(0));
    assert!(matches!(
        som.winners(cube.view().into_dyn()),
        Err(KohonenError::Shape(_))
    ));
}

#[test]
fn test_decay_schedule_properties() {
    let linear: Vec<f64> = DecaySchedule::linear(0.8, 0.01, 25).iter().collect();
    assert!((linear[0] - 0.8).abs() < 1e-12);
    assert!((linear[24] - 0.01).abs() < 1e-12);
    assert!(linear.windows(2).all(|w| w[1] <= w[0]));

    let expo: Vec<f64> = DecaySchedule::exponential(7.0, 1.0, 25)
        .unwrap()
        .iter()
        .collect();
    assert!((expo[0] - 7.0).abs() < 1e-12);
    assert!((expo[24] - 1.0).abs() < 1e-9);
    assert!(expo.windows(2).all(|w| w[1] < w[0]));
    assert!(expo.iter().all(|&v| v > 0.0));
}

#[test]
fn test_dot_variant_unit_norm_throughout_training() {
    let config = SomConfig {
        dx: 4,
        dy: 3,
        dw: 4,
        learning_rate: 0.6,
        radius: 3,
        iterations: 6,
        variant: Variant::DotProduct,
        seed: Some(21),
        ..Default::default()
    };
    let mut som: Som = Som::new(&config).unwrap();
    let data = two_clusters(8, 1.0, 4).into_shape((8, 4)).unwrap();

    let mut iterations_seen = 0;
    som.fit_with(data.view(), |_| iterations_seen += 1).unwrap();
    assert_eq!(iterations_seen, 6);

    for row in som.weights().rows() {
        assert!((row.dot(&row).sqrt() - 1.0).abs() < 1e-9);
    }
    assert_eq!(som.quantization_error().len(), 6);
    assert!(som.quantization_error().iter().all(|&qe| qe == 0.0));
}

#[test]
fn test_calibrate_predict_roundtrip() {
    let config = SomConfig {
        dx: 3,
        dy: 3,
        dw: 2,
        learning_rate: 0.8,
        radius: 2,
        iterations: 5,
        seed: Some(42),
        ..Default::default()
    };
    let mut som: Som<u8> = Som::new(&config).unwrap();
    let data = two_clusters(10, 0.05, 7);
    let targets: Vec<u8> = (0..20).map(|i| if i < 10 { 0 } else { 1 }).collect();

    som.fit(data.view()).unwrap();
    som.calibrate(data.view(), &targets).unwrap();

    assert_eq!(som.predict(data.view()).unwrap(), targets);
}

#[test]
fn test_predict_before_calibrate_fails_without_mutation() {
    let config = SomConfig {
        dx: 3,
        dy: 3,
        dw: 2,
        seed: Some(3),
        ..Default::default()
    };
    let som: Som = Som::new(&config).unwrap();
    let before = som.weights().clone();

    let result = som.predict(array![[0.1, 0.2]].view());

    assert!(matches!(result, Err(KohonenError::IllegalState(_))));
    assert_eq!(som.weights(), &before);
}

#[test]
fn test_configuration_errors() {
    let bad = [
        SomConfig {
            dx: 0,
            ..Default::default()
        },
        SomConfig {
            learning_rate: 1.2,
            ..Default::default()
        },
        SomConfig {
            radius: 0,
            ..Default::default()
        },
        SomConfig {
            dw: 8,
            init: InitPolicy::Simplex,
            ..Default::default()
        },
    ];

    for config in bad.iter() {
        assert!(matches!(
            Som::<String>::new(config),
            Err(KohonenError::Configuration(_))
        ));
    }
    assert!(matches!(
        "hamming".parse::<DistanceMetric>(),
        Err(KohonenError::Configuration(_))
    ));
}

#[test]
fn test_snapshot_roundtrip_continues_training_identically() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lattice.som");

    let config = SomConfig {
        dx: 3,
        dy: 3,
        dw: 2,
        iterations: 3,
        seed: Some(99),
        ..Default::default()
    };
    let data = two_clusters(5, 0.1, 1);

    let mut original: Som = Som::new(&config).unwrap();
    original.fit(data.view()).unwrap();
    original.save(&path).unwrap();

    let mut restored: Som = Som::load(&path).unwrap();
    assert_eq!(restored.weights(), original.weights());

    // RNG state travels with the snapshot.
    original.fit(data.view()).unwrap();
    restored.fit(data.view()).unwrap();
    assert_eq!(restored.weights(), original.weights());
    assert_eq!(restored.trajectory(), original.trajectory());
}

#[test]
fn test_quality_measures_on_trained_map() {
    let config = SomConfig {
        dx: 4,
        dy: 4,
        dw: 2,
        radius: 3,
        iterations: 10,
        mode: TrainingMode::Batch,
        seed: Some(6),
        ..Default::default()
    };
    let mut som: Som = Som::new(&config).unwrap();
    let data = two_clusters(10, 0.3, 2);
    som.fit(data.view()).unwrap();

    let umatrix = som.umatrix();
    assert_eq!(umatrix.dim(), (4, 4));
    assert!(umatrix.iter().all(|&u| u.is_finite() && u >= 0.0));

    let te = som.topographic_error(data.view()).unwrap();
    assert!((0.0..=1.0).contains(&te));
}
