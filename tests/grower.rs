//! Integration tests for tree growth.

mod common;

use common::*;
use hist_gbdt::tree::histogram::HistogramBuilder;
use hist_gbdt::{
    BinMapper, BinMapperConfig, GrowerConfig, GrowerConfigBuilder, Hessians, TreeGrower,
};
use ndarray::{Array1, Array2};
use rand::prelude::*;

fn setup() {
    hist_gbdt::init_logging();
}

#[test]
fn test_leaf_count_respects_max_leaf_nodes() {
    setup();
    let (x, y) = make_regression(400, 6, 4, 0);
    let mut mapper = BinMapper::with_n_bins(64).unwrap();
    let binned = mapper.fit_transform(x.view()).unwrap();
    let gradients = least_squares_gradients(&y);

    for max_leaf_nodes in [2, 5, 17, 40] {
        let config = GrowerConfigBuilder::new()
            .max_leaf_nodes(max_leaf_nodes)
            .min_samples_leaf(5)
            .build()
            .unwrap();
        let mut grower =
            TreeGrower::from_bin_mapper(&binned, &gradients, Hessians::Constant(1.0), &mapper, config)
                .unwrap();
        grower.grow().unwrap();

        assert!(grower.n_leaf_nodes() <= max_leaf_nodes);
        assert_eq!(grower.n_nodes(), 2 * grower.n_leaf_nodes() - 1);

        let predictor = grower.make_predictor(mapper.feature_bins()).unwrap();
        assert_eq!(predictor.n_leaf_nodes(), grower.n_leaf_nodes());
    }
}

#[test]
fn test_leaves_partition_the_samples() {
    let (x, y) = make_regression(300, 4, 2, 3);
    let mut mapper = BinMapper::with_n_bins(32).unwrap();
    let binned = mapper.fit_transform(x.view()).unwrap();
    let gradients = least_squares_gradients(&y);

    let config = GrowerConfigBuilder::new().min_samples_leaf(7).build().unwrap();
    let mut grower =
        TreeGrower::from_bin_mapper(&binned, &gradients, Hessians::Constant(1.0), &mapper, config)
            .unwrap();
    grower.grow().unwrap();

    let mut seen = vec![false; 300];
    let mut total = 0;
    for node in grower.nodes().iter().filter(|n| n.is_leaf) {
        assert!(node.n_samples() >= 7);
        for &idx in grower.node_samples(node.node_id).unwrap() {
            assert!(!seen[idx as usize]);
            seen[idx as usize] = true;
        }
        total += node.n_samples();
    }
    assert_eq!(total, 300);
}

#[test]
fn test_max_depth() {
    let (x, y) = make_regression(500, 5, 5, 11);
    let mut mapper = BinMapper::with_n_bins(256).unwrap();
    let binned = mapper.fit_transform(x.view()).unwrap();
    let gradients = least_squares_gradients(&y);

    for max_depth in [1, 2, 4] {
        let config = GrowerConfigBuilder::new()
            .max_depth(max_depth)
            .min_samples_leaf(1)
            .build()
            .unwrap();
        let mut grower =
            TreeGrower::from_bin_mapper(&binned, &gradients, Hessians::Constant(1.0), &mapper, config)
                .unwrap();
        grower.grow().unwrap();
        let predictor = grower.make_predictor(mapper.feature_bins()).unwrap();
        assert_eq!(predictor.max_depth(), max_depth);
    }
}

#[test]
fn test_constant_and_per_sample_hessians_agree() {
    let (x, y) = make_regression(300, 5, 3, 21);
    let mut mapper = BinMapper::with_n_bins(128).unwrap();
    let binned = mapper.fit_transform(x.view()).unwrap();
    let gradients = least_squares_gradients(&y);
    let ones = vec![1.0f32; gradients.len()];
    let config = GrowerConfigBuilder::new()
        .max_leaf_nodes(20)
        .min_samples_leaf(5)
        .build()
        .unwrap();

    let mut constant = TreeGrower::from_bin_mapper(
        &binned,
        &gradients,
        Hessians::Constant(1.0),
        &mapper,
        config.clone(),
    )
    .unwrap();
    constant.grow().unwrap();
    let mut per_sample = TreeGrower::from_bin_mapper(
        &binned,
        &gradients,
        Hessians::PerSample(&ones),
        &mapper,
        config,
    )
    .unwrap();
    per_sample.grow().unwrap();

    let a = constant.make_predictor(mapper.feature_bins()).unwrap();
    let b = per_sample.make_predictor(mapper.feature_bins()).unwrap();
    assert_eq!(a.predict(x.view()).unwrap(), b.predict(x.view()).unwrap());
}

#[test]
fn test_binned_and_raw_predictions_agree() {
    let (mut x, y) = make_regression(600, 6, 4, 5);
    inject_missing(&mut x, 0.05, 9);
    let config = BinMapperConfig {
        categorical: Some(vec![false; 6]),
        ..BinMapperConfig::with_n_bins(64)
    };
    let mut mapper = BinMapper::new(config).unwrap();
    let binned = mapper.fit_transform(x.view()).unwrap();
    let gradients = least_squares_gradients(&y);

    let config = GrowerConfigBuilder::new()
        .max_leaf_nodes(31)
        .min_samples_leaf(5)
        .build()
        .unwrap();
    let mut grower =
        TreeGrower::from_bin_mapper(&binned, &gradients, Hessians::Constant(1.0), &mapper, config)
            .unwrap();
    grower.grow().unwrap();
    let predictor = grower.make_predictor(mapper.feature_bins()).unwrap();

    let raw = predictor.predict(x.view()).unwrap();
    let from_bins = predictor
        .predict_binned(&binned, mapper.missing_values_bin_idx())
        .unwrap();
    assert_eq!(raw, from_bins);
}

#[test]
fn test_histogram_subtraction_on_real_data() {
    let (x, y) = make_regression(1000, 4, 4, 8);
    let mut mapper = BinMapper::with_n_bins(256).unwrap();
    let binned = mapper.fit_transform(x.view()).unwrap();
    let gradients = least_squares_gradients(&y);
    let hessians: Vec<f32> = (0..1000).map(|i| 0.5 + (i % 3) as f32).collect();
    let builder =
        HistogramBuilder::new(&binned, &gradients, Hessians::PerSample(&hessians), 256).unwrap();

    let mut rng = StdRng::seed_from_u64(4);
    let mut indices: Vec<u32> = (0..1000).collect();
    indices.shuffle(&mut rng);
    let (left, right) = indices.split_at(377);

    let parent = builder.build_root();
    let direct = builder.build(right);
    let derived = builder.build(left).sibling_of(&parent).unwrap();

    for f in 0..4 {
        let counts: u32 = direct.feature(f).iter().map(|b| b.count).sum();
        assert_eq!(counts, 623);
        for (a, b) in direct.feature(f).iter().zip(derived.feature(f)) {
            assert_eq!(a.count, b.count);
            approx::assert_abs_diff_eq!(a.sum_gradients, b.sum_gradients, epsilon = 1e-6);
            approx::assert_abs_diff_eq!(a.sum_hessians, b.sum_hessians, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_categorical_feature_is_split_by_category() {
    // target depends on category membership, not on category order
    let mut rng = StdRng::seed_from_u64(17);
    let n = 1000;
    let mut x = Array2::<f64>::zeros((n, 2));
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let category = rng.gen_range(0..8) as f64;
        x[[i, 0]] = category;
        x[[i, 1]] = rng.gen_range(-1.0..1.0);
        y[i] = if [1.0, 4.0, 6.0].contains(&category) { 10.0 } else { -10.0 };
    }

    let config = BinMapperConfig {
        categorical: Some(vec![true, false]),
        ..BinMapperConfig::with_n_bins(32)
    };
    let mut mapper = BinMapper::new(config).unwrap();
    let binned = mapper.fit_transform(x.view()).unwrap();
    let gradients = least_squares_gradients(&y);

    let grower_config = GrowerConfigBuilder::new().max_leaf_nodes(2).build().unwrap();
    let mut grower = TreeGrower::from_bin_mapper(
        &binned,
        &gradients,
        Hessians::Constant(1.0),
        &mapper,
        grower_config,
    )
    .unwrap();
    grower.grow().unwrap();
    assert_eq!(grower.n_categorical_splits(), 1);

    let predictor = grower.make_predictor(mapper.feature_bins()).unwrap();
    let root = &predictor.nodes()[0];
    assert!(root.is_categorical);
    let mut left = root.left_categories.clone();
    left.sort_by(f64::total_cmp);
    assert!(left == vec![1.0, 4.0, 6.0] || left == vec![0.0, 2.0, 3.0, 5.0, 7.0]);

    let predictions = predictor.predict(x.view()).unwrap();
    for (p, t) in predictions.iter().zip(&y) {
        assert!((p - t).abs() < 1e-6);
    }

    // an unseen category follows the larger child, which holds 5 of 8 categories
    let unseen = ndarray::array![[42.0, 0.0]];
    let prediction = predictor.predict(unseen.view()).unwrap()[0];
    assert!((prediction + 10.0).abs() < 1e-6);
}

#[test]
fn test_large_min_samples_leaf_gives_single_leaf() {
    let (x, y) = make_regression(100, 3, 3, 2);
    let mut mapper = BinMapper::with_n_bins(16).unwrap();
    let binned = mapper.fit_transform(x.view()).unwrap();
    let gradients = least_squares_gradients(&y);
    let config = GrowerConfig {
        min_samples_leaf: 60,
        ..GrowerConfig::default()
    };
    let mut grower =
        TreeGrower::from_bin_mapper(&binned, &gradients, Hessians::Constant(1.0), &mapper, config)
            .unwrap();
    grower.grow().unwrap();
    assert_eq!(grower.n_leaf_nodes(), 1);

    let predictor = grower.make_predictor(mapper.feature_bins()).unwrap();
    let mean = y.mean().unwrap();
    let predictions = predictor.predict(x.view()).unwrap();
    assert!(predictions.iter().all(|p| (p - mean).abs() < 1e-3 * mean.abs().max(1.0)));
}

#[test]
fn test_unfitted_mapper_is_rejected() {
    let binned = hist_gbdt::BinnedMatrix::from_columns(2, vec![vec![0, 1]]).unwrap();
    let mapper = BinMapper::with_n_bins(4).unwrap();
    let gradients = [0.0f32, 1.0];
    let result = TreeGrower::from_bin_mapper(
        &binned,
        &gradients,
        Hessians::Constant(1.0),
        &mapper,
        GrowerConfig::default(),
    );
    assert!(result.is_err());
}
