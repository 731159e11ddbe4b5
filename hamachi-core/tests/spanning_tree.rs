//! Tests for the public spanning-tree API.

use hamachi_core::{
    BoruvkaBuilder, BoruvkaError, BoruvkaErrorCode, KdTree, Metric, SpanningTree, TreeError,
    TreeErrorCode,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rstest::{fixture, rstest};

fn random_points(n: usize, dim: usize, seed: u64) -> Vec<f64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..n * dim).map(|_| rng.gen_range(0.0..1.0)).collect()
}

fn sorted_weights(tree: &SpanningTree) -> Vec<f64> {
    let mut weights: Vec<f64> = tree.edges().iter().map(|e| e.weight()).collect();
    weights.sort_by(f64::total_cmp);
    weights
}

#[fixture]
fn small_cloud() -> Vec<f64> {
    random_points(100, 2, 7)
}

#[test]
fn single_point_produces_no_edges() {
    let engine = BoruvkaBuilder::new()
        .with_min_samples(1)
        .build()
        .expect("configuration is valid");
    let mst = engine
        .spanning_tree_kd(&[0.5, 0.5], 2)
        .expect("run must succeed");
    assert!(mst.is_empty());
}

#[rstest]
fn two_points_produce_the_distance_edge() {
    let engine = BoruvkaBuilder::new()
        .with_min_samples(1)
        .build()
        .expect("configuration is valid");
    let data = [0.0, 0.0, 3.0, 4.0];

    for mst in [
        engine.spanning_tree_kd(&data, 2).expect("kd run"),
        engine.spanning_tree_ball(&data, 2).expect("ball run"),
    ] {
        assert_eq!(mst.len(), 1);
        assert_eq!(mst.edges()[0].weight(), 5.0);
        assert_eq!(mst.total_weight(), 5.0);
    }
}

#[rstest]
fn kd_and_ball_agree_on_the_weight_multiset(small_cloud: Vec<f64>) {
    let engine = BoruvkaBuilder::new()
        .with_min_samples(4)
        .with_leaf_size(8)
        .build()
        .expect("configuration is valid");

    let kd = engine
        .spanning_tree_kd(&small_cloud, 2)
        .expect("kd run must succeed");
    let ball = engine
        .spanning_tree_ball(&small_cloud, 2)
        .expect("ball run must succeed");

    assert_eq!(kd.len(), 99);
    assert_eq!(ball.len(), 99);
    for (left, right) in sorted_weights(&kd).iter().zip(sorted_weights(&ball).iter()) {
        assert!(
            (left - right).abs() < 1e-9,
            "tree kinds disagree: {left} vs {right}"
        );
    }
}

#[test]
fn exact_total_weight_never_exceeds_approximate() {
    let data = random_points(1500, 3, 91);
    let exact = BoruvkaBuilder::new()
        .with_min_samples(5)
        .build()
        .expect("configuration is valid")
        .spanning_tree_kd(&data, 3)
        .expect("exact run must succeed");
    let approximate = BoruvkaBuilder::new()
        .with_min_samples(5)
        .with_approx_min_span_tree(true)
        .build()
        .expect("configuration is valid")
        .spanning_tree_kd(&data, 3)
        .expect("approximate run must succeed");

    assert_eq!(exact.len(), 1499);
    assert_eq!(approximate.len(), 1499);
    assert!(exact.total_weight() <= approximate.total_weight() + 1e-9);
}

#[test]
fn worker_count_does_not_change_the_edge_list() {
    let data = random_points(600, 2, 13);
    let run = |jobs: usize| {
        BoruvkaBuilder::new()
            .with_min_samples(3)
            .with_n_jobs(jobs)
            .build()
            .expect("configuration is valid")
            .spanning_tree_kd(&data, 2)
            .expect("run must succeed")
    };
    assert_eq!(run(1).edges(), run(4).edges());
}

#[test]
fn edges_arrive_in_insertion_order_with_original_ids() {
    let data = random_points(50, 2, 3);
    let engine = BoruvkaBuilder::new()
        .with_min_samples(2)
        .build()
        .expect("configuration is valid");
    let mst = engine
        .spanning_tree_kd(&data, 2)
        .expect("run must succeed");

    let edges = mst.into_edges();
    assert_eq!(edges.len(), 49);
    for edge in &edges {
        assert!(edge.source() < 50);
        assert!(edge.sink() < 50);
        assert_ne!(edge.source(), edge.sink());
        assert!(edge.weight().is_finite());
    }
}

#[test]
fn oversized_min_samples_is_rejected() {
    let engine = BoruvkaBuilder::new()
        .with_min_samples(10)
        .build()
        .expect("configuration is valid");
    let err = engine
        .spanning_tree_kd(&random_points(6, 2, 1), 2)
        .expect_err("min_samples beyond the point count must fail");
    assert!(matches!(
        err,
        BoruvkaError::MinSamplesTooLarge {
            min_samples: 10,
            points: 6
        }
    ));
    assert_eq!(err.code(), BoruvkaErrorCode::MinSamplesTooLarge);
    assert_eq!(err.code().as_str(), "BORUVKA_MIN_SAMPLES_TOO_LARGE");
}

#[test]
fn metric_mismatch_is_rejected() {
    let data = random_points(10, 2, 5);
    let tree = KdTree::build(&data, 2, 20, Metric::Manhattan).expect("tree must build");
    let engine = BoruvkaBuilder::new()
        .with_min_samples(2)
        .with_metric(Metric::Euclidean)
        .build()
        .expect("configuration is valid");

    let err = engine
        .spanning_tree(&tree)
        .expect_err("metric mismatch must fail");
    assert!(matches!(err, BoruvkaError::MetricMismatch { .. }));
}

#[test]
fn tree_construction_errors_surface_through_the_engine() {
    let engine = BoruvkaBuilder::new()
        .with_min_samples(1)
        .build()
        .expect("configuration is valid");
    let err = engine
        .spanning_tree_kd(&[1.0, 2.0, 3.0], 2)
        .expect_err("ragged data must fail");
    assert!(matches!(
        err,
        BoruvkaError::Tree(TreeError::RaggedData { .. })
    ));
    assert_eq!(err.tree_code(), Some(TreeErrorCode::RaggedData));
}

#[test]
fn minkowski_engine_runs_end_to_end() {
    let metric = Metric::minkowski(3.0).expect("exponent is valid");
    let data = random_points(80, 2, 17);
    let mst = BoruvkaBuilder::new()
        .with_min_samples(3)
        .with_metric(metric)
        .build()
        .expect("configuration is valid")
        .spanning_tree_ball(&data, 2)
        .expect("run must succeed");
    assert_eq!(mst.len(), 79);
}

#[rstest]
#[case::half(0.5)]
#[case::double(2.0)]
#[case::quadruple(4.0)]
fn kd_total_weight_is_monotone_in_alpha(#[case] alpha: f64) {
    let data = random_points(120, 2, 23);
    let run = |a: f64| {
        BoruvkaBuilder::new()
            .with_min_samples(2)
            .with_alpha(a)
            .build()
            .expect("configuration is valid")
            .spanning_tree_kd(&data, 2)
            .expect("run must succeed")
            .total_weight()
    };
    // Larger alpha never increases any edge weight, so totals are ordered.
    assert!(run(alpha * 2.0) <= run(alpha) + 1e-9);
}
