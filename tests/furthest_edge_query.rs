//! End-to-end tests for maximum-distance queries.

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use s2_edge_query::s2_index::{ChordAngle, Shape, ShapeIndex};
use s2_edge_query::textformat::{make_index, make_point};
use s2_edge_query::{
    ClosestEdgeQuery, ClosestEdgeQueryBase, Distance, EdgeTarget, FurthestEdgeQuery,
    FurthestEdgeTarget, FurthestPointTarget, MaxDistance, Options, PointTarget, Target,
};

fn random_sphere_points_with_rng<R: Rng>(n: usize, rng: &mut R) -> Vec<DVec3> {
    use std::f64::consts::TAU;
    (0..n)
        .map(|_| {
            let z: f64 = rng.gen_range(-1.0..1.0);
            let theta: f64 = rng.gen_range(0.0..TAU);
            let r = (1.0 - z * z).sqrt();
            DVec3::new(r * theta.cos(), r * theta.sin(), z)
        })
        .collect()
}

fn random_index(seed: u64, num_points: usize, num_polylines: usize) -> ShapeIndex {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut shapes = vec![Shape::Points(random_sphere_points_with_rng(num_points, &mut rng))];
    for _ in 0..num_polylines {
        shapes.push(Shape::Polyline(random_sphere_points_with_rng(3, &mut rng)));
    }
    ShapeIndex::new(shapes)
}

#[test]
fn test_furthest_point_on_meridian() {
    let index = make_index("0:0 | 1:0 | 2:0 | 3:0 # #");
    let mut query = ClosestEdgeQueryBase::<MaxDistance>::new(&index);
    let target = FurthestPointTarget::new(make_point("4:0"));
    let options = Options::default().with_max_edges(1);
    let results = query.find_closest_edges(&target, &options);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].shape_id, 0);
    assert_eq!(results[0].edge_id, Some(0));
    assert!((results[0].distance.chord_angle().degrees() - 4.0).abs() < 1e-13);
}

#[test]
fn test_results_are_furthest_first() {
    let index = make_index("0:0 | 1:0 | 2:0 | 3:0 # #");
    let mut query = FurthestEdgeQuery::new(&index);
    let results = query.find_furthest_edges(&FurthestPointTarget::new(make_point("4:0")));
    let ids: Vec<_> = results.iter().map(|r| r.edge_id).collect();
    assert_eq!(ids, vec![Some(0), Some(1), Some(2), Some(3)]);
    for (r, expected) in results.iter().zip([4.0, 3.0, 2.0, 1.0]) {
        assert!((r.distance.chord_angle().degrees() - expected).abs() < 1e-9);
    }
}

/// max_dist(X, Y) = pi - min_dist(-X, Y)
#[test]
fn test_supplementary_identity() {
    let index = random_index(21, 900, 40);
    let mut rng = ChaCha8Rng::seed_from_u64(22);
    let mut furthest = FurthestEdgeQuery::new(&index);
    let mut closest = ClosestEdgeQuery::new(&index);
    for p in random_sphere_points_with_rng(40, &mut rng) {
        let max = furthest.get_max_distance(&FurthestPointTarget::new(p));
        let min = closest.get_distance(&PointTarget::new(-p));
        let supplementary = ChordAngle::straight() - min;
        assert!(
            (max.length2() - supplementary.length2()).abs() < 1e-13,
            "max {} vs pi - min {}",
            max.degrees(),
            supplementary.degrees()
        );
    }

    for a in random_sphere_points_with_rng(15, &mut rng) {
        let b = (a + random_sphere_points_with_rng(1, &mut rng)[0] * 0.2).normalize();
        let max = furthest.get_max_distance(&FurthestEdgeTarget::new(a, b));
        let min = closest.get_distance(&EdgeTarget::new(-a, -b));
        assert!((max.length2() - (ChordAngle::straight() - min).length2()).abs() < 1e-13);
    }
}

fn check_against_brute_force<T: Target<MaxDistance>>(
    query: &mut ClosestEdgeQueryBase<MaxDistance>,
    target: &T,
    options: &Options<MaxDistance>,
    context: &str,
) {
    let optimized = query.find_closest_edges(target, options);
    assert!(!query.last_stats().brute_force, "{context}: expected the tree search");
    let expected = query.find_closest_edges(target, &options.with_brute_force_threshold(usize::MAX));
    assert_eq!(optimized, expected, "{context}");
    assert!(optimized.windows(2).all(|w| w[0].distance <= w[1].distance));
    assert!(optimized.iter().all(|r| r.distance < options.max_distance()));
}

#[test]
fn test_furthest_matches_brute_force() {
    let index = random_index(23, 1200, 60);
    let mut rng = ChaCha8Rng::seed_from_u64(24);
    let mut query = ClosestEdgeQueryBase::<MaxDistance>::new(&index);
    let option_grid = [
        Options::default().with_max_edges(1),
        Options::default().with_max_edges(10),
        Options::default().with_max_distance(MaxDistance::from_degrees(170.0)),
    ];
    for (i, p) in random_sphere_points_with_rng(20, &mut rng).into_iter().enumerate() {
        let b = (p + random_sphere_points_with_rng(1, &mut rng)[0] * 0.2).normalize();
        for (j, options) in option_grid.iter().enumerate() {
            let context = format!("target {i} options {j}");
            check_against_brute_force(&mut query, &FurthestPointTarget::new(p), options, &context);
            check_against_brute_force(&mut query, &FurthestEdgeTarget::new(p, b), options, &context);
        }
    }

    // With an error tolerance the answer may be up to max_error nearer than the
    // true furthest edge, never further.
    let max_error = ChordAngle::from_degrees(2.0);
    let approx_options = Options::default().with_max_edges(1).with_max_error(max_error);
    let exact_options = Options::default().with_max_edges(1);
    for p in random_sphere_points_with_rng(20, &mut rng) {
        let b = (p + random_sphere_points_with_rng(1, &mut rng)[0] * 0.2).normalize();
        let targets: [&dyn Target<MaxDistance>; 2] =
            [&FurthestPointTarget::new(p), &FurthestEdgeTarget::new(p, b)];
        for target in targets {
            let exact = query.find_closest_edges(target, &exact_options)[0].distance.chord_angle();
            let approx = query.find_closest_edges(target, &approx_options)[0].distance.chord_angle();
            assert!(approx <= exact);
            assert!(approx.degrees() >= exact.degrees() - 2.0 - 1e-9);
        }
    }
}

#[test]
fn test_max_distance_limits_results() {
    let index = make_index("0:0 | 0:45 | 0:80 | 0:135 | 0:170 # #");
    let options = Options::default().with_max_distance(MaxDistance::from_degrees(90.0));
    let mut query = FurthestEdgeQuery::with_options(&index, options);
    let results = query.find_furthest_edges(&FurthestPointTarget::new(make_point("0:0")));
    let ids: Vec<_> = results.iter().map(|r| r.edge_id).collect();
    // Strictly further than 90 degrees.
    assert_eq!(ids, vec![Some(4), Some(3)]);
}

#[test]
fn test_empty_index() {
    let index = ShapeIndex::default();
    let mut query = FurthestEdgeQuery::new(&index);
    let target = FurthestPointTarget::new(make_point("0:0"));
    assert!(query.find_furthest_edges(&target).is_empty());
    assert_eq!(query.get_max_distance(&target), ChordAngle::negative());
}

#[test]
fn test_zero_max_distance_returns_nothing() {
    let index = make_index("0:0 | 0:180 # #");
    let options = Options::default().with_max_distance(MaxDistance::zero());
    let mut query = FurthestEdgeQuery::with_options(&index, options);
    assert!(query
        .find_furthest_edges(&FurthestPointTarget::new(make_point("0:0")))
        .is_empty());
}

#[test]
fn test_include_interiors_containing_antipode() {
    let index = make_index("# # -2:178, -2:-178, 2:-178, 2:178");
    let options = Options::default().with_include_interiors(true);
    let mut query = FurthestEdgeQuery::with_options(&index, options);
    let results = query.find_furthest_edges(&FurthestPointTarget::new(make_point("0:0")));
    assert_eq!(results[0].edge_id, None);
    assert_eq!(results[0].distance, MaxDistance::zero());
    assert_eq!(results[0].distance.chord_angle(), ChordAngle::straight());
    assert_eq!(results.len(), 5);
}
