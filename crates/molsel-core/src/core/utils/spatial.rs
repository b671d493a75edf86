use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point3;

pub(crate) fn to_array(p: &Point3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}

/// For each query point, whether any reference point lies within `distance`.
///
/// An empty reference set yields all-false.
pub(crate) fn near_any(
    reference: Vec<[f64; 3]>,
    queries: &[Point3<f64>],
    distance: f64,
) -> Vec<bool> {
    if reference.is_empty() {
        return vec![false; queries.len()];
    }
    let tree: KdTree<f64, 3> = (&reference).into();
    let distance_sq = distance * distance;
    queries
        .iter()
        .map(|q| {
            let nearest = tree.nearest_one::<SquaredEuclidean>(&to_array(q));
            nearest.distance <= distance_sq
        })
        .collect()
}
