#![allow(dead_code)]

use perineighbor::{BoundingBox, NeighborList};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn unit_cube() -> BoundingBox<3> {
    BoundingBox::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0])
}

/// O(N^2) reference: for every point, the sorted indices of all other points within `horizon`.
pub fn brute_force_neighbors(points: &[[f64; 3]], horizon: f64) -> Vec<Vec<usize>> {
    let radius_sq = horizon * horizon;
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            points
                .iter()
                .enumerate()
                .filter(|&(j, q)| {
                    let dx = q[0] - p[0];
                    let dy = q[1] - p[1];
                    let dz = q[2] - p[2];
                    j != i && dx * dx + dy * dy + dz * dz <= radius_sq
                })
                .map(|(j, _)| j)
                .collect()
        })
        .collect()
}

pub fn sorted(list: &[usize]) -> Vec<usize> {
    let mut v = list.to_vec();
    v.sort_unstable();
    v
}

/// All lists with their entries sorted, for comparing membership independent of order.
pub fn sorted_lists(list: &NeighborList) -> Vec<Vec<usize>> {
    list.iter().map(|l| sorted(l)).collect()
}
