//! Point containers the spatial indices can read from.
//!
//! Indices never own coordinates. They address them through [`PointCloud`], which
//! only asks for the number of points and a single coordinate of a point, so a
//! mesh reader can hand over whatever layout it already has.

use crate::bounds::BoundingBox;
use crate::error::NeighborError;
use rand::prelude::*;
use rand::rngs::StdRng;

/// Read-only access to an ordered set of points in `D` dimensions.
///
/// A point is identified by its position `0..len()` in the container.
pub trait PointCloud<const D: usize>: Sync {
    /// Number of points in the cloud.
    fn len(&self) -> usize;

    /// The `axis` component of the point at `index`.
    fn coord(&self, index: usize, axis: usize) -> f64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All components of the point at `index`.
    #[inline]
    fn point(&self, index: usize) -> [f64; D] {
        std::array::from_fn(|axis| self.coord(index, axis))
    }

    /// Tight bounding box of all points, inverted (see [`BoundingBox::empty`]) for an empty cloud.
    fn bounds(&self) -> BoundingBox<D> {
        let mut bounds = BoundingBox::empty();
        for i in 0..self.len() {
            bounds.extend(&self.point(i));
        }
        bounds
    }
}

impl<const D: usize> PointCloud<D> for [[f64; D]] {
    #[inline]
    fn len(&self) -> usize {
        <[[f64; D]]>::len(self)
    }

    #[inline]
    fn coord(&self, index: usize, axis: usize) -> f64 {
        self[index][axis]
    }

    #[inline]
    fn point(&self, index: usize) -> [f64; D] {
        self[index]
    }
}

impl<const D: usize> PointCloud<D> for Vec<[f64; D]> {
    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn coord(&self, index: usize, axis: usize) -> f64 {
        self[index][axis]
    }

    #[inline]
    fn point(&self, index: usize) -> [f64; D] {
        self[index]
    }
}

/// A view over a flat coordinate buffer `[x, y, z, x, y, z, ...]`.
///
/// [`FlatPoints::new`] ignores trailing values that do not form a complete
/// point; [`FlatPoints::try_new`] rejects them.
#[derive(Clone, Copy, Debug)]
pub struct FlatPoints<'a, const D: usize> {
    coords: &'a [f64],
}

impl<'a, const D: usize> FlatPoints<'a, D> {
    pub fn new(coords: &'a [f64]) -> Self {
        Self { coords }
    }

    /// Like [`FlatPoints::new`], but fails unless `coords` holds whole points.
    pub fn try_new(coords: &'a [f64]) -> Result<Self, NeighborError> {
        if coords.len() % D != 0 {
            return Err(NeighborError::MalformedPoints { len: coords.len(), dim: D });
        }
        Ok(Self { coords })
    }

    pub fn as_slice(&self) -> &'a [f64] {
        self.coords
    }
}

impl<const D: usize> PointCloud<D> for FlatPoints<'_, D> {
    #[inline]
    fn len(&self) -> usize {
        self.coords.len() / D
    }

    #[inline]
    fn coord(&self, index: usize, axis: usize) -> f64 {
        self.coords[index * D + axis]
    }
}

/// Uniformly distributed points inside `bounds`, reproducible for a given `seed`.
pub fn random_points<const D: usize>(
    count: usize,
    bounds: &BoundingBox<D>,
    seed: u64,
) -> Vec<[f64; D]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            std::array::from_fn(|axis| bounds.min[axis] + rng.r#gen::<f64>() * bounds.spread(axis))
        })
        .collect()
}

/// Points of a regular lattice with `counts[axis]` nodes per axis, starting at the origin.
///
/// This is the node layout a uniform peridynamic discretization produces. The
/// first axis varies fastest.
pub fn lattice_points<const D: usize>(counts: [usize; D], spacing: f64) -> Vec<[f64; D]> {
    let total: usize = counts.iter().product();
    let mut points = Vec::with_capacity(total);
    for flat in 0..total {
        let mut rem = flat;
        let point = std::array::from_fn(|axis| {
            let c = rem % counts[axis];
            rem /= counts[axis];
            c as f64 * spacing
        });
        points.push(point);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_points_view() {
        let coords = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let cloud = FlatPoints::<3>::new(&coords);
        assert_eq!(PointCloud::len(&cloud), 2);
        assert_eq!(cloud.point(1), [3.0, 4.0, 5.0]);
        assert_eq!(cloud.coord(0, 2), 2.0);
    }

    #[test]
    fn test_flat_points_rejects_partial_point() {
        let coords = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert!(matches!(
            FlatPoints::<3>::try_new(&coords),
            Err(NeighborError::MalformedPoints { len: 7, dim: 3 })
        ));

        let cloud = FlatPoints::<3>::try_new(&coords[..6]).unwrap();
        assert_eq!(PointCloud::len(&cloud), 2);
        assert!(FlatPoints::<2>::try_new(&[]).is_ok());
    }

    #[test]
    fn test_random_points_reproducible() {
        let bounds = BoundingBox::new([0.0, 0.0, 0.0], [2.0, 3.0, 4.0]);
        let a = random_points(100, &bounds, 7);
        let b = random_points(100, &bounds, 7);
        assert_eq!(a, b);
        assert!(a.iter().all(|p| bounds.contains(p)));
    }

    #[test]
    fn test_lattice_points() {
        let points = lattice_points([3, 2, 2], 0.5);
        assert_eq!(points.len(), 12);
        assert_eq!(points[0], [0.0, 0.0, 0.0]);
        assert_eq!(points[1], [0.5, 0.0, 0.0]);
        assert_eq!(points[3], [0.0, 0.5, 0.0]);
        assert_eq!(points[11], [1.0, 0.5, 0.5]);
    }

    #[test]
    fn test_cloud_bounds() {
        let points = vec![[1.0, -1.0, 0.0], [3.0, 2.0, -5.0]];
        let b = PointCloud::bounds(&points);
        assert_eq!(b.min, [1.0, -1.0, -5.0]);
        assert_eq!(b.max, [3.0, 2.0, 0.0]);
    }
}
