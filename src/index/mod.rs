use crate::points::PointCloud;

pub mod grid;
pub mod kdtree;

/// One hit of a radius query: the point's index in the cloud and its squared distance to the query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchMatch {
    pub index: usize,
    pub dist_sq: f64,
}

/// Trait defining an immutable fixed-radius spatial index.
/// This allows swapping between the k-d tree, a uniform grid or a linear scan.
///
/// All radii are passed squared. A point is a match when its squared distance to
/// the query, as computed by [`squared_distance`], is `<= radius_sq`; points on the
/// sphere are included. The order of matches is implementation-defined.
pub trait RadiusSearch<const D: usize>: Send + Sync {
    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls `visitor(index, dist_sq)` once for every indexed point within the radius.
    fn visit_within<F>(&self, query: &[f64; D], radius_sq: f64, visitor: F)
    where
        F: FnMut(usize, f64);

    /// Clears `out` and fills it with all matches. Reusing `out` across queries avoids allocations.
    fn radius_search_into(&self, query: &[f64; D], radius_sq: f64, out: &mut Vec<SearchMatch>) {
        out.clear();
        self.visit_within(query, radius_sq, |index, dist_sq| {
            out.push(SearchMatch { index, dist_sq })
        });
    }

    /// All indexed points within the radius.
    fn radius_search(&self, query: &[f64; D], radius_sq: f64) -> Vec<SearchMatch> {
        let mut out = Vec::new();
        self.radius_search_into(query, radius_sq, &mut out);
        out
    }
}

/// Squared Euclidean distance, summed in axis order.
///
/// Every index goes through this function so that all of them agree on points
/// lying exactly on the search sphere.
#[inline]
pub fn squared_distance<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    let mut d2 = 0.0;
    for axis in 0..D {
        let d = b[axis] - a[axis];
        d2 += d * d;
    }
    d2
}

/// A linear scan over all points.
///
/// O(N) per query. It is the reference the other indices are checked against
/// and is perfectly adequate for a few hundred points.
pub struct BruteForce<'a, P: ?Sized, const D: usize> {
    cloud: &'a P,
}

impl<'a, P, const D: usize> BruteForce<'a, P, D>
where
    P: PointCloud<D> + ?Sized,
{
    pub fn new(cloud: &'a P) -> Self {
        Self { cloud }
    }
}

impl<P, const D: usize> RadiusSearch<D> for BruteForce<'_, P, D>
where
    P: PointCloud<D> + ?Sized,
{
    fn len(&self) -> usize {
        self.cloud.len()
    }

    fn visit_within<F>(&self, query: &[f64; D], radius_sq: f64, mut visitor: F)
    where
        F: FnMut(usize, f64),
    {
        for j in 0..self.cloud.len() {
            let d2 = squared_distance(query, &self.cloud.point(j));
            if d2 <= radius_sq {
                visitor(j, d2);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_distance_is_symmetric() {
        let a = [0.1, 0.2, 0.3];
        let b = [1.7, -0.4, 2.2];
        assert_eq!(squared_distance(&a, &b), squared_distance(&b, &a));
        assert!((squared_distance(&[0.0, 0.0, 0.0], &[1.0, 2.0, 2.0]) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_brute_force_boundary_inclusive() {
        let points = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let index = BruteForce::new(&points);

        let mut hits: Vec<usize> =
            index.radius_search(&[0.0, 0.0, 0.0], 1.0).iter().map(|m| m.index).collect();
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 1]);

        let hits = index.radius_search(&[0.0, 0.0, 0.0], 0.0);
        assert_eq!(hits, vec![SearchMatch { index: 0, dist_sq: 0.0 }]);
    }
}
