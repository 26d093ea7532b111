use crate::bounds::BoundingBox;
use crate::index::{RadiusSearch, squared_distance};
use crate::points::PointCloud;

/// A spatial index based on a uniform grid.
///
/// This structure divides the bounding box of the cloud into bins (voxels) of a
/// fixed edge length, ideally the horizon, so that a radius query only has to
/// look at the bins overlapping the query's bounding cube. It is generally
/// faster than a tree for uniform node layouts but degrades for clustered data
/// or very large sparse domains. The number of bins is capped relative to the
/// number of points; when the cap kicks in bins become wider than requested,
/// which costs speed but not correctness.
pub struct CellGrid<'a, P: ?Sized, const D: usize> {
    cloud: &'a P,
    bounds: BoundingBox<D>,
    /// Number of bins along each axis.
    res: [usize; D],
    /// Scale factor from coordinate offset to bin coordinate, per axis.
    scale: [f64; D],
    /// Maximum valid bin coordinate, per axis.
    limit: [f64; D],
    /// Stride of each axis in the flat bin index.
    stride: [usize; D],
    /// The grid bins, each containing a list of point indices.
    bins: Vec<Vec<usize>>,
}

impl<'a, P, const D: usize> CellGrid<'a, P, D>
where
    P: PointCloud<D> + ?Sized,
{
    /// Creates a grid over `cloud` with bins of edge length `cell_size`.
    ///
    /// A non-positive or non-finite `cell_size` yields a single bin.
    pub fn new(cloud: &'a P, cell_size: f64) -> Self {
        let count = cloud.len();
        let bounds = if count == 0 {
            BoundingBox::new([0.0; D], [0.0; D])
        } else {
            cloud.bounds()
        };

        // Keep the total number of bins within a small multiple of the point count
        let max_per_axis =
            ((count.max(1) * 8) as f64).powf(1.0 / D as f64).ceil().max(1.0) as usize;

        let res: [usize; D] = std::array::from_fn(|axis| {
            let spread = bounds.spread(axis);
            if cell_size > 0.0 && cell_size.is_finite() && spread > 0.0 {
                (((spread / cell_size).floor() as usize).saturating_add(1)).clamp(1, max_per_axis)
            } else {
                1
            }
        });
        let scale: [f64; D] = std::array::from_fn(|axis| {
            let spread = bounds.spread(axis);
            if spread > 0.0 { res[axis] as f64 / spread } else { 0.0 }
        });
        let limit: [f64; D] = std::array::from_fn(|axis| (res[axis] as f64) - 1e-5);

        let mut stride = [1usize; D];
        for axis in 1..D {
            stride[axis] = stride[axis - 1] * res[axis - 1];
        }
        let total_bins: usize = res.iter().product();

        let mut grid = CellGrid {
            cloud,
            bounds,
            res,
            scale,
            limit,
            stride,
            bins: vec![Vec::new(); total_bins],
        };

        for i in 0..count {
            let bin_idx = grid.get_bin_index(&cloud.point(i));
            grid.bins[bin_idx].push(i);
        }
        grid
    }

    #[inline]
    fn bin_coord(&self, axis: usize, v: f64) -> usize {
        ((v - self.bounds.min[axis]) * self.scale[axis]).clamp(0.0, self.limit[axis]) as usize
    }

    /// Calculates the linear index of the bin containing `point`.
    ///
    /// Points outside the grid are clamped to the border bins.
    pub fn get_bin_index(&self, point: &[f64; D]) -> usize {
        (0..D).map(|axis| self.bin_coord(axis, point[axis]) * self.stride[axis]).sum()
    }

    /// Number of bins along each axis.
    pub fn resolution(&self) -> [usize; D] {
        self.res
    }

    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }
}

impl<P, const D: usize> RadiusSearch<D> for CellGrid<'_, P, D>
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
        if self.cloud.is_empty() || !(radius_sq >= 0.0) {
            return;
        }

        // Pad the reach a little so rounding in sqrt never drops a bin holding a boundary point
        let reach = radius_sq.sqrt() * (1.0 + 1e-9) + f64::MIN_POSITIVE;
        let lo: [usize; D] = std::array::from_fn(|axis| self.bin_coord(axis, query[axis] - reach));
        let hi: [usize; D] = std::array::from_fn(|axis| self.bin_coord(axis, query[axis] + reach));

        // Odometer over the bin range lo..=hi
        let mut cursor = lo;
        loop {
            let bin_index: usize = (0..D).map(|axis| cursor[axis] * self.stride[axis]).sum();
            for &j in &self.bins[bin_index] {
                let d2 = squared_distance(query, &self.cloud.point(j));
                if d2 <= radius_sq {
                    visitor(j, d2);
                }
            }

            let mut axis = 0;
            loop {
                if axis == D {
                    return;
                }
                if cursor[axis] < hi[axis] {
                    cursor[axis] += 1;
                    break;
                }
                cursor[axis] = lo[axis];
                axis += 1;
            }
        }
    }
}
