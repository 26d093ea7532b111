/// Generic axis-aligned bounding box for N-dimensional space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox<const D: usize> {
    pub min: [f64; D],
    pub max: [f64; D],
}

impl<const D: usize> BoundingBox<D> {
    pub fn new(min: [f64; D], max: [f64; D]) -> Self {
        Self { min, max }
    }

    /// An inverted box that any call to [`BoundingBox::extend`] will overwrite.
    pub fn empty() -> Self {
        Self {
            min: [f64::INFINITY; D],
            max: [f64::NEG_INFINITY; D],
        }
    }

    /// Grows the box so that it contains `point`.
    #[inline]
    pub fn extend(&mut self, point: &[f64; D]) {
        for axis in 0..D {
            let v = point[axis];
            if v < self.min[axis] { self.min[axis] = v; }
            if v > self.max[axis] { self.max[axis] = v; }
        }
    }

    /// True if no point has been added to the box yet.
    pub fn is_empty(&self) -> bool {
        (0..D).any(|axis| self.min[axis] > self.max[axis])
    }

    pub fn contains(&self, point: &[f64; D]) -> bool {
        (0..D).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    /// Extent of the box along `axis`.
    #[inline]
    pub fn spread(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }

    /// The axis with the largest extent. Ties go to the lower axis.
    pub fn widest_axis(&self) -> usize {
        let mut best = 0;
        for axis in 1..D {
            if self.spread(axis) > self.spread(best) {
                best = axis;
            }
        }
        best
    }

    /// Squared distance from `point` to the closest point of the box, zero if inside.
    ///
    /// Every per-axis gap is computed from a coordinate that belongs to the box,
    /// so the result never exceeds the squared distance to any point inside it.
    #[inline]
    pub fn dist_sq_to_point(&self, point: &[f64; D]) -> f64 {
        let mut d2 = 0.0;
        for axis in 0..D {
            let v = point[axis];
            if v < self.min[axis] {
                let gap = self.min[axis] - v;
                d2 += gap * gap;
            } else if v > self.max[axis] {
                let gap = v - self.max[axis];
                d2 += gap * gap;
            }
        }
        d2
    }
}
