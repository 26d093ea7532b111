use crate::bounds::BoundingBox;
use crate::index::{RadiusSearch, squared_distance};
use crate::points::PointCloud;

/// Default maximum number of points in a leaf.
///
/// Balances query cost (larger leaves scan more points) against build cost and
/// tree size (smaller leaves create more nodes).
pub const DEFAULT_LEAF_SIZE: usize = 50;

const NO_CHILD: u32 = u32::MAX;

#[derive(Clone, Copy, Debug)]
struct KdNode<const D: usize> {
    // Tight box around all points below this node
    bounds: BoundingBox<D>,
    left: u32, // NO_CHILD if leaf
    right: u32,
    // Leaf data: indices[start..end]
    start: usize,
    end: usize,
    // Internal node data
    split_val: f64,
    axis: u8,
}

/// A k-d tree over a borrowed point cloud.
///
/// The tree is built once and never modified. It borrows the cloud it was built
/// from, so it cannot outlive the coordinates; coordinates are read back through
/// [`PointCloud`] during queries instead of being copied.
///
/// Nodes split at the median of the axis with the largest spread until a node
/// holds at most `leaf_size` points. Every node stores the bounding box of its
/// points, and a query skips any node whose box lies entirely outside the search
/// sphere. On clustered or collinear inputs the tree stays balanced but pruning
/// gets weaker, so queries degrade towards a linear scan.
pub struct KdTree<'a, P: ?Sized, const D: usize> {
    cloud: &'a P,
    nodes: Vec<KdNode<D>>,
    indices: Vec<usize>,
    leaf_size: usize,
    depth: usize,
}

impl<'a, P, const D: usize> KdTree<'a, P, D>
where
    P: PointCloud<D> + ?Sized,
{
    /// Builds a tree with [`DEFAULT_LEAF_SIZE`].
    pub fn new(cloud: &'a P) -> Self {
        Self::with_leaf_size(cloud, DEFAULT_LEAF_SIZE)
    }

    /// Builds a tree whose leaves hold at most `leaf_size` points (at least one).
    pub fn with_leaf_size(cloud: &'a P, leaf_size: usize) -> Self {
        let count = cloud.len();
        let mut tree = KdTree {
            cloud,
            nodes: Vec::new(),
            indices: (0..count).collect(),
            leaf_size: leaf_size.max(1),
            depth: 0,
        };

        if count == 0 {
            return tree;
        }

        // A balanced tree has about 2 * N / leaf_size nodes
        tree.nodes.reserve(2 * count / tree.leaf_size + 1);
        tree.build_recursive(0, count, 1);
        tree
    }

    fn build_recursive(&mut self, start: usize, end: usize, depth: usize) -> u32 {
        let count = end - start;
        self.depth = self.depth.max(depth);

        let mut bounds = BoundingBox::empty();
        for &idx in &self.indices[start..end] {
            bounds.extend(&self.cloud.point(idx));
        }

        if count <= self.leaf_size {
            let node_idx = self.nodes.len() as u32;
            self.nodes.push(KdNode {
                bounds,
                left: NO_CHILD,
                right: NO_CHILD,
                start,
                end,
                split_val: 0.0,
                axis: 0,
            });
            return node_idx;
        }

        let axis = bounds.widest_axis();

        // Median split, both halves are non-empty since count >= 2
        let cloud = self.cloud;
        self.indices[start..end].select_nth_unstable_by(count / 2, |&a, &b| {
            let va = cloud.coord(a, axis);
            let vb = cloud.coord(b, axis);
            va.partial_cmp(&vb).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = start + count / 2;
        let split_val = self.cloud.coord(self.indices[mid], axis);

        let left = self.build_recursive(start, mid, depth + 1);
        let right = self.build_recursive(mid, end, depth + 1);

        let node_idx = self.nodes.len() as u32;
        self.nodes.push(KdNode {
            bounds,
            left,
            right,
            start: 0,
            end: 0,
            split_val,
            axis: axis as u8,
        });
        node_idx
    }

    fn query_recursive<F>(&self, node_idx: u32, query: &[f64; D], radius_sq: f64, visitor: &mut F)
    where
        F: FnMut(usize, f64),
    {
        let node = &self.nodes[node_idx as usize];

        if node.bounds.dist_sq_to_point(query) > radius_sq {
            return;
        }

        // Leaf
        if node.left == NO_CHILD {
            for &idx in &self.indices[node.start..node.end] {
                let d2 = squared_distance(query, &self.cloud.point(idx));
                if d2 <= radius_sq {
                    visitor(idx, d2);
                }
            }
            return;
        }

        // Internal, nearest child first
        let diff = query[node.axis as usize] - node.split_val;
        let (first, second) = if diff <= 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        self.query_recursive(first, query, radius_sq, visitor);
        self.query_recursive(second, query, radius_sq, visitor);
    }

    /// The point cloud the tree was built from.
    pub fn cloud(&self) -> &'a P {
        self.cloud
    }

    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of levels, zero for an empty tree.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Bounding box of all points, `None` for an empty tree.
    pub fn bounds(&self) -> Option<BoundingBox<D>> {
        // Root is the last node pushed in our recursive build
        self.nodes.last().map(|root| root.bounds)
    }
}

impl<P, const D: usize> RadiusSearch<D> for KdTree<'_, P, D>
where
    P: PointCloud<D> + ?Sized,
{
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn visit_within<F>(&self, query: &[f64; D], radius_sq: f64, mut visitor: F)
    where
        F: FnMut(usize, f64),
    {
        if self.nodes.is_empty() {
            return;
        }
        let root_idx = (self.nodes.len() - 1) as u32;
        self.query_recursive(root_idx, query, radius_sq, &mut visitor);
    }
}
