use crate::config::NeighborDeck;
use crate::error::NeighborError;
use crate::index::kdtree::KdTree;
use crate::index::{RadiusSearch, SearchMatch};
use crate::points::PointCloud;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Per-point lists of all other points within the horizon.
///
/// Built in one go by [`NeighborList::build`]: a k-d tree is constructed over the
/// points, then every point issues one radius query against the shared tree in
/// parallel. A `NeighborList` value only exists once every list is filled; if the
/// parallel phase fails, construction returns an error and nothing is kept.
///
/// Lists never contain the point itself. The order inside one list follows the
/// index's traversal and must not be relied upon.
#[derive(Clone, Debug)]
pub struct NeighborList {
    horizon: f64,
    search_radius_sq: f64,
    deck: NeighborDeck,
    lists: Vec<Vec<usize>>,
}

impl NeighborList {
    /// Builds the neighbor lists of `points` for the given `horizon`.
    ///
    /// The horizon is taken as is: it must be nonnegative and already include any
    /// safety factor (see [`NeighborDeck::effective_horizon`]). The deck is copied
    /// for diagnostics and otherwise not interpreted.
    pub fn build<P, const D: usize>(
        horizon: f64,
        points: &P,
        deck: &NeighborDeck,
    ) -> Result<Self, NeighborError>
    where
        P: PointCloud<D> + ?Sized,
    {
        let tree = KdTree::new(points);
        debug!(
            "k-d tree over {} points: {} nodes, depth {}, leaf size {}",
            points.len(),
            tree.node_count(),
            tree.depth(),
            tree.leaf_size()
        );
        Self::build_with_index(horizon, points, &tree, deck)
    }

    /// Builds the neighbor lists using an already constructed spatial index over `points`.
    pub fn build_with_index<P, I, const D: usize>(
        horizon: f64,
        points: &P,
        index: &I,
        deck: &NeighborDeck,
    ) -> Result<Self, NeighborError>
    where
        P: PointCloud<D> + ?Sized,
        I: RadiusSearch<D>,
    {
        if index.len() != points.len() {
            return Err(NeighborError::PointCountMismatch {
                index: index.len(),
                points: points.len(),
            });
        }

        let search_radius_sq = horizon * horizon;

        let lists = panic::catch_unwind(AssertUnwindSafe(|| {
            query_all(points, index, search_radius_sq)
        }))
        .map_err(|payload| NeighborError::BuildFailure(panic_message(payload.as_ref())))?;

        let list = NeighborList {
            horizon,
            search_radius_sq,
            deck: deck.clone(),
            lists,
        };
        list.log_outcome();
        Ok(list)
    }

    /// Like [`NeighborList::build`], but runs on a dedicated pool of `threads` workers
    /// instead of the global rayon pool. Zero selects rayon's default.
    pub fn build_in_pool<P, const D: usize>(
        horizon: f64,
        points: &P,
        deck: &NeighborDeck,
        threads: usize,
    ) -> Result<Self, NeighborError>
    where
        P: PointCloud<D> + ?Sized,
    {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
        pool.install(|| Self::build(horizon, points, deck))
    }

    /// Neighbors of point `i`.
    pub fn neighbors(&self, i: usize) -> Result<&[usize], NeighborError> {
        self.lists
            .get(i)
            .map(Vec::as_slice)
            .ok_or(NeighborError::IndexOutOfRange { index: i, len: self.lists.len() })
    }

    /// The `k`-th neighbor of point `i`.
    pub fn neighbor(&self, i: usize, k: usize) -> Result<usize, NeighborError> {
        let list = self.neighbors(i)?;
        list.get(k)
            .copied()
            .ok_or(NeighborError::IndexOutOfRange { index: k, len: list.len() })
    }

    /// Read-only view of all lists, indexed by point.
    pub fn lists(&self) -> &[Vec<usize>] {
        &self.lists
    }

    /// Mutable handle on the lists, for post-processing steps that augment them in place.
    pub fn lists_mut(&mut self) -> &mut Vec<Vec<usize>> {
        &mut self.lists
    }

    pub fn into_lists(self) -> Vec<Vec<usize>> {
        self.lists
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vec<usize>> {
        self.lists.iter()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// The squared radius every query was issued with.
    pub fn search_radius_sq(&self) -> f64 {
        self.search_radius_sq
    }

    pub fn deck(&self) -> &NeighborDeck {
        &self.deck
    }

    /// Distribution of neighbor counts over all points.
    pub fn stats(&self) -> NeighborStats {
        NeighborStats::from_lists(&self.lists)
    }

    /// True if `j` lists `i` whenever `i` lists `j`.
    pub fn is_symmetric(&self) -> bool {
        let sorted: Vec<Vec<usize>> = self
            .lists
            .par_iter()
            .map(|list| {
                let mut list = list.clone();
                list.sort_unstable();
                list
            })
            .collect();

        sorted.par_iter().enumerate().all(|(i, list)| {
            list.iter()
                .all(|&j| sorted.get(j).is_some_and(|other| other.binary_search(&i).is_ok()))
        })
    }

    /// Copies the lists into a compressed layout with a single allocation for all indices.
    pub fn to_compact(&self) -> CompactNeighborList {
        CompactNeighborList::from(self)
    }

    /// Human-readable description, indented by `nt` tabs.
    ///
    /// Level 0 lists the parameters and the number of points; higher levels add
    /// the distribution of neighbor counts.
    pub fn summary(&self, nt: usize, lvl: usize) -> String {
        Summary { list: self, nt, lvl }.to_string()
    }

    fn log_outcome(&self) {
        let stats = self.stats();
        info!(
            "neighbor list built: {} points, horizon {}, {} neighbors (min {}, max {}, mean {:.2})",
            stats.points, self.horizon, stats.total, stats.min, stats.max, stats.mean
        );
        match HorizonFit::of(&stats) {
            HorizonFit::TooSmall => warn!(
                "no point has a neighbor within horizon {}, it is likely below the point spacing",
                self.horizon
            ),
            HorizonFit::TooLarge => warn!(
                "every point sees all {} others within horizon {}, it likely spans the domain",
                stats.points - 1,
                self.horizon
            ),
            HorizonFit::Plausible if stats.isolated > 0 => {
                debug!("{} points have no neighbors", stats.isolated)
            }
            HorizonFit::Plausible => {}
        }
    }
}

impl<'a> IntoIterator for &'a NeighborList {
    type Item = &'a Vec<usize>;
    type IntoIter = std::slice::Iter<'a, Vec<usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.lists.iter()
    }
}

impl fmt::Display for NeighborList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Summary { list: self, nt: 0, lvl: 1 }, f)
    }
}

/// One radius query per point, in parallel. Each task writes only its own output slot.
fn query_all<P, I, const D: usize>(points: &P, index: &I, radius_sq: f64) -> Vec<Vec<usize>>
where
    P: PointCloud<D> + ?Sized,
    I: RadiusSearch<D>,
{
    (0..points.len())
        .into_par_iter()
        .map_init(Vec::new, |matches: &mut Vec<SearchMatch>, i| {
            index.radius_search_into(&points.point(i), radius_sq, matches);
            matches
                .iter()
                .filter(|m| m.index != i)
                .map(|m| m.index)
                .collect::<Vec<usize>>()
        })
        .collect()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "parallel query phase panicked".to_string()
    }
}

/// Coarse check of the horizon against the point spacing.
#[derive(Clone, Copy, Debug, PartialEq)]
enum HorizonFit {
    /// Every point is isolated.
    TooSmall,
    /// Every point lists every other point.
    TooLarge,
    Plausible,
}

impl HorizonFit {
    fn of(stats: &NeighborStats) -> Self {
        if stats.points > 1 && stats.isolated == stats.points {
            HorizonFit::TooSmall
        } else if stats.points > 2 && stats.min == stats.points - 1 {
            HorizonFit::TooLarge
        } else {
            HorizonFit::Plausible
        }
    }
}

struct Summary<'a> {
    list: &'a NeighborList,
    nt: usize,
    lvl: usize,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tabs = "\t".repeat(self.nt);
        let list = self.list;
        writeln!(f, "{tabs}------- Neighbor --------")?;
        writeln!(f)?;
        writeln!(f, "{tabs}Horizon = {}", list.horizon)?;
        writeln!(f, "{tabs}Search radius squared = {}", list.search_radius_sq)?;
        writeln!(f, "{tabs}Safety factor = {}", list.deck.safety_factor)?;
        writeln!(f, "{tabs}Add partial elements = {}", list.deck.add_partial_elems)?;
        writeln!(f, "{tabs}Number of data = {}", list.len())?;
        if self.lvl > 0 {
            let stats = list.stats();
            writeln!(f, "{tabs}Total neighbors = {}", stats.total)?;
            writeln!(
                f,
                "{tabs}Neighbors per point: min = {}, max = {}, mean = {:.3}",
                stats.min, stats.max, stats.mean
            )?;
            writeln!(f, "{tabs}Isolated points = {}", stats.isolated)?;
        }
        writeln!(f, "{tabs}")
    }
}

/// Summary of neighbor counts, for spotting a horizon that is too small or too
/// large for the point spacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NeighborStats {
    /// Number of points.
    pub points: usize,
    /// Sum of all list lengths. Every bond is counted from both ends.
    pub total: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    /// Points with an empty list.
    pub isolated: usize,
}

impl NeighborStats {
    fn from_lists(lists: &[Vec<usize>]) -> Self {
        if lists.is_empty() {
            return NeighborStats { points: 0, total: 0, min: 0, max: 0, mean: 0.0, isolated: 0 };
        }

        let mut stats = NeighborStats {
            points: lists.len(),
            total: 0,
            min: usize::MAX,
            max: 0,
            mean: 0.0,
            isolated: 0,
        };
        for list in lists {
            let n = list.len();
            stats.total += n;
            stats.min = stats.min.min(n);
            stats.max = stats.max.max(n);
            if n == 0 {
                stats.isolated += 1;
            }
        }
        stats.mean = stats.total as f64 / stats.points as f64;
        stats
    }
}

/// Neighbor lists in compressed sparse row layout.
///
/// All indices live in one buffer and point `i` owns `indices[offsets[i]..offsets[i + 1]]`,
/// which avoids one heap allocation per point when N runs into the millions.
#[derive(Clone, Debug, PartialEq)]
pub struct CompactNeighborList {
    offsets: Vec<usize>,
    indices: Vec<usize>,
}

impl CompactNeighborList {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of stored neighbor indices.
    pub fn total(&self) -> usize {
        self.indices.len()
    }

    pub fn neighbors(&self, i: usize) -> Result<&[usize], NeighborError> {
        if i >= self.len() {
            return Err(NeighborError::IndexOutOfRange { index: i, len: self.len() });
        }
        Ok(&self.indices[self.offsets[i]..self.offsets[i + 1]])
    }

    pub fn neighbor(&self, i: usize, k: usize) -> Result<usize, NeighborError> {
        let list = self.neighbors(i)?;
        list.get(k)
            .copied()
            .ok_or(NeighborError::IndexOutOfRange { index: k, len: list.len() })
    }

    /// Start of each point's range in [`CompactNeighborList::indices`], followed by the total.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl From<&NeighborList> for CompactNeighborList {
    fn from(list: &NeighborList) -> Self {
        let mut offsets = Vec::with_capacity(list.len() + 1);
        offsets.push(0);
        let mut total = 0;
        for l in list.iter() {
            total += l.len();
            offsets.push(total);
        }

        let mut indices = Vec::with_capacity(total);
        for l in list.iter() {
            indices.extend_from_slice(l);
        }

        CompactNeighborList { offsets, indices }
    }
}
