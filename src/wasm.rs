use crate::config::NeighborDeck;
use crate::error::NeighborError;
use crate::neighbor::NeighborList;
use crate::points::FlatPoints;
use js_sys::{Array, Uint32Array};
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

/// Neighbor lists for a 3D point set, built from a flat coordinate array.
///
/// Only the nested lists are kept; the compressed views handed to JavaScript
/// are produced on request.
#[wasm_bindgen(js_name = NeighborList3D)]
pub struct NeighborList3D {
    inner: NeighborList,
}

#[wasm_bindgen(js_class = NeighborList3D)]
impl NeighborList3D {
    /// Builds the lists for `points` (`[x, y, z, x, y, z, ...]`).
    ///
    /// The search horizon is `horizon * safety_factor`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        points: &[f64],
        horizon: f64,
        safety_factor: f64,
    ) -> Result<NeighborList3D, JsError> {
        let deck = NeighborDeck {
            safety_factor,
            ..NeighborDeck::default()
        };
        Ok(Self::build(points, horizon, deck)?)
    }

    /// Builds the lists with options read from a JSON neighbor deck.
    #[wasm_bindgen(js_name = fromDeck)]
    pub fn from_deck(points: &[f64], horizon: f64, deck: &str) -> Result<NeighborList3D, JsError> {
        let deck = NeighborDeck::from_json_str(deck)?;
        Ok(Self::build(points, horizon, deck)?)
    }

    #[wasm_bindgen(getter)]
    pub fn count(&self) -> usize {
        self.inner.len()
    }

    #[wasm_bindgen(getter)]
    pub fn horizon(&self) -> f64 {
        self.inner.horizon()
    }

    pub fn neighbors(&self, i: usize) -> Result<Vec<u32>, JsError> {
        Ok(self.neighbor_ids(i)?)
    }

    pub fn neighbor(&self, i: usize, k: usize) -> Result<u32, JsError> {
        Ok(self.neighbor_id(i, k)?)
    }

    // Workaround for the fact that wasm-bindgen does not support nested vectors directly
    #[wasm_bindgen(js_name = lists)]
    pub fn wasm_lists(&self) -> Array {
        let result = Array::new_with_length(self.inner.len() as u32);
        for (i, list) in self.inner.iter().enumerate() {
            let ids: Vec<u32> = list.iter().map(|&j| j as u32).collect();
            result.set(i as u32, Uint32Array::from(ids.as_slice()).into());
        }
        result
    }

    /// Start offsets of every point's range in `compactIndices`, followed by the total.
    #[wasm_bindgen(getter, js_name = compactOffsets)]
    pub fn compact_offsets(&self) -> Vec<u32> {
        let mut offsets = Vec::with_capacity(self.inner.len() + 1);
        let mut total = 0u32;
        offsets.push(total);
        for list in self.inner.iter() {
            total += list.len() as u32;
            offsets.push(total);
        }
        offsets
    }

    #[wasm_bindgen(getter, js_name = compactIndices)]
    pub fn compact_indices(&self) -> Vec<u32> {
        self.inner.iter().flatten().map(|&j| j as u32).collect()
    }

    pub fn summary(&self, lvl: usize) -> String {
        self.inner.summary(0, lvl)
    }

    #[wasm_bindgen(js_name = isSymmetric)]
    pub fn is_symmetric(&self) -> bool {
        self.inner.is_symmetric()
    }
}

impl NeighborList3D {
    fn build(points: &[f64], horizon: f64, deck: NeighborDeck) -> Result<Self, NeighborError> {
        let cloud = FlatPoints::<3>::try_new(points)?;
        let horizon = deck.effective_horizon(horizon)?;
        let inner = NeighborList::build(horizon, &cloud, &deck)?;
        Ok(NeighborList3D { inner })
    }

    fn neighbor_ids(&self, i: usize) -> Result<Vec<u32>, NeighborError> {
        Ok(self.inner.neighbors(i)?.iter().map(|&j| j as u32).collect())
    }

    fn neighbor_id(&self, i: usize, k: usize) -> Result<u32, NeighborError> {
        Ok(self.inner.neighbor(i, k)? as u32)
    }

    /// The native neighbor list behind this wrapper.
    pub fn inner(&self) -> &NeighborList {
        &self.inner
    }
}

// JsError can only be created inside a JS host, so the error paths are
// checked through the typed helpers the bindings forward to.
#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: [f64; 12] = [
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        1.0, 1.0, 0.0, //
    ];

    fn sorted(mut ids: Vec<u32>) -> Vec<u32> {
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_build_from_flat_buffer() {
        let list = NeighborList3D::new(&SQUARE, 1.0, 1.01).unwrap();
        assert_eq!(list.count(), 4);
        assert!((list.horizon() - 1.01).abs() < 1e-12);
        assert!(list.is_symmetric());

        assert_eq!(sorted(list.neighbors(0).unwrap()), vec![1, 2]);
        assert_eq!(sorted(list.neighbors(3).unwrap()), vec![1, 2]);
        assert!([1, 2].contains(&list.neighbor(0, 1).unwrap()));
    }

    #[test]
    fn test_partial_point_is_rejected() {
        let coords = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 7.0];
        let result = NeighborList3D::build(&coords, 1.5, NeighborDeck::default());
        assert!(matches!(result, Err(NeighborError::MalformedPoints { len: 7, dim: 3 })));
    }

    #[test]
    fn test_invalid_horizon_is_rejected() {
        let result = NeighborList3D::build(&SQUARE, 0.0, NeighborDeck::default());
        assert!(matches!(result, Err(NeighborError::InvalidHorizon(_))));
    }

    #[test]
    fn test_out_of_range_access() {
        let list = NeighborList3D::new(&SQUARE, 1.0, 1.01).unwrap();
        assert!(matches!(
            list.neighbor_ids(4),
            Err(NeighborError::IndexOutOfRange { index: 4, len: 4 })
        ));
        assert!(matches!(
            list.neighbor_id(0, 2),
            Err(NeighborError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_compact_views_match_native_layout() {
        let coords: Vec<f64> = (0..20).flat_map(|i| [i as f64 * 0.5, 0.0, 0.0]).collect();
        let deck = r#"{ "Neighbor": { "Safety_Factor": 2.0 } }"#;
        let list = NeighborList3D::from_deck(&coords, 0.5, deck).unwrap();
        let compact = list.inner().to_compact();

        let offsets: Vec<usize> = list.compact_offsets().iter().map(|&o| o as usize).collect();
        let indices: Vec<usize> = list.compact_indices().iter().map(|&j| j as usize).collect();
        assert_eq!(offsets, compact.offsets());
        assert_eq!(indices, compact.indices());
        assert_eq!(offsets.len(), 21);
        assert_eq!(compact.total(), 2 * 2 + 2 * 3 + 16 * 4);
    }

    #[test]
    fn test_summary_levels() {
        let list = NeighborList3D::new(&SQUARE, 1.0, 1.01).unwrap();
        let short = list.summary(0);
        assert!(short.contains("Number of data = 4"));
        assert!(!short.contains("Total neighbors"));
        assert!(list.summary(1).contains("Total neighbors = 8"));
    }
}
