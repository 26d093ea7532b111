//! The neighbor section of a simulation input deck.
//!
//! The deck is read with serde. Keys follow the input file convention
//! (`Safety_Factor`, `Add_Partial_Elems`) and missing keys fall back to their
//! defaults. A deck may be given either as the section itself or as a full input
//! document with a top-level `Neighbor` object.
//!
//! ```
//! use perineighbor::NeighborDeck;
//!
//! let deck = NeighborDeck::from_json_str(r#"{ "Neighbor": { "Safety_Factor": 1.2 } }"#).unwrap();
//! assert_eq!(deck.safety_factor, 1.2);
//! assert!(!deck.add_partial_elems);
//! assert!((deck.effective_horizon(0.5).unwrap() - 0.6).abs() < 1e-12);
//! ```

use crate::error::NeighborError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User-specified options for neighbor list construction.
///
/// The builder keeps a copy of the deck for diagnostics but does not interpret it:
/// the horizon handed to [`crate::NeighborList::build`] is expected to already
/// include the safety factor (see [`NeighborDeck::effective_horizon`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborDeck {
    /// Multiplier applied to the horizon.
    #[serde(rename = "Safety_Factor")]
    pub safety_factor: f64,

    /// Whether elements only partially covered by the horizon are added to a neighbor set.
    /// Consumed by element-aware post-processing, not by the point builder.
    #[serde(rename = "Add_Partial_Elems")]
    pub add_partial_elems: bool,
}

impl Default for NeighborDeck {
    fn default() -> Self {
        Self {
            safety_factor: 1.0,
            add_partial_elems: false,
        }
    }
}

impl NeighborDeck {
    /// Parses a deck from JSON, accepting the bare section or a document with a `Neighbor` key.
    pub fn from_json_str(input: &str) -> Result<Self, NeighborError> {
        let mut value: Value = serde_json::from_str(input)?;
        if let Some(section) = value.get_mut("Neighbor").map(Value::take) {
            value = section;
        }
        // An empty section means defaults
        if value.is_null() {
            value = Value::Object(Map::new());
        }
        let deck: NeighborDeck = serde_json::from_value(value)?;
        deck.validate()?;
        Ok(deck)
    }

    /// Checks that the safety factor is usable.
    pub fn validate(&self) -> Result<(), NeighborError> {
        if !(self.safety_factor > 0.0 && self.safety_factor.is_finite()) {
            return Err(NeighborError::InvalidSafetyFactor(self.safety_factor));
        }
        Ok(())
    }

    /// The search horizon for a material horizon `base`: `base * safety_factor`.
    pub fn effective_horizon(&self, base: f64) -> Result<f64, NeighborError> {
        if !(base > 0.0 && base.is_finite()) {
            return Err(NeighborError::InvalidHorizon(base));
        }
        self.validate()?;
        Ok(base * self.safety_factor)
    }
}
