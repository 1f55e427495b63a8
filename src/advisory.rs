//! Hints shown next to an empty result set.
//!
//! These are heuristics only. They never block a query and never turn an
//! empty page into an error.

use crate::filters::{FilterState, MAX_ROOMS};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryThresholds {
    /// Room filters at or above this count get a "reduce" hint
    pub room_count: u32,
    /// Region holding most of the inventory
    pub majority_region: String,
}

impl Default for AdvisoryThresholds {
    fn default() -> Self {
        Self {
            room_count: MAX_ROOMS,
            majority_region: "Addis Ababa".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AdvisoryHint {
    ReduceBedrooms { bedrooms: u32 },
    ReduceBathrooms { bathrooms: u32 },
    TryMajorityRegion { region: String },
}

impl fmt::Display for AdvisoryHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisoryHint::ReduceBedrooms { bedrooms } => write!(
                f,
                "Few listings have {} or more bedrooms. Try reducing the bedroom count.",
                bedrooms
            ),
            AdvisoryHint::ReduceBathrooms { bathrooms } => write!(
                f,
                "Few listings have {} or more bathrooms. Try reducing the bathroom count.",
                bathrooms
            ),
            AdvisoryHint::TryMajorityRegion { region } => {
                write!(f, "Most of our inventory is in {}. Try searching there.", region)
            }
        }
    }
}

pub fn hints_for(filters: &FilterState, thresholds: &AdvisoryThresholds) -> Vec<AdvisoryHint> {
    let mut hints = Vec::new();

    if let Some(bedrooms) = filters.bedrooms.filter(|n| *n >= thresholds.room_count) {
        hints.push(AdvisoryHint::ReduceBedrooms { bedrooms });
    }
    if let Some(bathrooms) = filters.bathrooms.filter(|n| *n >= thresholds.room_count) {
        hints.push(AdvisoryHint::ReduceBathrooms { bathrooms });
    }
    if let Some(region) = &filters.region {
        if *region != thresholds.majority_region {
            hints.push(AdvisoryHint::TryMajorityRegion {
                region: thresholds.majority_region.clone(),
            });
        }
    }

    hints
}
