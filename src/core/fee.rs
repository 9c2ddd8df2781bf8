use std::collections::HashMap;

use crate::core::normalize::normalize;
use crate::domain::model::FeeEstimate;

/// Flat fee per canonical province, in minor currency units.
#[derive(Debug, Clone, Default)]
pub struct FeeEstimator {
    fees: HashMap<String, u64>,
}

impl FeeEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous fee if the province was already present.
    pub fn insert(&mut self, canonical_province_name: &str, fee_minor_units: u64) -> Option<u64> {
        self.fees
            .insert(normalize(canonical_province_name), fee_minor_units)
    }

    /// Keyed by the normalized name, so a canonical name and a normalized raw
    /// province string hit the same row. Unknown provinces get fee 0 with
    /// `known = false`.
    pub fn estimate_fee(&self, province_name: &str) -> FeeEstimate {
        match self.fees.get(&normalize(province_name)) {
            Some(&fee_minor_units) => FeeEstimate {
                fee_minor_units,
                known: true,
            },
            None => FeeEstimate::unknown(),
        }
    }

    pub fn len(&self) -> usize {
        self.fees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fees.is_empty()
    }
}
