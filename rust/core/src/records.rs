// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-unit property records
//!
//! One record per taxable real-estate unit, grouped by building. Rows come
//! from an external store; this crate treats them as immutable.

use crate::BuildingId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One real-estate unit inside a building
///
/// `floor_index` is the unit's absolute storey index (ground = 0). The
/// source convention is assumed absolute, not relative-to-lowest; see the
/// open assumption recorded in DESIGN.md.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// Owning building
    pub building_id: BuildingId,
    /// Street name
    pub street: String,
    /// House number
    pub house_number: Option<i32>,
    /// House number suffix ("a", "bis", ...)
    #[serde(default)]
    pub suffix: Option<String>,
    /// Postal code
    #[serde(default)]
    pub postal_code: Option<String>,
    /// City
    #[serde(default)]
    pub city: Option<String>,
    /// Absolute storey index of the unit, ground floor = 0
    pub floor_index: i32,
    /// Total storey count of the building, when the source provides it
    #[serde(default)]
    pub total_floors: Option<i32>,
    /// Lowest storey index present in the building
    #[serde(default)]
    pub lowest_floor: Option<i32>,
    /// Highest storey index present in the building
    #[serde(default)]
    pub highest_floor: Option<i32>,
    /// Construction year
    #[serde(default)]
    pub construction_year: Option<i32>,
    /// Usage classification code (dwelling, office, ...)
    #[serde(default)]
    pub usage_code: Option<String>,
}

impl PropertyRecord {
    /// Short address line for the info panel
    pub fn address_line(&self) -> String {
        let mut line = self.street.clone();
        if let Some(number) = self.house_number {
            line.push(' ');
            line.push_str(&number.to_string());
            if let Some(suffix) = &self.suffix {
                line.push_str(suffix);
            }
        }
        line
    }
}

/// Group records by their absolute floor index
pub fn group_by_floor(records: &[PropertyRecord]) -> FxHashMap<i32, Vec<&PropertyRecord>> {
    let mut by_floor: FxHashMap<i32, Vec<&PropertyRecord>> = FxHashMap::default();
    for record in records {
        by_floor.entry(record.floor_index).or_default().push(record);
    }
    by_floor
}

/// Count of distinct floor indices observed across records
pub fn distinct_floor_count(records: &[PropertyRecord]) -> usize {
    let mut indices: Vec<i32> = records.iter().map(|r| r.floor_index).collect();
    indices.sort_unstable();
    indices.dedup();
    indices.len()
}
