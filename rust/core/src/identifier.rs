// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building identification from unreliable feature metadata
//!
//! Tilesets disagree on where the building register id lives: sometimes a
//! canonical column, sometimes embedded in a gml identifier, sometimes in a
//! batch-table column with a one-off name, sometimes only recoverable by
//! scanning values. [`identify`] walks an ordered strategy chain; the first
//! strategy that yields a valid 16-digit id wins and no later one is tried.

use crate::building_id::BuildingId;
use crate::feature::{PropertyValue, TileFeature};
use tracing::{debug, warn};

/// Canonical property names that carry the building id, ordered by trust
///
/// Checked verbatim first; matching here is exact (strategy 1).
pub const CANDIDATE_ID_PROPERTIES: &[&str] = &[
    "pandid",
    "PANDID",
    "pand_id",
    "identificatie",
    "bag_pandid",
    "building_id",
];

/// Property names that carry a gml-style identifier with the id embedded
const GML_ID_MARKER: &str = "gml";

/// Derive the canonical building id from a picked feature
///
/// Pure and deterministic: the same property map always yields the same
/// result. Returns `None` when every strategy is exhausted; the caller must
/// not attempt a data fetch in that case.
pub fn identify(feature: &dyn TileFeature) -> Option<BuildingId> {
    if let Some(id) = from_canonical_property(feature) {
        return Some(id);
    }
    if let Some(id) = from_gml_identifier(feature) {
        return Some(id);
    }
    if let Some(id) = from_id_like_names(feature) {
        return Some(id);
    }
    if let Some(id) = from_any_value(feature) {
        return Some(id);
    }
    debug!("identification exhausted: no 16-digit id in any property");
    None
}

/// Strategy 1: exact value under a canonical property name
fn from_canonical_property(feature: &dyn TileFeature) -> Option<BuildingId> {
    for name in CANDIDATE_ID_PROPERTIES {
        if !feature.has_property(name) {
            continue;
        }
        if let Some(value) = feature.get_property(name) {
            if let Some(id) = BuildingId::parse(&value.as_text()) {
                return Some(id);
            }
        }
    }
    None
}

/// Strategy 2: 16-digit run embedded in a gml-style identifier
///
/// Matches any property whose name contains "gml" (case-insensitive), e.g.
/// `gml_id` holding `NL.IMBAG.Pand.0599100000668111-0`.
fn from_gml_identifier(feature: &dyn TileFeature) -> Option<BuildingId> {
    for name in feature.property_names() {
        if !name.to_ascii_lowercase().contains(GML_ID_MARKER) {
            continue;
        }
        if let Some(value) = feature.get_property(&name) {
            if let Some(id) = BuildingId::extract(&value.as_text()) {
                return Some(id);
            }
        }
    }
    None
}

/// Strategy 3: id-like column names, including the nested batch table
fn from_id_like_names(feature: &dyn TileFeature) -> Option<BuildingId> {
    for name in feature.property_names() {
        if let Some(id) = id_from_named(feature.get_property(&name), &name) {
            return Some(id);
        }
    }
    for name in feature.batch_property_names() {
        if let Some(id) = id_from_named(feature.batch_property(&name), &name) {
            return Some(id);
        }
    }
    None
}

fn id_from_named(value: Option<PropertyValue>, name: &str) -> Option<BuildingId> {
    if !name.to_ascii_lowercase().contains("id") {
        return None;
    }
    let value = value?;
    BuildingId::parse(&value.as_text()).or_else(|| BuildingId::extract(&value.as_text()))
}

/// Strategy 4: scan every value for an embedded 16-digit run
///
/// Last resort; a hit here is ambiguous because nothing ties the digit run
/// to the id column, so it is logged.
fn from_any_value(feature: &dyn TileFeature) -> Option<BuildingId> {
    for name in feature.property_names() {
        let Some(value) = feature.get_property(&name) else {
            continue;
        };
        if let Some(id) = BuildingId::extract(&value.as_text()) {
            warn!(
                property = name.as_str(),
                id = id.as_str(),
                "ambiguous identification: id found by full value scan"
            );
            return Some(id);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    /// Minimal in-memory feature for identifier tests
    #[derive(Default)]
    struct MapFeature {
        props: FxHashMap<String, PropertyValue>,
        batch: FxHashMap<String, PropertyValue>,
    }

    impl MapFeature {
        fn with(props: &[(&str, PropertyValue)]) -> Self {
            Self {
                props: props
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                batch: FxHashMap::default(),
            }
        }
    }

    impl TileFeature for MapFeature {
        fn has_property(&self, name: &str) -> bool {
            self.props.contains_key(name)
        }
        fn get_property(&self, name: &str) -> Option<PropertyValue> {
            self.props.get(name).cloned()
        }
        fn property_names(&self) -> Vec<String> {
            let mut names: Vec<String> = self.props.keys().cloned().collect();
            names.sort();
            names
        }
        fn batch_property_names(&self) -> Vec<String> {
            let mut names: Vec<String> = self.batch.keys().cloned().collect();
            names.sort();
            names
        }
        fn batch_property(&self, name: &str) -> Option<PropertyValue> {
            self.batch.get(name).cloned()
        }
    }

    #[test]
    fn canonical_property_wins() {
        let f = MapFeature::with(&[
            ("PANDID", "0599100000668111".into()),
            ("gml_id", "NL.IMBAG.Pand.1111111111111111-0".into()),
        ]);
        assert_eq!(identify(&f).unwrap().as_str(), "0599100000668111");
    }

    #[test]
    fn gml_extraction_when_no_canonical() {
        let f = MapFeature::with(&[("gml_id", "NL.IMBAG.Pand.0599100000668111-0".into())]);
        assert_eq!(identify(&f).unwrap().as_str(), "0599100000668111");
    }

    #[test]
    fn id_like_batch_column() {
        let mut f = MapFeature::with(&[("height", PropertyValue::Float(21.5))]);
        f.batch.insert(
            "object_id".to_string(),
            PropertyValue::Str("0599100000668111".to_string()),
        );
        assert_eq!(identify(&f).unwrap().as_str(), "0599100000668111");
    }

    #[test]
    fn value_scan_fallback() {
        let f = MapFeature::with(&[(
            "omschrijving",
            "zie dossier 0599100000668111 blad 2".into(),
        )]);
        assert_eq!(identify(&f).unwrap().as_str(), "0599100000668111");
    }

    #[test]
    fn integral_float_id_survives_text_rendering() {
        let f = MapFeature::with(&[("pandid", PropertyValue::Float(599100000668111.0 * 10.0))]);
        assert_eq!(identify(&f).unwrap().as_str(), "5991000006681110");
    }

    #[test]
    fn no_digit_run_anywhere_yields_none() {
        let f = MapFeature::with(&[
            ("name", "Stadhuis".into()),
            ("height", PropertyValue::Float(21.5)),
        ]);
        assert!(identify(&f).is_none());
    }

    #[test]
    fn identify_is_deterministic() {
        let f = MapFeature::with(&[
            ("a_id", "0599100000668111".into()),
            ("b_id", "0599100000668222".into()),
        ]);
        let first = identify(&f).unwrap();
        for _ in 0..8 {
            assert_eq!(identify(&f).unwrap(), first);
        }
    }
}
