// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end resolution and synthesis over the public API: a blind feature
//! degrades through the surveyed table and still yields a level, exactly
//! tiling floor stack.

use approx::assert_relative_eq;
use citypick_core::{BuildingId, PropertyRecord, PropertyValue, TileFeature};
use citypick_geometry::{
    FloorSynthesizer, GeometryCache, GeometrySource, PositionResolver, DEFAULT_FLOOR_COUNT,
};

struct BlindFeature;

impl TileFeature for BlindFeature {
    fn has_property(&self, _name: &str) -> bool {
        false
    }
    fn get_property(&self, _name: &str) -> Option<PropertyValue> {
        None
    }
    fn property_names(&self) -> Vec<String> {
        Vec::new()
    }
}

fn unit(building: &BuildingId, floor: i32) -> PropertyRecord {
    PropertyRecord {
        building_id: building.clone(),
        street: "Blaak".to_string(),
        house_number: Some(31),
        suffix: None,
        postal_code: Some("3011 GA".to_string()),
        city: Some("Rotterdam".to_string()),
        floor_index: floor,
        total_floors: None,
        lowest_floor: None,
        highest_floor: None,
        construction_year: Some(1996),
        usage_code: Some("kantoor".to_string()),
    }
}

#[test]
fn surveyed_building_synthesizes_level_stack() {
    let id = BuildingId::parse("0599100000668111").unwrap();
    let resolver = PositionResolver::new();
    let mut cache = GeometryCache::new();

    let geometry = resolver.resolve(&BlindFeature, &id, &mut cache);
    assert_eq!(geometry.source, GeometrySource::Surveyed);

    let records = vec![unit(&id, 0), unit(&id, 2), unit(&id, 2)];
    let synth = FloorSynthesizer::new();
    let floors = synth.generate(&id, &geometry, &records).unwrap();

    // No floor signal beyond observed indices: two distinct floors
    assert_eq!(floors.len(), 2);

    // Stack tiles the building height around the anchor height
    let base = geometry.anchor_height - geometry.height / 2.0;
    let top = geometry.anchor_height + geometry.height / 2.0;
    assert_relative_eq!(floors.first().unwrap().z_range.0, base, epsilon = 1e-9);
    assert_relative_eq!(floors.last().unwrap().z_range.1, top, epsilon = 1e-9);

    // Every floor centre sits along the local up axis from the anchor
    let up = geometry.orientation.matrix().column(2).into_owned();
    for floor in &floors {
        let offset = floor.position - geometry.anchor;
        if offset.norm() > 1e-9 {
            let aligned = offset.normalize().dot(&up).abs();
            assert!(aligned > 0.999, "floor offset not along up: {aligned}");
        }
    }
}

#[test]
fn upper_floors_exist_without_records() {
    let id = BuildingId::parse("0599100000000042").unwrap();
    let resolver = PositionResolver::new();
    let mut cache = GeometryCache::new();
    let geometry = resolver.resolve(&BlindFeature, &id, &mut cache);
    assert_eq!(geometry.source, GeometrySource::DegenerateDefault);

    let mut record = unit(&id, 0);
    record.total_floors = Some(DEFAULT_FLOOR_COUNT as i32);
    let floors = FloorSynthesizer::new()
        .generate(&id, &geometry, &[record])
        .unwrap();
    assert_eq!(floors.len(), DEFAULT_FLOOR_COUNT);
    // Floors above the ground floor carry no records but still exist
    assert!(floors[1..].iter().all(|f| f.records.is_empty()));
}
