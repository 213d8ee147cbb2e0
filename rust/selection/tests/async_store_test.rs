// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Async boundary: the store trait driven through `select` and
//! `load_dataset`, plus the optimistic-then-restyle membership pass.

use std::collections::HashMap;

use citypick_core::{
    BuildingId, Error, PropertyRecord, PropertyValue, TileFeature, MEMBER_TINT, NON_MEMBER_TINT,
};
use citypick_selection::{PropertyDataStore, SelectionController, SelectionEvents};
use futures_core::future::BoxFuture;

#[derive(Clone)]
struct TestFeature {
    props: HashMap<String, PropertyValue>,
}

impl TestFeature {
    fn with_id(id: &str) -> Self {
        let mut props = HashMap::new();
        props.insert("pandid".to_string(), PropertyValue::Str(id.to_string()));
        Self { props }
    }
}

impl TileFeature for TestFeature {
    fn has_property(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }
    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        self.props.get(name).cloned()
    }
    fn property_names(&self) -> Vec<String> {
        self.props.keys().cloned().collect()
    }
}

#[derive(Default)]
struct Panel {
    selected: Vec<BuildingId>,
    transport_errors: u32,
    tints: Vec<[f32; 4]>,
}

impl SelectionEvents<TestFeature> for Panel {
    fn building_selected(&mut self, id: &BuildingId, _records: &[PropertyRecord]) {
        self.selected.push(id.clone());
    }
    fn selection_cleared(&mut self) {}
    fn no_data(&mut self, _id: &BuildingId) {}
    fn not_identifiable(&mut self) {}
    fn transport_error(&mut self, _message: &str) {
        self.transport_errors += 1;
    }
    fn floor_generation_failed(&mut self, _reason: &str) {}
    fn feature_tint(&mut self, _feature: &TestFeature, tint: [f32; 4]) {
        self.tints.push(tint);
    }
}

struct MockStore {
    records: HashMap<String, Vec<PropertyRecord>>,
    known_ids: Vec<String>,
    failing: bool,
}

impl MockStore {
    fn new() -> Self {
        Self {
            records: HashMap::new(),
            known_ids: Vec::new(),
            failing: false,
        }
    }
}

impl PropertyDataStore for MockStore {
    fn fetch_properties(
        &self,
        id: &BuildingId,
    ) -> BoxFuture<'_, citypick_core::Result<Vec<PropertyRecord>>> {
        let result = if self.failing {
            Err(Error::Transport("connection refused".to_string()))
        } else {
            Ok(self.records.get(id.as_str()).cloned().unwrap_or_default())
        };
        Box::pin(async move { result })
    }

    fn fetch_known_ids(&self) -> BoxFuture<'_, citypick_core::Result<Vec<String>>> {
        let result = if self.failing {
            Err(Error::Transport("connection refused".to_string()))
        } else {
            Ok(self.known_ids.clone())
        };
        Box::pin(async move { result })
    }
}

fn unit(id: &BuildingId) -> PropertyRecord {
    PropertyRecord {
        building_id: id.clone(),
        street: "Meent".to_string(),
        house_number: Some(88),
        suffix: None,
        postal_code: None,
        city: None,
        floor_index: 0,
        total_floors: Some(4),
        lowest_floor: None,
        highest_floor: None,
        construction_year: Some(1931),
        usage_code: None,
    }
}

const ID_A: &str = "0599100000668111";
const ID_B: &str = "0599100000554433";

#[tokio::test]
async fn select_drives_fetch_to_completion() {
    let a = BuildingId::parse(ID_A).unwrap();
    let mut store = MockStore::new();
    store.records.insert(ID_A.to_string(), vec![unit(&a)]);

    let mut controller = SelectionController::new();
    let mut panel = Panel::default();
    controller
        .select(Some(TestFeature::with_id(ID_A)), &store, &mut panel)
        .await;

    assert_eq!(panel.selected, vec![a.clone()]);
    assert_eq!(controller.current_records().len(), 1);
    assert!(controller.classifier().has_info(&a));
}

#[tokio::test]
async fn failing_store_surfaces_transport_error() {
    let mut store = MockStore::new();
    store.failing = true;

    let mut controller = SelectionController::new();
    let mut panel = Panel::default();
    controller
        .select(Some(TestFeature::with_id(ID_A)), &store, &mut panel)
        .await;

    assert_eq!(panel.transport_errors, 1);
    assert!(panel.selected.is_empty());
}

#[tokio::test]
async fn dataset_load_skips_malformed_ids_and_restyles_once() {
    let mut store = MockStore::new();
    store.known_ids = vec![
        ID_A.to_string(),
        "not-an-id".to_string(),
        "12345".to_string(),
    ];

    let mut controller: SelectionController<TestFeature> = SelectionController::new();
    let mut panel = Panel::default();

    let member = TestFeature::with_id(ID_A);
    let non_member = TestFeature::with_id(ID_B);

    // Before the set loads, everything styles optimistically as a member
    let before = controller.classifier().generation();
    controller.restyle_all(vec![&member, &non_member], &mut panel);
    assert_eq!(panel.tints, vec![MEMBER_TINT, MEMBER_TINT]);

    let count = controller.load_dataset(&store).await.unwrap();
    assert_eq!(count, 1);
    assert!(controller.classifier().is_loaded());
    assert_ne!(controller.classifier().generation(), before);

    // The one re-style pass after load splits the tints
    panel.tints.clear();
    controller.restyle_all(vec![&member, &non_member], &mut panel);
    assert_eq!(panel.tints, vec![MEMBER_TINT, NON_MEMBER_TINT]);
}
