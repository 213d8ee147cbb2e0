// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Procedural floor-volume synthesis
//!
//! Turns a resolved building anchor plus sparse per-unit records into an
//! ordered stack of floor volumes. The records rarely describe the building
//! completely, so the floor count resolves through a priority chain and the
//! stack is a uniform-height simplification that exactly tiles the building
//! height. Volumes are boxes in the anchor's ENU frame with a small visual
//! margin so individual floors read as separate slabs.

use crate::error::{Error, Result};
use crate::resolver::{BuildingGeometry, FootprintKind};
use citypick_core::{distinct_floor_count, BuildingId, PropertyRecord};
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashSet;
use smallvec::{smallvec, SmallVec};
use tracing::debug;

/// Floor count when the records give no usable signal
pub const DEFAULT_FLOOR_COUNT: usize = 15;

/// Horizontal shrink factor per floor box; leaves the facade visible
const MARGIN_FACTOR: f64 = 0.92;

/// Vertical shrink factor per floor box; creates the inter-floor gap
const GAP_FACTOR: f64 = 0.82;

/// Hue of the ground floor color, degrees
const GROUND_HUE: f64 = 120.0;

/// Hue of the top floor color, degrees
const TOP_HUE: f64 = 0.0;

const FLOOR_SATURATION: f64 = 0.72;
const FLOOR_LIGHTNESS: f64 = 0.55;
const FLOOR_ALPHA: f32 = 0.85;

/// Buildings whose footprint needs the compound approximation
const COMPOUND_FOOTPRINT_IDS: &[&str] = &["0599100010031025"];

/// One sub-box of a compound floor: geometry only, no metadata
#[derive(Debug, Clone, PartialEq)]
pub struct FloorPart {
    /// Offset from the floor centre, ENU meters
    pub offset: Vector3<f64>,
    /// Box extents, ENU meters
    pub dimensions: Vector3<f64>,
}

/// Geometry variant of one floor
///
/// Compound floors group their sub-boxes under the parent descriptor; the
/// parent owns metadata and label, the parts carry geometry only. Actual
/// scene-graph parenting is the render layer's concern.
#[derive(Debug, Clone, PartialEq)]
pub enum FloorVolume {
    /// Single box; position and dimensions live on the descriptor
    Box,
    /// Two or more offset boxes approximating a non-rectangular footprint
    Compound { parts: SmallVec<[FloorPart; 4]> },
}

/// One synthesized storey of the active building
#[derive(Debug, Clone)]
pub struct FloorDescriptor {
    /// Storey index, ground floor = 0
    pub index: usize,
    /// Vertical slab interval in anchor-height coordinates
    pub z_range: (f64, f64),
    /// World-space centre of the floor box
    pub position: Point3<f64>,
    /// Box extents: width (east), length (north), slab height
    pub dimensions: Vector3<f64>,
    /// RGBA display color, gradient by storey
    pub color: [f32; 4],
    /// Panel label: 1-based floor number plus unit count
    pub label: String,
    /// Records whose floor index matches this storey; may be empty
    pub records: Vec<PropertyRecord>,
    /// Render visibility; toggled without regeneration
    pub visible: bool,
    /// Geometry variant
    pub volume: FloorVolume,
}

/// Per-building footprint strategy lookup
///
/// The known non-rectangular buildings are listed in
/// `COMPOUND_FOOTPRINT_IDS`; more can be registered at runtime. Whether
/// other buildings deserve compound treatment is an open extension point.
#[derive(Debug)]
pub struct FootprintTable {
    compound: FxHashSet<String>,
}

impl Default for FootprintTable {
    fn default() -> Self {
        Self {
            compound: COMPOUND_FOOTPRINT_IDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl FootprintTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_compound(&mut self, id: BuildingId) {
        self.compound.insert(id.as_str().to_string());
    }

    pub fn for_building(&self, id: &BuildingId) -> FootprintKind {
        if self.compound.contains(id.as_str()) {
            FootprintKind::Compound
        } else {
            FootprintKind::Simple
        }
    }
}

/// Resolve the storey count from sparse records
///
/// Priority: explicit total on the first record, then the lowest/highest
/// span, then the count of distinct observed indices. Records-empty is the
/// caller's failure; a contradictory span fails here.
pub fn resolve_floor_count(records: &[PropertyRecord]) -> Result<usize> {
    let first = records
        .first()
        .ok_or_else(|| Error::floor_generation("no property records for building"))?;

    if let Some(total) = first.total_floors {
        if total > 0 {
            return Ok(total as usize);
        }
    }

    if let (Some(lowest), Some(highest)) = (first.lowest_floor, first.highest_floor) {
        let span = highest - lowest + 1;
        if span > 0 {
            return Ok(span as usize);
        }
        return Err(Error::floor_generation(format!(
            "invalid floor span: lowest {lowest}, highest {highest}"
        )));
    }

    let observed = distinct_floor_count(records);
    if observed > 0 {
        Ok(observed)
    } else {
        Ok(DEFAULT_FLOOR_COUNT)
    }
}

/// Linear hue interpolation between the ground and top endpoint colors
///
/// Floor 0 and the top floor are fixed; a single-storey building gets the
/// ground color.
pub fn floor_color(index: usize, floor_count: usize) -> [f32; 4] {
    let t = if floor_count > 1 {
        index as f64 / (floor_count - 1) as f64
    } else {
        0.0
    };
    let hue = GROUND_HUE + (TOP_HUE - GROUND_HUE) * t;
    hsl_to_rgba(hue, FLOOR_SATURATION, FLOOR_LIGHTNESS, FLOOR_ALPHA)
}

/// HSL to RGBA, hue in degrees
fn hsl_to_rgba(hue: f64, saturation: f64, lightness: f64, alpha: f32) -> [f32; 4] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    [(r + m) as f32, (g + m) as f32, (b + m) as f32, alpha]
}

/// Floor-stack synthesis for one building
#[derive(Debug, Default)]
pub struct FloorSynthesizer {
    footprints: FootprintTable,
}

impl FloorSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn footprints_mut(&mut self) -> &mut FootprintTable {
        &mut self.footprints
    }

    /// Synthesize the ordered floor stack for one building
    ///
    /// Fails on an empty record list, a non-positive building height, or a
    /// contradictory floor span; the caller offers a retry through the
    /// surveyed-position fallback.
    pub fn generate(
        &self,
        id: &BuildingId,
        geometry: &BuildingGeometry,
        records: &[PropertyRecord],
    ) -> Result<Vec<FloorDescriptor>> {
        if geometry.height <= 0.0 || geometry.height.is_nan() {
            return Err(Error::floor_generation(format!(
                "non-positive building height {}",
                geometry.height
            )));
        }
        let floor_count = resolve_floor_count(records)?;
        // Resolved geometry may already be classified compound; otherwise
        // the per-building table decides.
        let footprint = match geometry.footprint {
            FootprintKind::Compound => FootprintKind::Compound,
            FootprintKind::Simple => self.footprints.for_building(id),
        };
        debug!(
            id = id.as_str(),
            floor_count,
            ?footprint,
            "synthesizing floor stack"
        );

        let floor_height = geometry.height / floor_count as f64;
        let base = geometry.anchor_height - geometry.height / 2.0;
        let up = geometry.orientation.matrix().column(2).into_owned();

        let mut floors = Vec::with_capacity(floor_count);
        for index in 0..floor_count {
            let z_low = base + index as f64 * floor_height;
            let z_center = z_low + floor_height / 2.0;
            let position = geometry.anchor + up * (z_center - geometry.anchor_height);
            let dimensions = Vector3::new(
                geometry.width * MARGIN_FACTOR,
                geometry.length * MARGIN_FACTOR,
                floor_height * GAP_FACTOR,
            );
            let records_here: Vec<PropertyRecord> = records
                .iter()
                .filter(|r| r.floor_index == index as i32)
                .cloned()
                .collect();
            let unit_word = if records_here.len() == 1 {
                "unit"
            } else {
                "units"
            };
            floors.push(FloorDescriptor {
                index,
                z_range: (z_low, z_low + floor_height),
                position,
                label: format!("Floor {} ({} {})", index + 1, records_here.len(), unit_word),
                color: floor_color(index, floor_count),
                records: records_here,
                visible: true,
                volume: match footprint {
                    FootprintKind::Simple => FloorVolume::Box,
                    FootprintKind::Compound => compound_volume(&dimensions),
                },
                dimensions,
            });
        }
        Ok(floors)
    }
}

/// L-shaped approximation: full-depth west wing plus half-depth east wing
fn compound_volume(dimensions: &Vector3<f64>) -> FloorVolume {
    let half_width = dimensions.x / 2.0;
    let parts = smallvec![
        FloorPart {
            offset: Vector3::new(-half_width / 2.0, 0.0, 0.0),
            dimensions: Vector3::new(half_width, dimensions.y, dimensions.z),
        },
        FloorPart {
            offset: Vector3::new(half_width / 2.0, -dimensions.y / 4.0, 0.0),
            dimensions: Vector3::new(half_width, dimensions.y / 2.0, dimensions.z),
        },
    ];
    FloorVolume::Compound { parts }
}

/// Owner of the single active building's floor descriptors
///
/// At most one building has floors at any time: installing a new stack
/// evicts any other building's descriptors first. Visibility toggles flip a
/// flag without regeneration; descriptors survive a toggle-off and die on
/// removal or replacement.
#[derive(Debug, Default)]
pub struct FloorSet {
    active: Option<(BuildingId, Vec<FloorDescriptor>)>,
}

impl FloorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly generated stack, evicting any other building
    pub fn install(&mut self, id: BuildingId, floors: Vec<FloorDescriptor>) {
        self.active = Some((id, floors));
    }

    /// Building that currently owns descriptors, if any
    pub fn active_building(&self) -> Option<&BuildingId> {
        self.active.as_ref().map(|(id, _)| id)
    }

    /// Descriptors of the given building; `None` when it is not active
    pub fn descriptors(&self, id: &BuildingId) -> Option<&[FloorDescriptor]> {
        match &self.active {
            Some((active_id, floors)) if active_id == id => Some(floors),
            _ => None,
        }
    }

    /// Toggle visibility without regeneration; idempotent, O(floor count)
    ///
    /// Returns false when the building has no descriptors.
    pub fn set_visible(&mut self, id: &BuildingId, visible: bool) -> bool {
        match &mut self.active {
            Some((active_id, floors)) if active_id == id => {
                for floor in floors.iter_mut() {
                    floor.visible = visible;
                }
                true
            }
            _ => false,
        }
    }

    /// Destroy the building's descriptors
    pub fn remove(&mut self, id: &BuildingId) {
        if self.active_building() == Some(id) {
            self.active = None;
        }
    }

    /// Destroy everything
    pub fn clear(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{GeometrySource, DEFAULT_HEIGHT, DEFAULT_LENGTH, DEFAULT_WIDTH};
    use approx::assert_relative_eq;
    use nalgebra::Rotation3;

    fn test_id() -> BuildingId {
        BuildingId::parse("0599100000668111").unwrap()
    }

    fn test_geometry(height: f64) -> BuildingGeometry {
        BuildingGeometry {
            anchor: Point3::new(0.0, 0.0, 0.0),
            orientation: Rotation3::identity(),
            anchor_height: 30.0,
            width: DEFAULT_WIDTH,
            length: DEFAULT_LENGTH,
            height,
            footprint: FootprintKind::Simple,
            source: GeometrySource::FeatureBounds,
        }
    }

    fn record(floor: i32, total: Option<i32>) -> PropertyRecord {
        PropertyRecord {
            building_id: test_id(),
            street: "Coolsingel".to_string(),
            house_number: Some(40),
            suffix: None,
            postal_code: None,
            city: None,
            floor_index: floor,
            total_floors: total,
            lowest_floor: None,
            highest_floor: None,
            construction_year: None,
            usage_code: None,
        }
    }

    #[test]
    fn explicit_total_floors_wins() {
        let records = vec![record(0, Some(2)), record(0, Some(2)), record(1, Some(2))];
        assert_eq!(resolve_floor_count(&records).unwrap(), 2);
    }

    #[test]
    fn span_used_when_total_missing() {
        let mut r = record(0, None);
        r.lowest_floor = Some(-1);
        r.highest_floor = Some(8);
        assert_eq!(resolve_floor_count(&[r]).unwrap(), 10);
    }

    #[test]
    fn distinct_indices_then_default() {
        let records = vec![record(0, None), record(0, None), record(3, None)];
        assert_eq!(resolve_floor_count(&records).unwrap(), 2);
    }

    #[test]
    fn contradictory_span_fails() {
        let mut r = record(0, None);
        r.lowest_floor = Some(5);
        r.highest_floor = Some(1);
        assert!(resolve_floor_count(&[r]).is_err());
    }

    #[test]
    fn empty_records_fail() {
        assert!(resolve_floor_count(&[]).is_err());
    }

    #[test]
    fn stack_tiles_building_height_exactly() {
        let synth = FloorSynthesizer::new();
        let geometry = test_geometry(DEFAULT_HEIGHT);
        let records = vec![record(0, Some(9))];
        let floors = synth.generate(&test_id(), &geometry, &records).unwrap();
        assert_eq!(floors.len(), 9);

        let base = geometry.anchor_height - geometry.height / 2.0;
        let top = geometry.anchor_height + geometry.height / 2.0;
        assert_relative_eq!(floors[0].z_range.0, base, epsilon = 1e-9);
        assert_relative_eq!(floors[8].z_range.1, top, epsilon = 1e-9);
        for pair in floors.windows(2) {
            // No gap, no overlap between consecutive slabs
            assert_relative_eq!(pair[0].z_range.1, pair[1].z_range.0, epsilon = 1e-9);
        }
        // Box height leaves the visual gap
        let floor_height = geometry.height / 9.0;
        assert!(floors[0].dimensions.z < floor_height);
    }

    #[test]
    fn records_associate_by_absolute_index() {
        let synth = FloorSynthesizer::new();
        let geometry = test_geometry(30.0);
        let records = vec![record(0, Some(2)), record(0, Some(2)), record(1, Some(2))];
        let floors = synth.generate(&test_id(), &geometry, &records).unwrap();
        assert_eq!(floors.len(), 2);
        assert_eq!(floors[0].records.len(), 2);
        assert_eq!(floors[1].records.len(), 1);
        assert_eq!(floors[0].label, "Floor 1 (2 units)");
        assert_eq!(floors[1].label, "Floor 2 (1 unit)");
    }

    #[test]
    fn gradient_endpoints_are_fixed() {
        let ground = floor_color(0, 12);
        let top = floor_color(11, 12);
        assert_eq!(ground, floor_color(0, 5));
        assert_eq!(top, floor_color(4, 5));
        assert_ne!(ground, top);
        // Single-storey building renders in the ground color
        assert_eq!(floor_color(0, 1), ground);
    }

    #[test]
    fn non_positive_height_fails() {
        let synth = FloorSynthesizer::new();
        let geometry = test_geometry(0.0);
        let err = synth
            .generate(&test_id(), &geometry, &[record(0, Some(3))])
            .unwrap_err();
        assert!(err.to_string().contains("height"));
    }

    #[test]
    fn compound_building_gets_part_volumes() {
        let synth = FloorSynthesizer::new();
        let id = BuildingId::parse("0599100010031025").unwrap();
        let geometry = test_geometry(30.0);
        let floors = synth.generate(&id, &geometry, &[record(0, Some(3))]).unwrap();
        for floor in &floors {
            match &floor.volume {
                FloorVolume::Compound { parts } => assert_eq!(parts.len(), 2),
                FloorVolume::Box => panic!("expected compound volume"),
            }
        }
        // Registration generalizes beyond the built-in list
        let mut synth = FloorSynthesizer::new();
        synth.footprints_mut().register_compound(test_id());
        let floors = synth
            .generate(&test_id(), &geometry, &[record(0, Some(1))])
            .unwrap();
        assert!(matches!(floors[0].volume, FloorVolume::Compound { .. }));
    }

    #[test]
    fn floor_set_single_active_building() {
        let synth = FloorSynthesizer::new();
        let geometry = test_geometry(30.0);
        let mut set = FloorSet::new();

        let a = test_id();
        let b = BuildingId::parse("0599100000000002").unwrap();
        set.install(
            a.clone(),
            synth.generate(&a, &geometry, &[record(0, Some(3))]).unwrap(),
        );
        assert!(set.descriptors(&a).is_some());

        set.install(
            b.clone(),
            synth.generate(&b, &geometry, &[record(0, Some(4))]).unwrap(),
        );
        assert!(set.descriptors(&a).is_none());
        assert_eq!(set.active_building(), Some(&b));
    }

    #[test]
    fn visibility_toggle_is_idempotent_flag_flip() {
        let synth = FloorSynthesizer::new();
        let geometry = test_geometry(30.0);
        let mut set = FloorSet::new();
        let id = test_id();
        set.install(
            id.clone(),
            synth
                .generate(&id, &geometry, &[record(0, Some(3))])
                .unwrap(),
        );
        let count = set.descriptors(&id).unwrap().len();

        assert!(set.set_visible(&id, false));
        assert!(set.descriptors(&id).unwrap().iter().all(|f| !f.visible));
        assert!(set.set_visible(&id, true));
        assert!(set.set_visible(&id, true));
        let floors = set.descriptors(&id).unwrap();
        assert_eq!(floors.len(), count);
        assert!(floors.iter().all(|f| f.visible));

        set.remove(&id);
        assert!(set.descriptors(&id).is_none());
        assert!(!set.set_visible(&id, true));
    }
}
