// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building anchor resolution
//!
//! A picked feature rarely tells us outright where its building stands:
//! instance transforms are only present in some tilesets, bounding volumes
//! exist at three levels of coarseness, and a handful of known buildings
//! only resolve through a hand-surveyed table. [`PositionResolver::resolve`]
//! walks that chain in quality order and never fails; the worst case is a
//! documented degenerate anchor in the city centre.

use crate::frame::{enu_rotation, geodetic_height};
use citypick_core::{BuildingId, TileFeature};
use nalgebra::{Point3, Rotation3};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Footprint classification carried on resolved geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootprintKind {
    /// Single rectangular footprint
    Simple,
    /// Non-rectangular footprint approximated by offset sub-volumes
    Compound,
}

/// Where a geometry resolution came from, ordered best to worst
///
/// The discriminant is the quality rank used by the cache overwrite policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GeometrySource {
    /// Exact translation of the rendered instance
    InstanceTransform = 0,
    /// Feature-level bounding volume under the tile transform
    FeatureBounds = 1,
    /// Tile-level bounding volume
    TileBounds = 2,
    /// Content-level bounding volume
    ContentBounds = 3,
    /// Prior resolution of the same building this session
    Cached = 4,
    /// Hand-surveyed position table
    Surveyed = 5,
    /// Fixed fallback anchor, constant dimensions
    DegenerateDefault = 6,
}

impl GeometrySource {
    /// Whether this resolution carries real positional information
    #[inline]
    pub fn is_degenerate(self) -> bool {
        matches!(self, GeometrySource::DegenerateDefault)
    }
}

/// Resolved anchor, orientation, and extents of one building
///
/// Orientation is always a local East-North-Up frame at the anchor, never a
/// frame taken from the source tileset, so synthesized floors render level.
#[derive(Debug, Clone)]
pub struct BuildingGeometry {
    /// World-space (ECEF) anchor at the building's volumetric center
    pub anchor: Point3<f64>,
    /// ENU rotation at the anchor
    pub orientation: Rotation3<f64>,
    /// Geodetic height of the anchor, feeds floor Z-range bookkeeping
    pub anchor_height: f64,
    /// Footprint extent along east, meters
    pub width: f64,
    /// Footprint extent along north, meters
    pub length: f64,
    /// Vertical extent, meters
    pub height: f64,
    /// Footprint classification for the synthesizer
    pub footprint: FootprintKind,
    /// Provenance of this resolution
    pub source: GeometrySource,
}

/// Horizontal extent factor applied to a bounding-sphere radius
///
/// The sphere circumscribes the building, so the footprint edge is shorter
/// than the diameter; 1.6 * 0.8 matches surveyed footprints well.
const RADIUS_TO_EXTENT: f64 = 1.6 * 0.8;

/// Degenerate fallback anchor: city centre at ground level, ECEF
pub const DEFAULT_ANCHOR: [f64; 3] = [3_929_713.088, 307_837.664, 4_997_489.802];

/// Extents used when nothing measurable is available
pub const DEFAULT_WIDTH: f64 = 40.0;
pub const DEFAULT_LENGTH: f64 = 40.0;
pub const DEFAULT_HEIGHT: f64 = 45.0;

/// Property names that may carry a measured building height, ordered by trust
const HEIGHT_PROPERTIES: &[&str] = &["measuredheight", "hoogte", "height", "relativeheight"];

/// Hand-surveyed anchors for buildings whose tiles resolve badly
///
/// Keyed by building id digit string: ECEF position plus measured height.
pub const SURVEYED_POSITIONS: &[(&str, [f64; 3], f64)] = &[
    ("0599100000660888", [3_929_969.441, 307_018.527, 4_997_356.318], 93.0),
    ("0599100000668111", [3_929_828.204, 307_551.911, 4_997_405.230], 62.5),
    ("0599100010031025", [3_929_537.615, 308_103.892, 4_997_612.444], 70.5),
];

/// Per-session cache of resolved building geometry
///
/// Lifetime is one viewer session; [`GeometryCache::clear`] on full reset.
/// `store` keeps the best-known resolution: an entry is overwritten only by
/// an equal-or-better source rank, and a degenerate result never replaces a
/// non-degenerate one.
#[derive(Debug, Default)]
pub struct GeometryCache {
    entries: FxHashMap<BuildingId, BuildingGeometry>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &BuildingId) -> Option<&BuildingGeometry> {
        self.entries.get(id)
    }

    /// Insert under the equal-or-better policy; returns whether it stuck
    pub fn store(&mut self, id: BuildingId, geometry: BuildingGeometry) -> bool {
        match self.entries.get(&id) {
            Some(existing) if geometry.source > existing.source => false,
            _ => {
                self.entries.insert(id, geometry);
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered-fallback anchor resolution
///
/// Stateless; the per-session [`GeometryCache`] is passed in explicitly so
/// its lifetime stays visible at the call site.
#[derive(Debug, Default)]
pub struct PositionResolver;

impl PositionResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve anchor geometry for a picked feature
    ///
    /// Never fails: walks instance transform, then feature / tile / content
    /// bounds, then the session cache, then the surveyed table, and finally
    /// the degenerate default. The winning resolution is cached under the
    /// equal-or-better policy.
    pub fn resolve(
        &self,
        feature: &dyn TileFeature,
        id: &BuildingId,
        cache: &mut GeometryCache,
    ) -> BuildingGeometry {
        if let Some(geometry) = self.resolve_from_feature(feature, id) {
            cache.store(id.clone(), geometry.clone());
            return geometry;
        }

        if let Some(cached) = cache.get(id) {
            debug!(id = id.as_str(), "anchor resolved from session cache");
            let mut geometry = cached.clone();
            geometry.source = GeometrySource::Cached;
            return geometry;
        }

        if let Some(geometry) = self.resolve_surveyed(id) {
            warn!(id = id.as_str(), "anchor degraded to surveyed table");
            cache.store(id.clone(), geometry.clone());
            return geometry;
        }

        warn!(id = id.as_str(), "anchor degraded to default position");
        let geometry = self.degenerate_default();
        // A degenerate anchor must never clobber real cached geometry;
        // store() enforces that via source rank.
        cache.store(id.clone(), geometry.clone());
        geometry
    }

    /// Steps 1-4: anchor from the feature's own transform or bounds
    fn resolve_from_feature(
        &self,
        feature: &dyn TileFeature,
        id: &BuildingId,
    ) -> Option<BuildingGeometry> {
        if let Some(translation) = feature.instance_translation() {
            let anchor = Point3::new(translation[0], translation[1], translation[2]);
            return Some(self.build(
                anchor,
                None,
                feature,
                id,
                GeometrySource::InstanceTransform,
            ));
        }

        let leveled = [
            (feature.feature_bounds(), GeometrySource::FeatureBounds),
            (feature.tile_bounds(), GeometrySource::TileBounds),
            (feature.content_bounds(), GeometrySource::ContentBounds),
        ];
        for (bounds, source) in leveled {
            if let Some([x, y, z, radius]) = bounds {
                if radius > 0.0 {
                    return Some(self.build(Point3::new(x, y, z), Some(radius), feature, id, source));
                }
            }
        }
        None
    }

    /// Step 6: hand-surveyed anchor table
    ///
    /// Public because the floor-generation retry path re-enters here
    /// explicitly after a synthesis failure.
    pub fn resolve_surveyed(&self, id: &BuildingId) -> Option<BuildingGeometry> {
        let (_, position, height) = SURVEYED_POSITIONS
            .iter()
            .find(|(key, _, _)| *key == id.as_str())?;
        let anchor = Point3::new(position[0], position[1], position[2]);
        Some(BuildingGeometry {
            orientation: enu_rotation(&anchor),
            anchor_height: geodetic_height(&anchor),
            anchor,
            width: DEFAULT_WIDTH,
            length: DEFAULT_LENGTH,
            height: *height,
            footprint: FootprintKind::Simple,
            source: GeometrySource::Surveyed,
        })
    }

    /// Step 7: fixed anchor, constant extents
    fn degenerate_default(&self) -> BuildingGeometry {
        let anchor = Point3::new(DEFAULT_ANCHOR[0], DEFAULT_ANCHOR[1], DEFAULT_ANCHOR[2]);
        BuildingGeometry {
            orientation: enu_rotation(&anchor),
            anchor_height: geodetic_height(&anchor),
            anchor,
            width: DEFAULT_WIDTH,
            length: DEFAULT_LENGTH,
            height: DEFAULT_HEIGHT,
            footprint: FootprintKind::Simple,
            source: GeometrySource::DegenerateDefault,
        }
    }

    fn build(
        &self,
        anchor: Point3<f64>,
        radius: Option<f64>,
        feature: &dyn TileFeature,
        id: &BuildingId,
        source: GeometrySource,
    ) -> BuildingGeometry {
        let extent = radius.map(|r| r * RADIUS_TO_EXTENT);
        BuildingGeometry {
            orientation: enu_rotation(&anchor),
            anchor_height: geodetic_height(&anchor),
            anchor,
            width: extent.unwrap_or(DEFAULT_WIDTH),
            length: extent.unwrap_or(DEFAULT_LENGTH),
            height: measured_height(feature).unwrap_or(DEFAULT_HEIGHT),
            footprint: FootprintKind::Simple,
            source: log_if_coarse(id, source),
        }
    }
}

/// Measured building height off feature metadata, when a tileset carries it
///
/// The value passes through unvalidated: tilesets do ship zero or negative
/// heights, and the floor synthesizer is the one that rejects them (with a
/// retry through the surveyed table).
fn measured_height(feature: &dyn TileFeature) -> Option<f64> {
    for name in feature.property_names() {
        if !HEIGHT_PROPERTIES.contains(&name.to_ascii_lowercase().as_str()) {
            continue;
        }
        if let Some(value) = feature.get_property(&name) {
            if let Ok(height) = value.as_text().parse::<f64>() {
                return Some(height);
            }
        }
    }
    None
}

fn log_if_coarse(id: &BuildingId, source: GeometrySource) -> GeometrySource {
    if source >= GeometrySource::TileBounds {
        debug!(id = id.as_str(), ?source, "geometry degraded to coarse bounds");
    }
    source
}
