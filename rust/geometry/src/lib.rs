// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Citypick Geometry
//!
//! Anchor resolution and procedural floor synthesis using nalgebra for
//! transformations. Position resolution never fails; it degrades through an
//! ordered fallback chain and caches the best-known result per session.

pub mod error;
pub mod floors;
pub mod frame;
pub mod resolver;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Rotation3, Vector3};

pub use error::{Error, Result};
pub use floors::{
    floor_color, resolve_floor_count, FloorDescriptor, FloorPart, FloorSet, FloorSynthesizer,
    FloorVolume, FootprintTable, DEFAULT_FLOOR_COUNT,
};
pub use frame::{enu_rotation, geodetic_height, surface_normal};
pub use resolver::{
    BuildingGeometry, FootprintKind, GeometryCache, GeometrySource, PositionResolver,
    DEFAULT_ANCHOR, DEFAULT_HEIGHT, DEFAULT_LENGTH, DEFAULT_WIDTH, SURVEYED_POSITIONS,
};
