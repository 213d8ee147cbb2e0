// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Citypick Core
//!
//! Identity and classification layer for building selection in 3D city
//! models. The tile engine surfaces picked objects with unreliable,
//! heterogeneous metadata; this crate derives a stable [`BuildingId`] from
//! them, models per-unit [`PropertyRecord`]s, and classifies buildings
//! against an externally curated reference dataset.
//!
//! ## Overview
//!
//! - **Capability interface**: [`TileFeature`] abstracts the opaque picked
//!   object (`has_property` / `get_property` / `property_names` plus
//!   optional transform and bounding accessors)
//! - **Identification**: [`identify`] walks an ordered strategy chain from
//!   canonical property names down to a full value scan
//! - **Classification**: [`DatasetClassifier`] is an O(1) membership test
//!   with an optimistic pre-load default and replace-not-merge reloads
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use citypick_core::{identify, DatasetClassifier};
//!
//! let feature = engine.pick(cursor)?;
//! if let Some(id) = identify(&feature) {
//!     let tint = classifier.tint_for(&id);
//! }
//! ```

pub mod building_id;
pub mod classifier;
pub mod error;
pub mod feature;
pub mod identifier;
pub mod records;

pub use building_id::{BuildingId, BUILDING_ID_DIGITS};
pub use classifier::{
    DatasetClassifier, Membership, Tint, HIGHLIGHT_TINT, MEMBER_TINT, NON_MEMBER_TINT,
};
pub use error::{Error, Result};
pub use feature::{BoundingSphere, PropertyValue, TileFeature};
pub use identifier::{identify, CANDIDATE_ID_PROPERTIES};
pub use records::{distinct_floor_count, group_by_floor, PropertyRecord};
