// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability interface over picked tile features
//!
//! The tile engine hands back opaque objects whose metadata schema is not
//! guaranteed: property names vary per tileset, values are heterogeneous,
//! and the transform/bounding accessors may or may not exist. Everything in
//! this workspace talks to a picked object through [`TileFeature`] instead
//! of assuming a fixed schema.

use std::fmt;

/// A heterogeneous metadata value read off a tile feature
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl PropertyValue {
    /// Text rendering used by the last-resort identifier scan
    ///
    /// Numbers render without formatting so embedded digit runs survive;
    /// null renders empty.
    pub fn as_text(&self) -> String {
        match self {
            PropertyValue::Str(s) => s.clone(),
            PropertyValue::Int(n) => n.to_string(),
            PropertyValue::Float(x) => {
                // Integral floats print as digit runs, not "1.0e15"
                if x.fract() == 0.0 && x.abs() < 9.0e15 {
                    format!("{}", *x as i64)
                } else {
                    x.to_string()
                }
            }
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Null => String::new(),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Str(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Str(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Int(n)
    }
}

impl From<f64> for PropertyValue {
    fn from(x: f64) -> Self {
        PropertyValue::Float(x)
    }
}

/// World-space bounding sphere: center XYZ plus radius
///
/// Kept as a plain array so this crate stays math-library free; the geometry
/// crate lifts it into nalgebra types.
pub type BoundingSphere = [f64; 4];

/// Capability surface of one selectable object in the tile stream
///
/// `has_property`/`get_property`/`property_names` are the guaranteed metadata
/// interface. The geometric accessors are optional capabilities: each returns
/// `None` when the underlying tileset does not expose that level of detail,
/// and the position resolver degrades through them in order.
pub trait TileFeature {
    /// Whether the feature metadata table contains `name`
    fn has_property(&self, name: &str) -> bool;

    /// Read one metadata value; `None` when absent
    fn get_property(&self, name: &str) -> Option<PropertyValue>;

    /// Every property name the feature exposes
    fn property_names(&self) -> Vec<String>;

    /// Property names of the nested batch/content metadata table, if any
    ///
    /// Some tilesets keep a second metadata table on the tile content; its
    /// column names are searched by the identifier fallback.
    fn batch_property_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Read one value from the nested batch/content metadata table
    fn batch_property(&self, _name: &str) -> Option<PropertyValue> {
        None
    }

    /// Exact world translation of the rendered instance, when authored
    fn instance_translation(&self) -> Option<[f64; 3]> {
        None
    }

    /// Per-feature bounding sphere in world space
    fn feature_bounds(&self) -> Option<BoundingSphere> {
        None
    }

    /// Bounding sphere of the enclosing tile (coarser than the feature)
    fn tile_bounds(&self) -> Option<BoundingSphere> {
        None
    }

    /// Bounding sphere of the tile content (coarsest)
    fn content_bounds(&self) -> Option<BoundingSphere> {
        None
    }
}
