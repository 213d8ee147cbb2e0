// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Local East-North-Up frame construction
//!
//! Floor volumes must render level regardless of how the source tileset was
//! authored, so orientation is always recomputed from the WGS84 geodetic
//! surface normal at the final anchor rather than taken from any feature
//! transform.

use nalgebra::{Matrix3, Point3, Rotation3, Vector3};

/// WGS84 semi-major axis in meters
pub const WGS84_A: f64 = 6_378_137.0;

/// WGS84 semi-minor axis in meters
pub const WGS84_B: f64 = 6_356_752.314_245;

/// WGS84 first eccentricity squared
const E2: f64 = 6.694_379_990_14e-3;

/// Geodetic surface normal (unit "up") at an ECEF point
///
/// Gradient of the ellipsoid implicit function; points at the geocenter
/// fall back to +Z so the frame stays orthonormal.
pub fn surface_normal(p: &Point3<f64>) -> Vector3<f64> {
    let a2 = WGS84_A * WGS84_A;
    let b2 = WGS84_B * WGS84_B;
    let n = Vector3::new(p.x / a2, p.y / a2, p.z / b2);
    let len = n.norm();
    if len < 1e-12 {
        Vector3::z()
    } else {
        n / len
    }
}

/// East-North-Up rotation at an ECEF anchor
///
/// Columns of the rotation are the world-space east, north, and up axes.
/// Near the poles east degenerates; the +Y fallback keeps the basis valid.
pub fn enu_rotation(anchor: &Point3<f64>) -> Rotation3<f64> {
    let up = surface_normal(anchor);

    let east_raw = Vector3::new(-anchor.y, anchor.x, 0.0);
    let east = if east_raw.norm() > 1e-6 {
        east_raw.normalize()
    } else {
        Vector3::y()
    };

    let north = up.cross(&east).normalize();
    // Re-orthogonalize east against the exact north/up pair
    let east = north.cross(&up).normalize();

    let basis = Matrix3::from_columns(&[east, north, up]);
    Rotation3::from_matrix_unchecked(basis)
}

/// Approximate geodetic height of an ECEF point above the ellipsoid
///
/// Single-step Bowring; plenty for anchoring floor stacks, where the height
/// only feeds the Z-range bookkeeping.
pub fn geodetic_height(p: &Point3<f64>) -> f64 {
    let xy = (p.x * p.x + p.y * p.y).sqrt();
    if xy < 1e-6 {
        // On the polar axis the height is direct
        return p.z.abs() - WGS84_B;
    }
    let ep2 = (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
    let theta = (p.z * WGS84_A).atan2(xy * WGS84_B);
    let (sin_t, cos_t) = theta.sin_cos();
    let lat = (p.z + ep2 * WGS84_B * sin_t.powi(3)).atan2(xy - E2 * WGS84_A * cos_t.powi(3));
    let sin_lat = lat.sin();
    let n = WGS84_A / (1.0 - E2 * sin_lat * sin_lat).sqrt();
    xy / lat.cos() - n
}
