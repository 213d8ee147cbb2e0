// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! UI/render layer boundary
//!
//! The controller never touches DOM, panels, or scene styling directly; it
//! narrates state changes through this trait and the host draws them. Every
//! error named here is user-visible and recoverable; nothing escapes as a
//! panic.

use citypick_core::{BuildingId, PropertyRecord, Tint, TileFeature};

/// Host-implemented sink for selection outcomes
pub trait SelectionEvents<F: TileFeature> {
    /// A building resolved with records; show the panel and floor toggle
    fn building_selected(&mut self, id: &BuildingId, records: &[PropertyRecord]);

    /// Selection gone (pick miss or reset); hide panel, drop floor models
    fn selection_cleared(&mut self);

    /// Building identified but the store has no records; no floor toggle
    fn no_data(&mut self, id: &BuildingId);

    /// The picked feature carries no recognizable building id
    fn not_identifiable(&mut self);

    /// Record fetch failed in transport; retryable
    fn transport_error(&mut self, message: &str);

    /// Floor synthesis failed; a retry via the surveyed fallback is offered
    fn floor_generation_failed(&mut self, reason: &str);

    /// Apply a display tint to one feature (highlight or membership style)
    fn feature_tint(&mut self, feature: &F, tint: Tint);
}
