// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dataset membership classification
//!
//! A large, externally curated set of building ids drives a binary display
//! tint over every visible feature. The set loads asynchronously; until it
//! arrives, every feature is optimistically classified as a member so the
//! initial frame renders in the richer tint and a single re-style pass runs
//! once loading completes.
//!
//! A second, independent set tracks which buildings have had a successful
//! record fetch this session ("has info"). Updating it must never re-trigger
//! the membership re-style, so the two sets share no generation counter.

use crate::BuildingId;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// RGBA display tint applied per feature
pub type Tint = [f32; 4];

/// Tint for buildings present in the reference dataset
pub const MEMBER_TINT: Tint = [1.0, 1.0, 1.0, 1.0];

/// Tint for buildings absent from the reference dataset
pub const NON_MEMBER_TINT: Tint = [0.55, 0.55, 0.58, 1.0];

/// Highlight tint for the currently selected feature
pub const HIGHLIGHT_TINT: Tint = [1.0, 0.85, 0.2, 1.0];

/// Membership verdict for one building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Membership {
    Member,
    NonMember,
}

/// O(1) membership test over the reference dataset
#[derive(Debug, Default)]
pub struct DatasetClassifier {
    /// Reference set; `None` until the first install completes
    members: Option<FxHashSet<BuildingId>>,
    /// Buildings with a successful record fetch this session
    has_info: FxHashSet<BuildingId>,
    /// Bumped on every install; the host runs one re-style pass per bump
    generation: u64,
}

impl DatasetClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the reference set has finished loading
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.members.is_some()
    }

    /// Install a freshly loaded reference set, replacing any previous one
    ///
    /// Replace, never merge: a reload drops ids that disappeared upstream.
    pub fn install<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = BuildingId>,
    {
        self.members = Some(ids.into_iter().collect());
        self.generation = self.generation.wrapping_add(1);
    }

    /// Generation counter; changes exactly when a re-style pass is due
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Classify one building
    ///
    /// Optimistic before load: everything is a member until the set says
    /// otherwise.
    #[inline]
    pub fn classify(&self, id: &BuildingId) -> Membership {
        match &self.members {
            Some(set) if !set.contains(id) => Membership::NonMember,
            _ => Membership::Member,
        }
    }

    /// Display tint for one building under the current classification
    #[inline]
    pub fn tint_for(&self, id: &BuildingId) -> Tint {
        match self.classify(id) {
            Membership::Member => MEMBER_TINT,
            Membership::NonMember => NON_MEMBER_TINT,
        }
    }

    /// Record a successful fetch; independent of membership, no generation bump
    pub fn mark_has_info(&mut self, id: BuildingId) {
        self.has_info.insert(id);
    }

    #[inline]
    pub fn has_info(&self, id: &BuildingId) -> bool {
        self.has_info.contains(id)
    }

    /// Number of ids in the installed reference set, 0 before load
    pub fn member_count(&self) -> usize {
        self.members.as_ref().map_or(0, |set| set.len())
    }
}
