// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical building identifier
//!
//! A building is keyed by a 16-digit numeral string (national building
//! register convention). Raw metadata is unreliable, so the id is always
//! re-derived from feature properties and never stored by this crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of digits in a canonical building identifier
pub const BUILDING_ID_DIGITS: usize = 16;

/// Validated 16-digit building identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingId(String);

impl BuildingId {
    /// Parse a string that must be exactly 16 ASCII digits
    ///
    /// Surrounding whitespace is trimmed; anything else fails.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.len() == BUILDING_ID_DIGITS && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(trimmed.to_string()))
        } else {
            None
        }
    }

    /// Extract an embedded 16-digit run from arbitrary text
    ///
    /// Scans maximal digit runs; only a run of exactly 16 digits qualifies.
    /// A 17-digit run is NOT sliced into a bogus id. Returns the first match.
    pub fn extract(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if !bytes[i].is_ascii_digit() {
                i += 1;
                continue;
            }
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - start == BUILDING_ID_DIGITS {
                // Digit runs are ASCII, slicing is char-boundary safe
                return Some(Self(text[start..i].to_string()));
            }
        }
        None
    }

    /// The canonical digit string
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BuildingId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
