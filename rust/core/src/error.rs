// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::BuildingId;
use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by identity and record operations
///
/// None of these are fatal: every variant maps to a user-visible message and
/// returns the selection flow to idle.
#[derive(Error, Debug)]
pub enum Error {
    #[error("feature carries no recognizable building identifier")]
    NotIdentifiable,

    #[error("no property records found for building {0}")]
    NoData(BuildingId),

    #[error("property store unavailable: {0}")]
    Transport(String),
}
