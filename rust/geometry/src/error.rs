// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during floor synthesis
///
/// Position resolution never fails (it degrades through its fallback chain
/// instead); only floor generation has hard failure modes, and those are
/// recoverable via the surveyed-position retry.
#[derive(Error, Debug)]
pub enum Error {
    #[error("floor generation failed: {reason}")]
    FloorGeneration { reason: String },

    #[error("core error: {0}")]
    Core(#[from] citypick_core::Error),
}

impl Error {
    pub(crate) fn floor_generation(reason: impl Into<String>) -> Self {
        Error::FloorGeneration {
            reason: reason.into(),
        }
    }
}
