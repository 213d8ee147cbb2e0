// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property data store boundary
//!
//! The record store lives behind an HTTP API owned elsewhere; this crate
//! only sees the trait. Both fetches are asynchronous and must never stall
//! the render loop; slowness alone is not an error (no timeout is enforced
//! here).

use citypick_core::{BuildingId, PropertyRecord, Result};
use futures_core::future::BoxFuture;

/// Async source of property records and the reference id set
///
/// Transport problems surface as [`citypick_core::Error::Transport`]; an
/// empty record list is a successful fetch, not an error.
pub trait PropertyDataStore {
    /// All unit records of one building; possibly empty
    fn fetch_properties(&self, id: &BuildingId) -> BoxFuture<'_, Result<Vec<PropertyRecord>>>;

    /// Every building id in the reference dataset, raw strings as stored
    fn fetch_known_ids(&self) -> BoxFuture<'_, Result<Vec<String>>>;
}
