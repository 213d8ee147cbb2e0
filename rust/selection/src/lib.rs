// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Citypick Selection
//!
//! The orchestration layer between the tile engine's pick events, the
//! property data store, and the UI. A click becomes: identify, fetch,
//! classify, optionally synthesize floors; all async effects are guarded by
//! a monotonically increasing selection token so stale responses can never
//! overwrite a newer selection.
//!
//! ```rust,ignore
//! use citypick_selection::{SelectionController, SelectionEvents};
//!
//! let mut controller = SelectionController::new();
//! if let Some(pending) = controller.pick(engine.pick(cursor), &mut ui) {
//!     let result = store.fetch_properties(&pending.id).await;
//!     controller.complete_fetch(pending.token, result, &mut ui);
//! }
//! ```

pub mod controller;
pub mod events;
pub mod store;

pub use controller::{PendingFetch, SelectionController, SelectionState, SelectionToken};
pub use events::SelectionEvents;
pub use store::PropertyDataStore;
