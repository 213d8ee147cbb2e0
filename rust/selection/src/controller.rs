// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Selection orchestration
//!
//! Owns the single-active-selection invariant and the stale-response guard.
//! Everything here runs on the host's event loop: `pick` from the click
//! handler, `complete_fetch` from async completion, floor toggles from the
//! panel. Each method is one atomic step; no locking is needed because no
//! other core code runs mid-step.
//!
//! Every selection carries a monotonically increasing token. An async
//! result is applied only if its token still matches the controller's
//! current one; anything else is dropped, so a fetch that resolves after
//! the user has moved on can never clobber the newer selection.

use crate::events::SelectionEvents;
use crate::store::PropertyDataStore;
use citypick_core::{
    identify, BuildingId, DatasetClassifier, Error, PropertyRecord, Result, TileFeature,
    HIGHLIGHT_TINT,
};
use citypick_geometry::{
    FloorDescriptor, FloorSet, FloorSynthesizer, GeometryCache, PositionResolver,
};
use tracing::{debug, warn};

/// Monotonically increasing guard for async selection results
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SelectionToken(u64);

impl SelectionToken {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Where the selection flow currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// Nothing selected
    Idle,
    /// Identified, record fetch in flight
    Selecting,
    /// Fetch complete; `has_data` decides whether floors can be offered
    Resolved { has_data: bool },
    /// Floor stack generated and visible
    FloorsShown,
    /// Floor stack hidden but alive; a toggle-on costs no regeneration
    FloorsHidden,
    /// Floor synthesis failed; retry via the surveyed fallback is offered
    RetryOffered,
}

/// Handle to an in-flight record fetch the host must drive
#[derive(Debug, Clone)]
pub struct PendingFetch {
    pub token: SelectionToken,
    pub id: BuildingId,
}

struct ActiveSelection<F> {
    feature: F,
    id: BuildingId,
    records: Vec<PropertyRecord>,
}

/// Pick-to-panel orchestrator, generic over the engine's feature type
pub struct SelectionController<F: TileFeature> {
    state: SelectionState,
    token: SelectionToken,
    selection: Option<ActiveSelection<F>>,
    resolver: PositionResolver,
    cache: GeometryCache,
    synthesizer: FloorSynthesizer,
    floors: FloorSet,
    classifier: DatasetClassifier,
}

impl<F: TileFeature> Default for SelectionController<F> {
    fn default() -> Self {
        Self {
            state: SelectionState::Idle,
            token: SelectionToken(0),
            selection: None,
            resolver: PositionResolver::new(),
            cache: GeometryCache::new(),
            synthesizer: FloorSynthesizer::new(),
            floors: FloorSet::new(),
            classifier: DatasetClassifier::new(),
        }
    }
}

impl<F: TileFeature> SelectionController<F> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Building of the current selection, if any
    pub fn current_building(&self) -> Option<&BuildingId> {
        self.selection.as_ref().map(|s| &s.id)
    }

    /// Records of the current selection; empty until a fetch resolves
    pub fn current_records(&self) -> &[PropertyRecord] {
        self.selection.as_ref().map_or(&[], |s| &s.records)
    }

    pub fn classifier(&self) -> &DatasetClassifier {
        &self.classifier
    }

    pub fn geometry_cache(&self) -> &GeometryCache {
        &self.cache
    }

    pub fn synthesizer_mut(&mut self) -> &mut FloorSynthesizer {
        &mut self.synthesizer
    }

    /// Handle a pick result from the engine
    ///
    /// A hit highlights the feature and, when identification succeeds,
    /// returns a [`PendingFetch`] the host drives to completion. A miss
    /// clears the whole selection: floors destroyed, panel hidden,
    /// highlight restored to the membership tint. Either way the token
    /// advances, so results of earlier fetches go stale.
    pub fn pick<E>(&mut self, hit: Option<F>, events: &mut E) -> Option<PendingFetch>
    where
        E: SelectionEvents<F>,
    {
        self.token = self.token.next();

        if let Some(previous) = self.selection.take() {
            events.feature_tint(&previous.feature, self.classifier.tint_for(&previous.id));
        }

        let Some(feature) = hit else {
            debug!("pick miss: clearing selection");
            self.floors.clear();
            self.state = SelectionState::Idle;
            events.selection_cleared();
            return None;
        };

        let Some(id) = identify(&feature) else {
            self.state = SelectionState::Idle;
            events.not_identifiable();
            return None;
        };

        // Single-active-building invariant: another building's floors go
        // away before this selection proceeds.
        if self.floors.active_building().is_some_and(|b| *b != id) {
            self.floors.clear();
        }

        debug!(id = id.as_str(), token = self.token.0, "selection started");
        events.feature_tint(&feature, HIGHLIGHT_TINT);
        self.selection = Some(ActiveSelection {
            feature,
            id: id.clone(),
            records: Vec::new(),
        });
        self.state = SelectionState::Selecting;
        Some(PendingFetch {
            token: self.token,
            id,
        })
    }

    /// Apply the outcome of a record fetch
    ///
    /// Stale tokens are dropped silently apart from a debug line; the
    /// selection they belonged to no longer exists.
    pub fn complete_fetch<E>(
        &mut self,
        token: SelectionToken,
        result: Result<Vec<PropertyRecord>>,
        events: &mut E,
    ) where
        E: SelectionEvents<F>,
    {
        if token != self.token {
            debug!(
                stale = token.0,
                current = self.token.0,
                "dropping stale fetch result"
            );
            return;
        }
        let Some(selection) = self.selection.as_mut() else {
            return;
        };

        match result {
            Err(Error::Transport(message)) => {
                warn!(id = selection.id.as_str(), %message, "record fetch failed");
                self.state = SelectionState::Idle;
                events.transport_error(&message);
            }
            // Some stores signal an absent building as an error instead of
            // an empty list; treat both the same.
            Err(Error::NoData(id)) => {
                self.state = SelectionState::Resolved { has_data: false };
                events.no_data(&id);
            }
            Err(other) => {
                self.state = SelectionState::Idle;
                events.transport_error(&other.to_string());
            }
            Ok(records) if records.is_empty() => {
                self.state = SelectionState::Resolved { has_data: false };
                events.no_data(&selection.id);
            }
            Ok(records) => {
                self.classifier.mark_has_info(selection.id.clone());
                selection.records = records;
                self.state = SelectionState::Resolved { has_data: true };
                events.building_selected(&selection.id, &selection.records);
            }
        }
    }

    /// Relaunch the record fetch for the current selection
    ///
    /// Used after a transport error; the new fetch gets a fresh token.
    pub fn refetch(&mut self) -> Option<PendingFetch> {
        let selection = self.selection.as_ref()?;
        self.token = self.token.next();
        self.state = SelectionState::Selecting;
        Some(PendingFetch {
            token: self.token,
            id: selection.id.clone(),
        })
    }

    /// Toggle the floor stack of the current selection
    ///
    /// On-toggle reuses hidden descriptors when they exist; only the first
    /// show after a selection resolves invokes the position resolver.
    pub fn toggle_floors<E>(&mut self, events: &mut E)
    where
        E: SelectionEvents<F>,
    {
        match self.state {
            SelectionState::FloorsShown => {
                if let Some(selection) = &self.selection {
                    self.floors.set_visible(&selection.id, false);
                    self.state = SelectionState::FloorsHidden;
                }
            }
            SelectionState::Resolved { has_data: true } | SelectionState::FloorsHidden => {
                self.show_floors(events);
            }
            _ => {
                debug!(state = ?self.state, "floor toggle ignored in this state");
            }
        }
    }

    fn show_floors<E>(&mut self, events: &mut E)
    where
        E: SelectionEvents<F>,
    {
        let Some(selection) = &self.selection else {
            return;
        };

        if self.floors.descriptors(&selection.id).is_some() {
            // Hidden descriptors survive; flipping them back costs neither
            // a resolution nor a regeneration.
            self.floors.set_visible(&selection.id, true);
            self.state = SelectionState::FloorsShown;
            return;
        }

        let geometry = self
            .resolver
            .resolve(&selection.feature, &selection.id, &mut self.cache);
        match self
            .synthesizer
            .generate(&selection.id, &geometry, &selection.records)
        {
            Ok(floors) => {
                self.floors.install(selection.id.clone(), floors);
                self.state = SelectionState::FloorsShown;
            }
            Err(error) => {
                let reason = match &error {
                    citypick_geometry::Error::FloorGeneration { reason } => reason.clone(),
                    other => other.to_string(),
                };
                warn!(id = selection.id.as_str(), %reason, "floor synthesis failed");
                self.state = SelectionState::RetryOffered;
                events.floor_generation_failed(&reason);
            }
        }
    }

    /// Retry floor synthesis through the surveyed-position fallback
    ///
    /// Only meaningful in the retry-offer state; re-enters the resolver at
    /// the hand-surveyed table instead of the feature's own geometry.
    pub fn retry_floors<E>(&mut self, events: &mut E)
    where
        E: SelectionEvents<F>,
    {
        if self.state != SelectionState::RetryOffered {
            return;
        }
        let Some(selection) = &self.selection else {
            return;
        };

        let Some(geometry) = self.resolver.resolve_surveyed(&selection.id) else {
            events.floor_generation_failed("no surveyed position for this building");
            return;
        };
        self.cache.store(selection.id.clone(), geometry.clone());
        match self
            .synthesizer
            .generate(&selection.id, &geometry, &selection.records)
        {
            Ok(floors) => {
                self.floors.install(selection.id.clone(), floors);
                self.state = SelectionState::FloorsShown;
            }
            Err(error) => {
                let reason = match &error {
                    citypick_geometry::Error::FloorGeneration { reason } => reason.clone(),
                    other => other.to_string(),
                };
                events.floor_generation_failed(&reason);
            }
        }
    }

    /// Show or hide an existing floor stack; never creates descriptors
    pub fn set_floors_visible(&mut self, id: &BuildingId, visible: bool) -> bool {
        let toggled = self.floors.set_visible(id, visible);
        if toggled && self.selection.as_ref().is_some_and(|s| s.id == *id) {
            self.state = if visible {
                SelectionState::FloorsShown
            } else {
                SelectionState::FloorsHidden
            };
        }
        toggled
    }

    /// Floor descriptors of a building, when it owns the active stack
    pub fn floor_descriptors(&self, id: &BuildingId) -> Option<&[FloorDescriptor]> {
        self.floors.descriptors(id)
    }

    /// Install a loaded reference dataset (replace, never merge)
    pub fn install_dataset<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = BuildingId>,
    {
        self.classifier.install(ids);
    }

    /// One re-style pass over all visible features
    ///
    /// Run once after dataset install (the classifier generation tells the
    /// host when). Re-applies the highlight last so the pass cannot
    /// overwrite the current selection's tint.
    pub fn restyle_all<'a, I, E>(&mut self, features: I, events: &mut E)
    where
        F: 'a,
        I: IntoIterator<Item = &'a F>,
        E: SelectionEvents<F>,
    {
        for feature in features {
            let Some(id) = identify(feature) else {
                continue;
            };
            events.feature_tint(feature, self.classifier.tint_for(&id));
        }
        if let Some(selection) = &self.selection {
            events.feature_tint(&selection.feature, HIGHLIGHT_TINT);
        }
    }

    /// Full reset: selection, floor stack, and geometry cache
    pub fn reset<E>(&mut self, events: &mut E)
    where
        E: SelectionEvents<F>,
    {
        self.token = self.token.next();
        if let Some(previous) = self.selection.take() {
            events.feature_tint(&previous.feature, self.classifier.tint_for(&previous.id));
        }
        self.floors.clear();
        self.cache.clear();
        self.state = SelectionState::Idle;
        events.selection_cleared();
    }

    /// Convenience: drive a pick and its fetch in one await
    ///
    /// For hosts with an executor at hand. The token guard still applies,
    /// so a pick issued while this is suspended wins.
    pub async fn select<S, E>(&mut self, hit: Option<F>, store: &S, events: &mut E)
    where
        S: PropertyDataStore + ?Sized,
        E: SelectionEvents<F>,
    {
        let Some(pending) = self.pick(hit, events) else {
            return;
        };
        let result = store.fetch_properties(&pending.id).await;
        self.complete_fetch(pending.token, result, events);
    }

    /// Fetch and install the reference dataset; returns the id count
    ///
    /// Malformed ids are skipped with a warning rather than failing the
    /// load. The caller runs [`Self::restyle_all`] afterwards.
    pub async fn load_dataset<S>(&mut self, store: &S) -> Result<usize>
    where
        S: PropertyDataStore + ?Sized,
    {
        let raw = store.fetch_known_ids().await?;
        let mut ids = Vec::with_capacity(raw.len());
        for candidate in raw {
            match BuildingId::parse(&candidate) {
                Some(id) => ids.push(id),
                None => warn!(raw = candidate.as_str(), "skipping malformed dataset id"),
            }
        }
        let count = ids.len();
        self.classifier.install(ids);
        Ok(count)
    }
}
