//! Tracks which learned openings are still consistent with the moves of the
//! current practice game.
//!
//! The service does the matching. Each set it sends replaces the live set,
//! and an opening that dropped out once never comes back within a session:
//! the update is intersected with what is currently live.

use std::collections::BTreeSet;

use crate::models::OpeningId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateTracker {
    live: BTreeSet<OpeningId>,
}

impl CandidateTracker {
    pub fn seeded<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = OpeningId>,
    {
        Self {
            live: ids.into_iter().collect(),
        }
    }

    /// Apply the service's candidate list for the latest ply. `None` leaves
    /// the set untouched. Returns whether the set changed.
    pub fn apply(&mut self, update: Option<&[OpeningId]>) -> bool {
        let Some(update) = update else {
            return false;
        };

        let reintroduced: Vec<OpeningId> = update
            .iter()
            .copied()
            .filter(|id| !self.live.contains(id))
            .collect();
        if !reintroduced.is_empty() {
            tracing::debug!(
                "Ignoring openings no longer in play: {:?}",
                reintroduced
            );
        }

        let next: BTreeSet<OpeningId> = update
            .iter()
            .copied()
            .filter(|id| self.live.contains(id))
            .collect();

        let changed = next != self.live;
        if changed {
            tracing::debug!("Candidates narrowed {} -> {}", self.live.len(), next.len());
        }
        self.live = next;
        changed
    }

    pub fn contains(&self, id: OpeningId) -> bool {
        self.live.contains(&id)
    }

    pub fn ids(&self) -> &BTreeSet<OpeningId> {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
