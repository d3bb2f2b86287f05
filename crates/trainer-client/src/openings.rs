//! Read-through cache of the user's opening list.
//!
//! Fetched on first use and handed to whoever needs it. A learned-flag toggle
//! patches the cached entry immediately, then the list is refetched so the
//! service has the last word.

use tracing::{info, warn};

use crate::clients::TrainerApi;
use crate::error::ClientError;
use crate::models::{OpeningId, OpeningSummary, PlayerColor};

#[derive(Debug, Default)]
pub struct OpeningCache {
    openings: Vec<OpeningSummary>,
    loaded: bool,
}

impl OpeningCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Fetch the list unless it is already cached.
    pub async fn ensure_loaded(
        &mut self,
        api: &dyn TrainerApi,
    ) -> Result<&[OpeningSummary], ClientError> {
        if !self.loaded {
            self.refresh(api).await?;
        }
        Ok(&self.openings)
    }

    /// Drop the cached list and fetch it again.
    pub async fn refresh(&mut self, api: &dyn TrainerApi) -> Result<&[OpeningSummary], ClientError> {
        self.loaded = false;
        let openings = api.list_openings().await?;
        info!(
            "Loaded {} openings ({} learned)",
            openings.len(),
            openings.iter().filter(|o| o.is_learned).count()
        );
        self.openings = openings;
        self.loaded = true;
        Ok(&self.openings)
    }

    pub fn invalidate(&mut self) {
        self.loaded = false;
    }

    /// Flip the learned flag. The cached entry changes before the service is
    /// called; a failed toggle puts it back and is the only error returned.
    /// Returns the flag after the refetch.
    pub async fn toggle_learned(
        &mut self,
        api: &dyn TrainerApi,
        id: OpeningId,
    ) -> Result<bool, ClientError> {
        let optimistic = self.flip(id);

        if let Err(e) = api.toggle_learned(id).await {
            warn!("Toggling opening {} failed: {}", id, e);
            if optimistic.is_some() {
                self.flip(id);
            }
            return Err(e);
        }

        // The toggle landed; a failed refetch leaves the patched entry in
        // place and the list marked stale.
        if let Err(e) = self.refresh(api).await {
            warn!("Refetching openings after toggling {} failed: {}", id, e);
        }
        Ok(self
            .get(id)
            .map(|o| o.is_learned)
            .or(optimistic)
            .unwrap_or(false))
    }

    fn flip(&mut self, id: OpeningId) -> Option<bool> {
        let opening = self.openings.iter_mut().find(|o| o.id == id)?;
        opening.is_learned = !opening.is_learned;
        Some(opening.is_learned)
    }

    pub fn openings(&self) -> &[OpeningSummary] {
        &self.openings
    }

    pub fn get(&self, id: OpeningId) -> Option<&OpeningSummary> {
        self.openings.iter().find(|o| o.id == id)
    }

    pub fn for_color(&self, color: PlayerColor) -> impl Iterator<Item = &OpeningSummary> + '_ {
        self.openings.iter().filter(move |o| o.color == color)
    }

    /// Learned opening ids for one color, in list order.
    pub fn learned_ids(&self, color: PlayerColor) -> Vec<OpeningId> {
        self.for_color(color)
            .filter(|o| o.is_learned)
            .map(|o| o.id)
            .collect()
    }

    pub fn learned_count(&self) -> usize {
        self.openings.iter().filter(|o| o.is_learned).count()
    }
}
