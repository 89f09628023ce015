//! Observable reservation state for the consumer and business screens.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    lifecycle::reconcile,
    models::Reservation,
};

pub mod business_reservations;
pub mod reservations;

pub use business_reservations::BusinessReservationHook;
pub use reservations::{CancelOutcome, ReservationHook};

/// What a screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationState {
    pub reservations: Vec<Reservation>,
    pub loading: bool,
    pub refreshing: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadKind {
    Load,
    Refresh,
}

#[derive(Debug, Default)]
struct Inner {
    view: ReservationState,
    loads: u32,
    refreshes: u32,
}

impl Inner {
    fn settle_flags(&mut self) {
        self.view.loading = self.loads > 0;
        self.view.refreshing = self.refreshes > 0;
    }
}

/// List state shared by both hooks.
///
/// Every list request takes a generation number; only the newest request may
/// replace the list, so a slow response to an older filter cannot overwrite a
/// newer one. Flags stay raised while any request of their kind is in flight.
#[derive(Debug, Default)]
pub(crate) struct ReservationStore {
    inner: RwLock<Inner>,
    generation: AtomicU64,
}

impl ReservationStore {
    pub(crate) async fn snapshot(&self) -> ReservationState {
        self.inner.read().await.view.clone()
    }

    pub(crate) async fn find(&self, id: i64) -> Option<Reservation> {
        self.inner
            .read()
            .await
            .view
            .reservations
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub(crate) async fn begin(&self, kind: LoadKind) -> u64 {
        let mut inner = self.inner.write().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        match kind {
            LoadKind::Load => inner.loads += 1,
            LoadKind::Refresh => inner.refreshes += 1,
        }
        inner.view.error = None;
        inner.settle_flags();
        generation
    }

    /// Land a list response. Returns false when a newer request superseded it.
    pub(crate) async fn finish(
        &self,
        kind: LoadKind,
        generation: u64,
        outcome: Result<Vec<Reservation>, String>,
    ) -> bool {
        let mut inner = self.inner.write().await;
        match kind {
            LoadKind::Load => inner.loads = inner.loads.saturating_sub(1),
            LoadKind::Refresh => inner.refreshes = inner.refreshes.saturating_sub(1),
        }
        inner.settle_flags();

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "discarding superseded reservation response");
            return false;
        }
        match outcome {
            Ok(reservations) => inner.view.reservations = reservations,
            // previous list stays on screen
            Err(message) => inner.view.error = Some(message),
        }
        true
    }

    pub(crate) async fn start_busy(&self) {
        let mut inner = self.inner.write().await;
        inner.loads += 1;
        inner.view.error = None;
        inner.settle_flags();
    }

    pub(crate) async fn end_busy(&self, error: Option<String>) {
        let mut inner = self.inner.write().await;
        inner.loads = inner.loads.saturating_sub(1);
        if error.is_some() {
            inner.view.error = error;
        }
        inner.settle_flags();
    }

    pub(crate) async fn set_error(&self, message: impl Into<String>) {
        self.inner.write().await.view.error = Some(message.into());
    }

    pub(crate) async fn prepend(&self, reservation: Reservation) {
        let mut inner = self.inner.write().await;
        inner.view.reservations.retain(|r| r.id != reservation.id);
        inner.view.reservations.insert(0, reservation);
    }

    /// Apply the server's copy after an accepted mutation.
    pub(crate) async fn settle(&self, server: &Reservation, at: DateTime<Utc>) -> bool {
        let mut inner = self.inner.write().await;
        reconcile(&mut inner.view.reservations, server, at)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::ReservationStatus;

    fn reservation(id: i64) -> Reservation {
        Reservation {
            id,
            product_id: 1,
            business_id: Some(1),
            outlet_id: None,
            user_id: 1,
            quantity: 1,
            status: ReservationStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap(),
            updated_at: None,
            expires_at: None,
            picked_up_at: None,
            cancelled_at: None,
            product: None,
        }
    }

    #[tokio::test]
    async fn newest_request_wins_regardless_of_arrival_order() {
        let store = ReservationStore::default();
        let first = store.begin(LoadKind::Load).await;
        let second = store.begin(LoadKind::Load).await;

        assert!(store.finish(LoadKind::Load, second, Ok(vec![reservation(2)])).await);
        assert!(store.snapshot().await.loading);
        assert!(!store.finish(LoadKind::Load, first, Ok(vec![reservation(1)])).await);

        let state = store.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.reservations.len(), 1);
        assert_eq!(state.reservations[0].id, 2);
    }

    #[tokio::test]
    async fn failure_keeps_previous_list() {
        let store = ReservationStore::default();
        let generation = store.begin(LoadKind::Load).await;
        store.finish(LoadKind::Load, generation, Ok(vec![reservation(1)])).await;

        let generation = store.begin(LoadKind::Refresh).await;
        assert!(store.snapshot().await.refreshing);
        store
            .finish(LoadKind::Refresh, generation, Err("Network error: down".into()))
            .await;

        let state = store.snapshot().await;
        assert!(!state.refreshing);
        assert_eq!(state.error.as_deref(), Some("Network error: down"));
        assert_eq!(state.reservations.len(), 1);
    }
}
