use std::sync::Arc;

use super::{LoadKind, ReservationState, ReservationStore};
use crate::{
    dto::reservations::StatusFilter,
    error::{AppError, AppResult},
    notify::{Alert, AlertSink},
    services::reservation_service,
    state::AppState,
};

/// Reservations of one business, with the owner's confirm / reject / complete actions.
///
/// Mutations patch the local list on success and hand errors back to the caller.
pub struct BusinessReservationHook {
    app: AppState,
    alerts: Arc<dyn AlertSink>,
    business_id: Option<i64>,
    store: ReservationStore,
}

impl BusinessReservationHook {
    pub fn new(app: AppState, alerts: Arc<dyn AlertSink>, business_id: Option<i64>) -> Self {
        Self {
            app,
            alerts,
            business_id,
            store: ReservationStore::default(),
        }
    }

    pub fn business_id(&self) -> Option<i64> {
        self.business_id
    }

    pub async fn state(&self) -> ReservationState {
        self.store.snapshot().await
    }

    pub async fn load(&self, status: StatusFilter) -> AppResult<()> {
        self.fetch(LoadKind::Load, status).await
    }

    pub async fn refresh(&self, status: StatusFilter) -> AppResult<()> {
        self.fetch(LoadKind::Refresh, status).await
    }

    async fn fetch(&self, kind: LoadKind, status: StatusFilter) -> AppResult<()> {
        let Some(business_id) = self.business_id else {
            let message = "No business ID provided";
            self.store.set_error(message).await;
            return Err(AppError::Validation(message.into()));
        };

        let generation = self.store.begin(kind).await;
        match reservation_service::list_business_reservations(&self.app, business_id, status).await
        {
            Ok(reservations) => {
                self.store.finish(kind, generation, Ok(reservations)).await;
                Ok(())
            }
            Err(err) => {
                let message = err.user_message();
                tracing::error!(business_id = %business_id, error = %err, "loading business reservations failed");
                self.store.finish(kind, generation, Err(message.clone())).await;
                self.alerts.notify(Alert::error("Error", message));
                Err(err)
            }
        }
    }

    pub async fn confirm(&self, id: i64) -> AppResult<()> {
        let updated = reservation_service::confirm_reservation(&self.app, id).await?;
        self.store.settle(&updated, self.app.clock.now()).await;
        Ok(())
    }

    /// Business-initiated cancel. Goes through the same server call as a
    /// consumer cancel, so the two are indistinguishable afterwards.
    pub async fn reject(&self, id: i64) -> AppResult<()> {
        let updated = reservation_service::cancel_reservation(&self.app, id).await?;
        self.store.settle(&updated, self.app.clock.now()).await;
        Ok(())
    }

    pub async fn complete(&self, id: i64) -> AppResult<()> {
        let updated = reservation_service::mark_picked_up(&self.app, id).await?;
        self.store.settle(&updated, self.app.clock.now()).await;
        Ok(())
    }
}
