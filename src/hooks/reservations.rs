use std::sync::Arc;

use super::{LoadKind, ReservationState, ReservationStore};
use crate::{
    dto::reservations::{CreateReservationInput, StatusFilter},
    lifecycle::{CancelBlock, CancelEligibility, cancel_eligibility},
    models::{Reservation, ReservationStatus},
    notify::{Alert, AlertSink, ConfirmPrompt, Confirmer},
    services::reservation_service,
    state::AppState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    Declined,
    NotFound,
    Ineligible(CancelBlock),
    Failed(String),
}

/// Consumer-side reservation list with confirm-before-cancel.
pub struct ReservationHook {
    app: AppState,
    alerts: Arc<dyn AlertSink>,
    confirmer: Arc<dyn Confirmer>,
    store: ReservationStore,
}

impl ReservationHook {
    pub fn new(app: AppState, alerts: Arc<dyn AlertSink>, confirmer: Arc<dyn Confirmer>) -> Self {
        Self {
            app,
            alerts,
            confirmer,
            store: ReservationStore::default(),
        }
    }

    pub async fn state(&self) -> ReservationState {
        self.store.snapshot().await
    }

    pub async fn reservations(&self) -> Vec<Reservation> {
        self.store.snapshot().await.reservations
    }

    pub async fn create(&self, input: CreateReservationInput) -> Option<Reservation> {
        self.store.start_busy().await;
        match reservation_service::create_reservation(&self.app, input).await {
            Ok(reservation) => {
                self.store.prepend(reservation.clone()).await;
                self.store.end_busy(None).await;
                self.alerts.notify(Alert::success(
                    "Reservation created",
                    "Your reservation was created. The business still has to confirm it.",
                ));
                Some(reservation)
            }
            Err(err) => {
                let message = err.user_message();
                self.store.end_busy(Some(message.clone())).await;
                self.alerts.notify(Alert::error("Error", message));
                None
            }
        }
    }

    pub async fn fetch_mine(&self, status: StatusFilter) {
        self.load(LoadKind::Load, status).await;
    }

    /// Pull-to-refresh: the current list stays visible while `refreshing` is set.
    pub async fn refresh(&self, status: StatusFilter) {
        self.load(LoadKind::Refresh, status).await;
    }

    async fn load(&self, kind: LoadKind, status: StatusFilter) {
        let generation = self.store.begin(kind).await;
        let outcome = reservation_service::list_my_reservations(&self.app, status)
            .await
            .map_err(|err| err.user_message());
        self.store.finish(kind, generation, outcome).await;
    }

    pub async fn get_by_id(&self, id: i64) -> Option<Reservation> {
        self.store.start_busy().await;
        match reservation_service::get_reservation(&self.app, id).await {
            Ok(reservation) => {
                self.store.end_busy(None).await;
                Some(reservation)
            }
            Err(err) => {
                self.store.end_busy(Some(err.user_message())).await;
                None
            }
        }
    }

    /// Eligibility of a listed reservation right now, for countdown displays.
    pub async fn cancel_eligibility(&self, id: i64) -> Option<CancelEligibility> {
        let reservation = self.store.find(id).await?;
        Some(cancel_eligibility(&reservation, self.app.clock.now()))
    }

    /// Cancel after asking the user. Eligibility is judged against the listed
    /// copy, both before prompting and again once the user has answered.
    pub async fn cancel(&self, id: i64) -> CancelOutcome {
        if let Err(outcome) = self.check_cancellable(id).await {
            return outcome;
        }
        if !self.confirmer.confirm(&cancel_prompt()).await {
            return CancelOutcome::Declined;
        }
        if let Err(outcome) = self.check_cancellable(id).await {
            return outcome;
        }

        self.store.start_busy().await;
        let result = reservation_service::cancel_reservation(&self.app, id).await;
        self.store.end_busy(None).await;

        match result {
            Ok(updated) => {
                self.app.local_cancels.record(id).await;
                self.store.settle(&updated, self.app.clock.now()).await;
                self.alerts.notify(Alert::success(
                    "Reservation cancelled",
                    "Your reservation has been cancelled.",
                ));
                CancelOutcome::Cancelled
            }
            Err(err) => {
                let message = err.user_message();
                self.alerts.notify(Alert::error("Error", message.clone()));
                CancelOutcome::Failed(message)
            }
        }
    }

    async fn check_cancellable(&self, id: i64) -> Result<(), CancelOutcome> {
        let Some(reservation) = self.store.find(id).await else {
            self.alerts
                .notify(Alert::error("Error", "Reservation not found"));
            return Err(CancelOutcome::NotFound);
        };
        let verdict = cancel_eligibility(&reservation, self.app.clock.now());
        match verdict.reason {
            None => Ok(()),
            Some(block) => {
                tracing::debug!(reservation_id = %id, reason = block.as_str(), "cancel refused locally");
                self.alerts
                    .notify(Alert::error("Cannot cancel", block.user_message()));
                Err(CancelOutcome::Ineligible(block))
            }
        }
    }

    pub async fn confirm(&self, id: i64) -> bool {
        self.transition(id, ReservationStatus::Confirmed).await
    }

    pub async fn mark_picked_up(&self, id: i64) -> bool {
        self.transition(id, ReservationStatus::PickedUp).await
    }

    async fn transition(&self, id: i64, next: ReservationStatus) -> bool {
        self.store.start_busy().await;
        let result = match next {
            ReservationStatus::PickedUp => reservation_service::mark_picked_up(&self.app, id).await,
            _ => reservation_service::confirm_reservation(&self.app, id).await,
        };
        match result {
            Ok(updated) => {
                self.store.settle(&updated, self.app.clock.now()).await;
                self.store.end_busy(None).await;
                let (title, message) = match next {
                    ReservationStatus::PickedUp => {
                        ("Picked up", "The reservation was marked as picked up.")
                    }
                    _ => ("Reservation confirmed", "The reservation has been confirmed."),
                };
                self.alerts.notify(Alert::success(title, message));
                true
            }
            Err(err) => {
                let message = err.user_message();
                self.store.end_busy(Some(message.clone())).await;
                self.alerts.notify(Alert::error("Error", message));
                false
            }
        }
    }
}

fn cancel_prompt() -> ConfirmPrompt {
    ConfirmPrompt {
        title: "Cancel reservation".into(),
        message: "Are you sure you want to cancel this reservation?".into(),
        confirm_label: "Yes, cancel".into(),
        cancel_label: "No".into(),
    }
}
