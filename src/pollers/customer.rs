use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use super::PollTask;
use crate::{
    models::{Reservation, ReservationStatus},
    notify::{Alert, AlertSink, POLLER_ALERT_DURATION},
    services::reservation_service,
    session::{SessionUser, UserRole, ensure_role},
    state::AppState,
};

pub const CUSTOMER_POLL_INTERVAL: Duration = Duration::from_secs(15);
pub const RECENT_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerNotificationState {
    pub confirmed_count: usize,
    pub rejected_count: usize,
    pub has_new_confirmed: bool,
    pub has_new_rejected: bool,
    pub loading: bool,
}

impl CustomerNotificationState {
    pub fn total_count(&self) -> usize {
        self.confirmed_count + self.rejected_count
    }
}

/// Status of each reservation as of the previous tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot(HashMap<i64, ReservationStatus>);

impl StatusSnapshot {
    pub fn get(&self, id: i64) -> Option<ReservationStatus> {
        self.0.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Confirmed,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshTransition {
    pub reservation_id: i64,
    pub kind: TransitionKind,
}

impl FreshTransition {
    fn alert(&self) -> Alert {
        let alert = match self.kind {
            TransitionKind::Confirmed => Alert::success(
                "Reservation confirmed!",
                format!(
                    "Your reservation #{} was confirmed by the business.",
                    self.reservation_id
                ),
            ),
            TransitionKind::Rejected => Alert::error(
                "Reservation rejected",
                format!(
                    "Your reservation #{} was rejected by the business.",
                    self.reservation_id
                ),
            ),
        };
        alert.with_duration(POLLER_ALERT_DURATION)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickEvaluation {
    pub confirmed_count: usize,
    pub rejected_count: usize,
    pub transitions: Vec<FreshTransition>,
}

/// Diff one fetched list against the previous snapshot.
///
/// Counts confirmed/cancelled reservations touched within the last 24 hours and
/// reports every `PENDING -> CONFIRMED|CANCELLED` edge. The snapshot is
/// overwritten with the current statuses afterwards, so each edge is reported
/// once.
pub fn evaluate_tick(
    snapshot: &mut StatusSnapshot,
    reservations: &[Reservation],
    now: DateTime<Utc>,
) -> TickEvaluation {
    let cutoff = now - chrono::Duration::hours(RECENT_WINDOW_HOURS);
    let mut evaluation = TickEvaluation::default();

    for reservation in reservations {
        let recent = reservation.last_update() >= cutoff;
        let kind = match reservation.status {
            ReservationStatus::Confirmed => {
                if recent {
                    evaluation.confirmed_count += 1;
                }
                Some(TransitionKind::Confirmed)
            }
            ReservationStatus::Cancelled => {
                if recent {
                    evaluation.rejected_count += 1;
                }
                Some(TransitionKind::Rejected)
            }
            _ => None,
        };

        let was_pending = snapshot.get(reservation.id) == Some(ReservationStatus::Pending);
        if let (Some(kind), true) = (kind, was_pending) {
            evaluation.transitions.push(FreshTransition {
                reservation_id: reservation.id,
                kind,
            });
        }
    }

    snapshot.0 = reservations.iter().map(|r| (r.id, r.status)).collect();
    evaluation
}

/// Watches the consumer's reservations for decisions made by businesses.
pub struct CustomerNotificationPoller {
    app: AppState,
    alerts: Arc<dyn AlertSink>,
    user: RwLock<Option<SessionUser>>,
    snapshot: Mutex<StatusSnapshot>,
    state: RwLock<CustomerNotificationState>,
}

impl CustomerNotificationPoller {
    pub fn new(app: AppState, alerts: Arc<dyn AlertSink>) -> Self {
        Self {
            app,
            alerts,
            user: RwLock::new(None),
            snapshot: Mutex::new(StatusSnapshot::default()),
            state: RwLock::new(CustomerNotificationState::default()),
        }
    }

    pub async fn state(&self) -> CustomerNotificationState {
        self.state.read().await.clone()
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        self.snapshot.lock().await.clone()
    }

    /// Bind the poller to a session. A different user starts from an empty snapshot.
    pub async fn activate(&self, user: SessionUser) {
        let mut snapshot = self.snapshot.lock().await;
        let mut current = self.user.write().await;
        if current.as_ref() != Some(&user) {
            snapshot.clear();
            *self.state.write().await = CustomerNotificationState::default();
        }
        *current = Some(user);
    }

    pub async fn deactivate(&self) {
        let mut snapshot = self.snapshot.lock().await;
        *self.user.write().await = None;
        snapshot.clear();
        *self.state.write().await = CustomerNotificationState::default();
    }

    /// Clears the "new" flags. Counts age out on their own.
    pub async fn mark_as_read(&self) {
        let mut state = self.state.write().await;
        state.has_new_confirmed = false;
        state.has_new_rejected = false;
    }

    pub async fn refresh_notifications(&self) {
        // held for the whole tick: the snapshot has a single writer at a time
        let mut snapshot = self.snapshot.lock().await;
        let user = self.user.read().await.clone();
        if !ensure_role(user.as_ref(), UserRole::Consumer) {
            snapshot.clear();
            *self.state.write().await = CustomerNotificationState::default();
            return;
        }

        self.state.write().await.loading = true;
        let fetched = reservation_service::list_my_reservations(&self.app, None).await;

        match fetched {
            Ok(reservations) => {
                let mut evaluation =
                    evaluate_tick(&mut snapshot, &reservations, self.app.clock.now());
                let mut decided = Vec::with_capacity(evaluation.transitions.len());
                for transition in evaluation.transitions.drain(..) {
                    let self_cancelled = transition.kind == TransitionKind::Rejected
                        && self.app.local_cancels.claim(transition.reservation_id).await;
                    if self_cancelled {
                        tracing::debug!(
                            reservation_id = %transition.reservation_id,
                            "cancelled on this device, not alerting"
                        );
                    } else {
                        decided.push(transition);
                    }
                }
                evaluation.transitions = decided;
                self.app.local_cancels.retain_pending(&reservations).await;
                {
                    let mut state = self.state.write().await;
                    state.confirmed_count = evaluation.confirmed_count;
                    state.rejected_count = evaluation.rejected_count;
                    for transition in &evaluation.transitions {
                        match transition.kind {
                            TransitionKind::Confirmed => state.has_new_confirmed = true,
                            TransitionKind::Rejected => state.has_new_rejected = true,
                        }
                    }
                    state.loading = false;
                }
                for transition in &evaluation.transitions {
                    tracing::info!(
                        reservation_id = %transition.reservation_id,
                        kind = ?transition.kind,
                        "reservation decided by business"
                    );
                    self.alerts.notify(transition.alert());
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "refreshing customer notifications failed");
                let mut state = self.state.write().await;
                state.confirmed_count = 0;
                state.rejected_count = 0;
                state.loading = false;
            }
        }
    }
}

#[async_trait]
impl PollTask for CustomerNotificationPoller {
    fn name(&self) -> &'static str {
        "customer_notifications"
    }

    async fn tick(&self) {
        self.refresh_notifications().await;
    }
}
