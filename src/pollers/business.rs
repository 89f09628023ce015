use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use super::PollTask;
use crate::{
    models::ReservationStatus,
    services::{business_service, reservation_service},
    session::{SessionUser, UserRole, ensure_role},
    state::AppState,
};

pub const BUSINESS_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessNotificationState {
    pub pending_total: usize,
    pub pending_by_business: HashMap<i64, usize>,
    pub loading: bool,
}

/// Pending-reservation badge counts across every business the user owns.
pub struct BusinessNotificationPoller {
    app: AppState,
    user: RwLock<Option<SessionUser>>,
    tick_lock: Mutex<()>,
    state: RwLock<BusinessNotificationState>,
}

impl BusinessNotificationPoller {
    pub fn new(app: AppState) -> Self {
        Self {
            app,
            user: RwLock::new(None),
            tick_lock: Mutex::new(()),
            state: RwLock::new(BusinessNotificationState::default()),
        }
    }

    pub async fn state(&self) -> BusinessNotificationState {
        self.state.read().await.clone()
    }

    pub async fn activate(&self, user: SessionUser) {
        let _tick = self.tick_lock.lock().await;
        *self.user.write().await = Some(user);
    }

    pub async fn deactivate(&self) {
        let _tick = self.tick_lock.lock().await;
        *self.user.write().await = None;
        *self.state.write().await = BusinessNotificationState::default();
    }

    /// Absolute pending counts; one business failing counts as zero for it.
    pub async fn refresh_pending_count(&self) {
        let _tick = self.tick_lock.lock().await;
        let user = self.user.read().await.clone();
        if !ensure_role(user.as_ref(), UserRole::Business) {
            *self.state.write().await = BusinessNotificationState::default();
            return;
        }

        self.state.write().await.loading = true;
        let businesses = match business_service::list_owned_businesses(&self.app).await {
            Ok(businesses) => businesses,
            Err(err) => {
                tracing::error!(error = %err, "refreshing pending count failed");
                *self.state.write().await = BusinessNotificationState::default();
                return;
            }
        };
        if businesses.is_empty() {
            *self.state.write().await = BusinessNotificationState::default();
            return;
        }

        let mut pending_by_business = HashMap::with_capacity(businesses.len());
        let mut pending_total = 0;
        for business in &businesses {
            let count = match reservation_service::list_business_reservations(
                &self.app,
                business.id,
                Some(ReservationStatus::Pending),
            )
            .await
            {
                Ok(reservations) => reservations.len(),
                Err(err) => {
                    tracing::warn!(
                        business_id = %business.id,
                        error = %err,
                        "loading pending reservations failed"
                    );
                    0
                }
            };
            pending_by_business.insert(business.id, count);
            pending_total += count;
        }

        tracing::debug!(pending_total, businesses = businesses.len(), "pending count refreshed");
        *self.state.write().await = BusinessNotificationState {
            pending_total,
            pending_by_business,
            loading: false,
        };
    }
}

#[async_trait]
impl PollTask for BusinessNotificationPoller {
    fn name(&self) -> &'static str {
        "business_notifications"
    }

    async fn tick(&self) {
        self.refresh_pending_count().await;
    }
}
