use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use super::{
    PollingHandle,
    business::{BUSINESS_POLL_INTERVAL, BusinessNotificationPoller},
    customer::{CUSTOMER_POLL_INTERVAL, CustomerNotificationPoller},
};
use crate::{
    notify::AlertSink,
    session::{SessionUser, UserRole},
    state::AppState,
};

/// Owns the pollers and runs the one matching the signed-in role.
pub struct NotificationShell {
    customer: Arc<CustomerNotificationPoller>,
    business: Arc<BusinessNotificationPoller>,
    customer_interval: Duration,
    business_interval: Duration,
    running: Mutex<Option<PollingHandle>>,
}

impl NotificationShell {
    pub fn new(app: AppState, alerts: Arc<dyn AlertSink>) -> Self {
        Self {
            customer: Arc::new(CustomerNotificationPoller::new(app.clone(), alerts)),
            business: Arc::new(BusinessNotificationPoller::new(app)),
            customer_interval: CUSTOMER_POLL_INTERVAL,
            business_interval: BUSINESS_POLL_INTERVAL,
            running: Mutex::new(None),
        }
    }

    pub fn with_intervals(mut self, customer: Duration, business: Duration) -> Self {
        self.customer_interval = customer;
        self.business_interval = business;
        self
    }

    pub fn customer(&self) -> &Arc<CustomerNotificationPoller> {
        &self.customer
    }

    pub fn business(&self) -> &Arc<BusinessNotificationPoller> {
        &self.business
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Starts polling for `user`, replacing any loop already running.
    pub async fn start(&self, user: SessionUser) {
        let mut running = self.running.lock().await;
        if let Some(handle) = running.take() {
            handle.stop().await;
        }

        match user.role {
            UserRole::Consumer => {
                self.business.deactivate().await;
                self.customer.activate(user).await;
                *running = Some(PollingHandle::spawn(
                    self.customer.clone(),
                    self.customer_interval,
                ));
            }
            UserRole::Business => {
                self.customer.deactivate().await;
                self.business.activate(user).await;
                *running = Some(PollingHandle::spawn(
                    self.business.clone(),
                    self.business_interval,
                ));
            }
            UserRole::Other => {
                self.customer.deactivate().await;
                self.business.deactivate().await;
                tracing::info!(user_id = %user.id, "no notification poller for role");
            }
        }
    }

    /// Stops the loop and resets both pollers. Safe to call when idle.
    pub async fn stop(&self) {
        if let Some(handle) = self.running.lock().await.take() {
            handle.stop().await;
        }
        self.customer.deactivate().await;
        self.business.deactivate().await;
    }
}
