use std::{collections::HashSet, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    api::ReservationApi,
    clock::{Clock, SystemClock},
    models::{Reservation, ReservationStatus},
    session::SessionStore,
};

pub const DEFAULT_CATALOG_PAGE_SIZE: u32 = 1000;

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn ReservationApi>,
    pub session: Arc<dyn SessionStore>,
    pub clock: Arc<dyn Clock>,
    pub catalog_page_size: u32,
    pub local_cancels: Arc<LocalCancellations>,
}

impl AppState {
    pub fn new(api: Arc<dyn ReservationApi>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            session,
            clock: Arc::new(SystemClock),
            catalog_page_size: DEFAULT_CATALOG_PAGE_SIZE,
            local_cancels: Arc::new(LocalCancellations::default()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_catalog_page_size(mut self, size: u32) -> Self {
        self.catalog_page_size = size;
        self
    }
}

/// Reservations this client cancelled itself, so the customer poller does not
/// report them back as business rejections.
#[derive(Debug, Default)]
pub struct LocalCancellations {
    ids: Mutex<HashSet<i64>>,
}

impl LocalCancellations {
    pub async fn record(&self, id: i64) {
        self.ids.lock().await.insert(id);
    }

    /// Consume the mark for `id`. True when this client cancelled it.
    pub async fn claim(&self, id: i64) -> bool {
        self.ids.lock().await.remove(&id)
    }

    /// Drop marks whose cancellation is already visible in `reservations`.
    /// Ids still listed as pending keep their mark for the next tick.
    pub async fn retain_pending(&self, reservations: &[Reservation]) {
        self.ids.lock().await.retain(|id| {
            reservations
                .iter()
                .any(|r| r.id == *id && r.status == ReservationStatus::Pending)
        });
    }

    pub async fn len(&self) -> usize {
        self.ids.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ids.lock().await.is_empty()
    }
}
