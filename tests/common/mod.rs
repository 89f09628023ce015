#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pickup_reservations::{
    api::ReservationApi,
    clock::{Clock, ManualClock},
    dto::reservations::{CreateReservationInput, StatusFilter},
    error::{AppError, AppResult},
    models::{Business, BusinessSummary, Product, Reservation, ReservationStatus},
    notify::{Alert, AlertSink, ConfirmPrompt, Confirmer},
    session::{MemorySessionStore, SessionUser, UserRole},
    state::AppState,
};

pub const TOKEN: &str = "test-token";
pub const CONSUMER_ID: i64 = 1;
pub const OWNER_ID: i64 = 50;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

#[derive(Default)]
struct Backend {
    reservations: Vec<Reservation>,
    products: Vec<Product>,
    businesses: Vec<Business>,
    owned: HashMap<i64, Vec<Business>>,
    next_id: i64,
}

/// In-memory reservation backend with call accounting and failure switches.
pub struct FakeApi {
    clock: Arc<ManualClock>,
    backend: Mutex<Backend>,
    calls: Mutex<HashMap<&'static str, usize>>,
    total: AtomicUsize,
    fail_products: AtomicBool,
    fail_my_reservations: AtomicBool,
    failing_businesses: Mutex<HashSet<i64>>,
}

impl FakeApi {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            backend: Mutex::new(Backend {
                next_id: 100,
                ..Backend::default()
            }),
            calls: Mutex::new(HashMap::new()),
            total: AtomicUsize::new(0),
            fail_products: AtomicBool::new(false),
            fail_my_reservations: AtomicBool::new(false),
            failing_businesses: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_catalog(self, products: Vec<Product>, businesses: Vec<Business>) -> Self {
        {
            let mut backend = self.backend.lock().unwrap();
            backend.products = products;
            backend.businesses = businesses;
        }
        self
    }

    pub fn own(&self, user_id: i64, businesses: Vec<Business>) {
        self.backend
            .lock()
            .unwrap()
            .owned
            .insert(user_id, businesses);
    }

    pub fn seed(&self, reservation: Reservation) {
        self.backend.lock().unwrap().reservations.push(reservation);
    }

    /// Status change made by somebody else, e.g. the business owner.
    pub fn set_status(&self, id: i64, status: ReservationStatus) {
        let now = self.clock.now();
        let mut backend = self.backend.lock().unwrap();
        if let Some(r) = backend.reservations.iter_mut().find(|r| r.id == id) {
            r.status = status;
            r.updated_at = Some(now);
            match status {
                ReservationStatus::Cancelled => r.cancelled_at = Some(now),
                ReservationStatus::PickedUp => r.picked_up_at = Some(now),
                _ => {}
            }
        }
    }

    pub fn server_status(&self, id: i64) -> Option<ReservationStatus> {
        self.backend
            .lock()
            .unwrap()
            .reservations
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.status)
    }

    pub fn fail_products(&self, fail: bool) {
        self.fail_products.store(fail, Ordering::SeqCst);
    }

    pub fn fail_my_reservations(&self, fail: bool) {
        self.fail_my_reservations.store(fail, Ordering::SeqCst);
    }

    pub fn fail_business(&self, business_id: i64) {
        self.failing_businesses.lock().unwrap().insert(business_id);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    fn record(&self, operation: &'static str, token: Option<&str>) -> AppResult<()> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;
        match token {
            Some(token) if token != TOKEN => Err(AppError::Validation("Invalid token".into())),
            _ => Ok(()),
        }
    }

    fn update(&self, id: i64, next: ReservationStatus) -> AppResult<Reservation> {
        let now = self.clock.now();
        let mut backend = self.backend.lock().unwrap();
        let reservation = backend
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::Validation("Reservation not found".into()))?;
        if !reservation.status.can_transition_to(next) {
            return Err(AppError::Validation(format!(
                "Cannot move reservation from {} to {next}",
                reservation.status
            )));
        }
        reservation.status = next;
        reservation.updated_at = Some(now);
        match next {
            ReservationStatus::Cancelled => reservation.cancelled_at = Some(now),
            ReservationStatus::PickedUp => reservation.picked_up_at = Some(now),
            _ => {}
        }
        Ok(reservation.clone())
    }
}

fn matches(status: StatusFilter, reservation: &Reservation) -> bool {
    status.is_none_or(|s| s == reservation.status)
}

#[async_trait]
impl ReservationApi for FakeApi {
    async fn create_reservation(
        &self,
        token: &str,
        input: &CreateReservationInput,
    ) -> AppResult<Reservation> {
        self.record("create_reservation", Some(token))?;
        let now = self.clock.now();
        let mut backend = self.backend.lock().unwrap();
        backend.next_id += 1;
        let created = Reservation {
            id: backend.next_id,
            product_id: input.product_id,
            business_id: Some(input.business_id),
            outlet_id: None,
            user_id: CONSUMER_ID,
            quantity: input.quantity,
            status: ReservationStatus::Pending,
            created_at: now,
            updated_at: Some(now),
            expires_at: None,
            picked_up_at: None,
            cancelled_at: None,
            product: None,
        };
        backend.reservations.push(created.clone());
        Ok(created)
    }

    async fn get_my_reservations(
        &self,
        token: &str,
        status: StatusFilter,
    ) -> AppResult<Vec<Reservation>> {
        self.record("get_my_reservations", Some(token))?;
        if self.fail_my_reservations.load(Ordering::SeqCst) {
            return Err(AppError::Transport("HTTP 502 Bad Gateway".into()));
        }
        let backend = self.backend.lock().unwrap();
        Ok(backend
            .reservations
            .iter()
            .filter(|r| r.user_id == CONSUMER_ID && matches(status, r))
            .cloned()
            .collect())
    }

    async fn cancel_reservation(&self, token: &str, reservation_id: i64) -> AppResult<Reservation> {
        self.record("cancel_reservation", Some(token))?;
        self.update(reservation_id, ReservationStatus::Cancelled)
    }

    async fn update_reservation_status(
        &self,
        token: &str,
        reservation_id: i64,
        status: ReservationStatus,
    ) -> AppResult<Reservation> {
        self.record("update_reservation_status", Some(token))?;
        self.update(reservation_id, status)
    }

    async fn mark_reservation_picked_up(
        &self,
        token: &str,
        reservation_id: i64,
    ) -> AppResult<Reservation> {
        self.record("mark_reservation_picked_up", Some(token))?;
        self.update(reservation_id, ReservationStatus::PickedUp)
    }

    async fn get_business_reservations(
        &self,
        token: &str,
        business_id: i64,
        status: StatusFilter,
    ) -> AppResult<Vec<Reservation>> {
        self.record("get_business_reservations", Some(token))?;
        if self.failing_businesses.lock().unwrap().contains(&business_id) {
            return Err(AppError::Transport("HTTP 500 Internal Server Error".into()));
        }
        let backend = self.backend.lock().unwrap();
        Ok(backend
            .reservations
            .iter()
            .filter(|r| r.business_ref() == Some(business_id) && matches(status, r))
            .cloned()
            .collect())
    }

    async fn get_products_by_business(&self, business_id: i64) -> AppResult<Vec<Product>> {
        self.record("get_products_by_business", None)?;
        if self.fail_products.load(Ordering::SeqCst) {
            return Err(AppError::Transport("HTTP 503 Service Unavailable".into()));
        }
        let backend = self.backend.lock().unwrap();
        Ok(backend
            .products
            .iter()
            .filter(|p| p.business_id == Some(business_id))
            .cloned()
            .collect())
    }

    async fn get_all_products(&self, limit: u32, offset: u32) -> AppResult<Vec<Product>> {
        self.record("get_all_products", None)?;
        if self.fail_products.load(Ordering::SeqCst) {
            return Err(AppError::Transport("HTTP 503 Service Unavailable".into()));
        }
        let backend = self.backend.lock().unwrap();
        Ok(backend
            .products
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_all_businesses(&self) -> AppResult<Vec<Business>> {
        self.record("get_all_businesses", None)?;
        Ok(self.backend.lock().unwrap().businesses.clone())
    }

    async fn get_businesses_by_user(&self, user_id: i64) -> AppResult<Vec<Business>> {
        self.record("get_businesses_by_user", None)?;
        Ok(self
            .backend
            .lock()
            .unwrap()
            .owned
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct RecordingAlerts {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingAlerts {
    pub fn all(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.all().into_iter().map(|a| a.title).collect()
    }
}

impl AlertSink for RecordingAlerts {
    fn notify(&self, alert: Alert) {
        self.alerts.lock().unwrap().push(alert);
    }
}

/// Answers every prompt the same way and counts how often it was asked.
pub struct ScriptedConfirmer {
    answer: bool,
    asked: AtomicUsize,
}

impl ScriptedConfirmer {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: AtomicUsize::new(0),
        }
    }

    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, _prompt: &ConfirmPrompt) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub api: Arc<FakeApi>,
    pub session: Arc<MemorySessionStore>,
    pub alerts: Arc<RecordingAlerts>,
    pub state: AppState,
    pub user: SessionUser,
}

impl Harness {
    pub fn new(role: UserRole, build: impl FnOnce(FakeApi) -> FakeApi) -> Self {
        let user_id = match role {
            UserRole::Business => OWNER_ID,
            _ => CONSUMER_ID,
        };
        let clock = Arc::new(ManualClock::new(start_time()));
        let api = Arc::new(build(FakeApi::new(clock.clone())));
        let user = SessionUser::new(user_id, role);
        let session = Arc::new(MemorySessionStore::signed_in(TOKEN, user.clone()));
        let state = AppState::new(api.clone(), session.clone()).with_clock(clock.clone());
        Self {
            clock,
            api,
            session,
            alerts: Arc::new(RecordingAlerts::default()),
            state,
            user,
        }
    }
}

pub fn business(id: i64, name: &str) -> Business {
    Business {
        id,
        name: name.into(),
        description: None,
        address: Some(format!("{id} Market Street")),
        phone: None,
        latitude: None,
        longitude: None,
        is_active: Some(true),
    }
}

pub fn product(id: i64, business_id: i64, name: &str) -> Product {
    Product {
        id,
        business_id: Some(business_id),
        name: name.into(),
        description: Some(format!("{name}, baked this morning")),
        price: 4.5,
        discounted_price: Some(2.0),
        image_url: None,
        stock: Some(10),
        business: Some(BusinessSummary {
            id: business_id,
            name: "embedded".into(),
            address: String::new(),
            phone: None,
            latitude: None,
            longitude: None,
        }),
    }
}

pub fn reservation(
    id: i64,
    product_id: i64,
    business_id: i64,
    status: ReservationStatus,
    created_at: DateTime<Utc>,
) -> Reservation {
    Reservation {
        id,
        product_id,
        business_id: Some(business_id),
        outlet_id: None,
        user_id: CONSUMER_ID,
        quantity: 1,
        status,
        created_at,
        updated_at: Some(created_at),
        expires_at: None,
        picked_up_at: None,
        cancelled_at: match status {
            ReservationStatus::Cancelled => Some(created_at),
            _ => None,
        },
        product: None,
    }
}
