//! Remote operations consumed by the reservation client.
//!
//! The trait is the seam between the service layer and the wire: the GraphQL
//! implementation lives in [`graphql`], tests substitute an in-memory backend.

use async_trait::async_trait;

use crate::{
    dto::reservations::{CreateReservationInput, StatusFilter},
    error::AppResult,
    models::{Business, Product, Reservation, ReservationStatus},
};

pub mod graphql;
pub mod queries;

pub use graphql::GraphQlClient;

#[async_trait]
pub trait ReservationApi: Send + Sync {
    async fn create_reservation(
        &self,
        token: &str,
        input: &CreateReservationInput,
    ) -> AppResult<Reservation>;

    async fn get_my_reservations(
        &self,
        token: &str,
        status: StatusFilter,
    ) -> AppResult<Vec<Reservation>>;

    async fn cancel_reservation(&self, token: &str, reservation_id: i64) -> AppResult<Reservation>;

    async fn update_reservation_status(
        &self,
        token: &str,
        reservation_id: i64,
        status: ReservationStatus,
    ) -> AppResult<Reservation>;

    async fn mark_reservation_picked_up(
        &self,
        token: &str,
        reservation_id: i64,
    ) -> AppResult<Reservation>;

    async fn get_business_reservations(
        &self,
        token: &str,
        business_id: i64,
        status: StatusFilter,
    ) -> AppResult<Vec<Reservation>>;

    async fn get_products_by_business(&self, business_id: i64) -> AppResult<Vec<Product>>;

    async fn get_all_products(&self, limit: u32, offset: u32) -> AppResult<Vec<Product>>;

    async fn get_all_businesses(&self) -> AppResult<Vec<Business>>;

    async fn get_businesses_by_user(&self, user_id: i64) -> AppResult<Vec<Business>>;
}
