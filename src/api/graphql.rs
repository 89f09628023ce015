use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::Instrument;
use uuid::Uuid;

use super::{ReservationApi, queries};
use crate::{
    config::AppConfig,
    dto::{
        graphql::{GraphQlRequest, GraphQlResponse},
        reservations::{CreateReservationInput, StatusFilter},
    },
    error::{AppError, AppResult},
    models::{Business, Product, Reservation, ReservationStatus},
};

/// Reqwest-backed GraphQL transport. Every call is fire-once; retrying is the caller's job.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GraphQlClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Self::new(config.api_url.clone(), config.http_timeout)
    }

    async fn execute(
        &self,
        operation: &str,
        template: &str,
        variables: Value,
        token: Option<&str>,
    ) -> AppResult<GraphQlResponse> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "graphql_request",
            operation = %operation,
            request_id = %request_id
        );

        async move {
            let query = queries::document(template);
            let body = GraphQlRequest {
                operation_name: operation,
                query: &query,
                variables,
            };
            let mut request = self
                .http
                .post(&self.endpoint)
                .header("x-request-id", request_id.to_string())
                .json(&body);
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }

            let started = Instant::now();
            let response = request.send().await.map_err(|err| {
                tracing::error!(error = %err, "request failed");
                AppError::Transport(err.to_string())
            })?;
            let status = response.status();
            let text = response.text().await?;
            tracing::debug!(
                status = %status,
                ms = %started.elapsed().as_millis(),
                "request finished"
            );

            match serde_json::from_str::<GraphQlResponse>(&text) {
                Ok(envelope) => {
                    if let Some(message) = envelope.first_error() {
                        tracing::warn!(message = %message, "operation rejected");
                        return Err(AppError::Validation(message.to_string()));
                    }
                    if !status.is_success() {
                        return Err(AppError::Transport(format!("HTTP {status}")));
                    }
                    Ok(envelope)
                }
                Err(_) if !status.is_success() => {
                    Err(AppError::Transport(format!("HTTP {status}")))
                }
                Err(err) => Err(AppError::Decode(err)),
            }
        }
        .instrument(span)
        .await
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        operation: &str,
        template: &str,
        field: &str,
        variables: Value,
        token: Option<&str>,
    ) -> AppResult<T> {
        let mut envelope = self.execute(operation, template, variables, token).await?;
        let value = envelope
            .take_field(field)
            .ok_or_else(|| AppError::Transport(format!("empty `{field}` payload")))?;
        Ok(serde_json::from_value(value)?)
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        operation: &str,
        template: &str,
        field: &str,
        variables: Value,
        token: Option<&str>,
    ) -> AppResult<Vec<T>> {
        let mut envelope = self.execute(operation, template, variables, token).await?;
        match envelope.take_field(field) {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }
}

fn backend_status(status: StatusFilter) -> Option<String> {
    status.map(|s| s.as_backend())
}

#[async_trait]
impl ReservationApi for GraphQlClient {
    async fn create_reservation(
        &self,
        token: &str,
        input: &CreateReservationInput,
    ) -> AppResult<Reservation> {
        self.fetch_one(
            "CreateReservation",
            queries::CREATE_RESERVATION,
            "createReservation",
            json!({
                "businessId": input.business_id,
                "productId": input.product_id,
                "quantity": input.quantity,
                "token": token,
            }),
            Some(token),
        )
        .await
    }

    async fn get_my_reservations(
        &self,
        token: &str,
        status: StatusFilter,
    ) -> AppResult<Vec<Reservation>> {
        self.fetch_list(
            "GetMyReservations",
            queries::GET_MY_RESERVATIONS,
            "getMyReservations",
            json!({ "token": token, "status": backend_status(status) }),
            Some(token),
        )
        .await
    }

    async fn cancel_reservation(&self, token: &str, reservation_id: i64) -> AppResult<Reservation> {
        self.fetch_one(
            "CancelReservation",
            queries::CANCEL_RESERVATION,
            "cancelReservation",
            json!({ "reservationId": reservation_id, "token": token }),
            Some(token),
        )
        .await
    }

    async fn update_reservation_status(
        &self,
        token: &str,
        reservation_id: i64,
        status: ReservationStatus,
    ) -> AppResult<Reservation> {
        self.fetch_one(
            "UpdateReservationStatus",
            queries::UPDATE_RESERVATION_STATUS,
            "updateReservationStatus",
            json!({
                "reservationId": reservation_id,
                "token": token,
                "status": status.as_backend(),
            }),
            Some(token),
        )
        .await
    }

    async fn mark_reservation_picked_up(
        &self,
        token: &str,
        reservation_id: i64,
    ) -> AppResult<Reservation> {
        self.fetch_one(
            "MarkAsPickedUp",
            queries::MARK_AS_PICKED_UP,
            "markReservationPickedUp",
            json!({ "reservationId": reservation_id, "token": token }),
            Some(token),
        )
        .await
    }

    async fn get_business_reservations(
        &self,
        token: &str,
        business_id: i64,
        status: StatusFilter,
    ) -> AppResult<Vec<Reservation>> {
        self.fetch_list(
            "GetBusinessReservations",
            queries::GET_BUSINESS_RESERVATIONS,
            "getBusinessReservations",
            json!({
                "businessId": business_id,
                "token": token,
                "status": backend_status(status),
            }),
            Some(token),
        )
        .await
    }

    async fn get_products_by_business(&self, business_id: i64) -> AppResult<Vec<Product>> {
        self.fetch_list(
            "GetProductsByBusiness",
            queries::GET_PRODUCTS_BY_BUSINESS,
            "getProductsByBusiness",
            json!({ "businessId": business_id }),
            None,
        )
        .await
    }

    async fn get_all_products(&self, limit: u32, offset: u32) -> AppResult<Vec<Product>> {
        self.fetch_list(
            "GetAllProducts",
            queries::GET_ALL_PRODUCTS,
            "getAllProducts",
            json!({ "limit": limit, "offset": offset }),
            None,
        )
        .await
    }

    async fn get_all_businesses(&self) -> AppResult<Vec<Business>> {
        self.fetch_list(
            "GetAllBusinesses",
            queries::GET_ALL_BUSINESSES,
            "getAllBusinesses",
            json!({}),
            None,
        )
        .await
    }

    async fn get_businesses_by_user(&self, user_id: i64) -> AppResult<Vec<Business>> {
        self.fetch_list(
            "GetBusinessesByUser",
            queries::GET_BUSINESSES_BY_USER,
            "getBusinessesByUser",
            json!({ "userId": user_id }),
            None,
        )
        .await
    }
}
