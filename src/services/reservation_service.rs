use crate::{
    dto::reservations::{CreateReservationInput, StatusFilter},
    enrich::enrich_reservations,
    error::{AppError, AppResult},
    models::{Reservation, ReservationStatus},
    session::require_token,
    state::AppState,
};

pub async fn create_reservation(
    state: &AppState,
    input: CreateReservationInput,
) -> AppResult<Reservation> {
    if input.quantity <= 0 {
        return Err(AppError::Validation(
            "Quantity must be greater than zero".into(),
        ));
    }
    let token = require_token(state.session.as_ref()).await?;

    let reservation = state
        .api
        .create_reservation(&token, &input)
        .await
        .inspect_err(|err| tracing::error!(error = %err, "create reservation failed"))?;

    tracing::info!(
        reservation_id = %reservation.id,
        product_id = %input.product_id,
        business_id = %input.business_id,
        quantity = %input.quantity,
        "reservation created"
    );
    Ok(reservation)
}

/// The consumer's own reservations, joined with the bulk product catalog.
///
/// The join is best effort: a failed catalog fetch returns the reservations
/// without product data.
pub async fn list_my_reservations(
    state: &AppState,
    status: StatusFilter,
) -> AppResult<Vec<Reservation>> {
    let token = require_token(state.session.as_ref()).await?;

    let reservations = state
        .api
        .get_my_reservations(&token, status)
        .await
        .inspect_err(|err| tracing::error!(error = %err, "fetch my reservations failed"))?;
    if reservations.is_empty() {
        return Ok(reservations);
    }

    match state.api.get_all_products(state.catalog_page_size, 0).await {
        Ok(products) => Ok(enrich_reservations(reservations, &products, &[])),
        Err(err) => {
            tracing::warn!(error = %err, "product catalog unavailable, returning bare reservations");
            Ok(reservations)
        }
    }
}

/// One of the consumer's reservations, joined with products and businesses.
///
/// There is no single-item endpoint: the consumer's list is fetched and
/// filtered locally.
pub async fn get_reservation(state: &AppState, id: i64) -> AppResult<Reservation> {
    let token = require_token(state.session.as_ref()).await?;

    let reservation = state
        .api
        .get_my_reservations(&token, None)
        .await?
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::NotFound("Reservation not found".into()))?;

    let (products, businesses) = tokio::join!(
        state.api.get_all_products(state.catalog_page_size, 0),
        state.api.get_all_businesses(),
    );
    match (products, businesses) {
        (Ok(products), Ok(businesses)) => {
            let mut enriched = enrich_reservations(vec![reservation], &products, &businesses);
            enriched
                .pop()
                .ok_or_else(|| AppError::Internal(anyhow::anyhow!("join dropped reservation {id}")))
        }
        (Err(err), _) | (_, Err(err)) => {
            tracing::warn!(
                reservation_id = %id,
                error = %err,
                "catalog unavailable, returning bare reservation"
            );
            Ok(reservation)
        }
    }
}

/// Server-side cancel. The 20 minute window is checked by callers before this.
pub async fn cancel_reservation(state: &AppState, id: i64) -> AppResult<Reservation> {
    let token = require_token(state.session.as_ref()).await?;
    let reservation = state
        .api
        .cancel_reservation(&token, id)
        .await
        .inspect_err(|err| tracing::error!(reservation_id = %id, error = %err, "cancel failed"))?;
    tracing::info!(reservation_id = %id, "reservation cancelled");
    Ok(reservation)
}

pub async fn confirm_reservation(state: &AppState, id: i64) -> AppResult<Reservation> {
    let token = require_token(state.session.as_ref()).await?;
    let reservation = state
        .api
        .update_reservation_status(&token, id, ReservationStatus::Confirmed)
        .await
        .inspect_err(|err| tracing::error!(reservation_id = %id, error = %err, "confirm failed"))?;
    tracing::info!(reservation_id = %id, "reservation confirmed");
    Ok(reservation)
}

pub async fn mark_picked_up(state: &AppState, id: i64) -> AppResult<Reservation> {
    let token = require_token(state.session.as_ref()).await?;
    let reservation = state
        .api
        .mark_reservation_picked_up(&token, id)
        .await
        .inspect_err(|err| {
            tracing::error!(reservation_id = %id, error = %err, "mark picked up failed")
        })?;
    tracing::info!(reservation_id = %id, "reservation picked up");
    Ok(reservation)
}

/// Reservations for one business, joined with that business's products only.
pub async fn list_business_reservations(
    state: &AppState,
    business_id: i64,
    status: StatusFilter,
) -> AppResult<Vec<Reservation>> {
    let token = require_token(state.session.as_ref()).await?;

    let reservations = state
        .api
        .get_business_reservations(&token, business_id, status)
        .await
        .inspect_err(|err| {
            tracing::error!(business_id = %business_id, error = %err, "fetch business reservations failed")
        })?;
    if reservations.is_empty() {
        return Ok(reservations);
    }

    match state.api.get_products_by_business(business_id).await {
        Ok(products) if products.is_empty() => {
            tracing::warn!(business_id = %business_id, "no products found for business");
            Ok(reservations)
        }
        Ok(products) => Ok(enrich_reservations(reservations, &products, &[])),
        Err(err) => {
            tracing::warn!(
                business_id = %business_id,
                error = %err,
                "product catalog unavailable, returning bare reservations"
            );
            Ok(reservations)
        }
    }
}
