//! Reservation rules that need no network: the cancellation window, expiry,
//! presentation lookups, and the optimistic status patch.

use chrono::{DateTime, Utc};

use crate::models::{Reservation, ReservationStatus, normalize_status};

pub const CANCEL_WINDOW_MINUTES: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelBlock {
    ExpiredWindow,
    WrongStatus,
}

impl CancelBlock {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelBlock::ExpiredWindow => "expired_window",
            CancelBlock::WrongStatus => "wrong_status",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            CancelBlock::ExpiredWindow => "The 20 minute cancellation window has expired.",
            CancelBlock::WrongStatus => "Only pending reservations can be cancelled.",
        }
    }
}

/// Single answer to "may the consumer cancel this now?".
///
/// `minutes_left` is 0 whenever `eligible` is false, so callers cannot read a
/// positive countdown off a reservation they are not allowed to cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelEligibility {
    pub eligible: bool,
    pub minutes_left: i64,
    pub reason: Option<CancelBlock>,
}

/// Fractional minutes elapsed since creation. A creation time ahead of the
/// local clock counts as zero elapsed.
pub fn minutes_since(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed_ms = (now - created_at).num_milliseconds().max(0);
    elapsed_ms as f64 / 60_000.0
}

pub fn can_cancel(reservation: &Reservation, now: DateTime<Utc>) -> bool {
    reservation.status == ReservationStatus::Pending
        && minutes_since(reservation.created_at, now) < CANCEL_WINDOW_MINUTES as f64
}

/// Whole minutes left in the window. Ignores status; see [`cancel_eligibility`].
pub fn minutes_left_to_cancel(reservation: &Reservation, now: DateTime<Utc>) -> i64 {
    let left = CANCEL_WINDOW_MINUTES as f64 - minutes_since(reservation.created_at, now);
    left.floor().max(0.0) as i64
}

pub fn cancel_eligibility(reservation: &Reservation, now: DateTime<Utc>) -> CancelEligibility {
    let reason = if reservation.status != ReservationStatus::Pending {
        Some(CancelBlock::WrongStatus)
    } else if !can_cancel(reservation, now) {
        Some(CancelBlock::ExpiredWindow)
    } else {
        None
    };
    CancelEligibility {
        eligible: reason.is_none(),
        minutes_left: if reason.is_none() {
            minutes_left_to_cancel(reservation, now)
        } else {
            0
        },
        reason,
    }
}

pub fn is_expired(reservation: &Reservation, now: DateTime<Utc>) -> bool {
    reservation.expires_at.is_some_and(|at| now > at)
}

pub fn status_color(status: &str) -> &'static str {
    match normalize_status(status).as_str() {
        "PENDING" => "#B5A78E",
        "CONFIRMED" => "#794646",
        "PICKED_UP" => "#EBE5EB",
        "CANCELLED" => "#D2C0C0",
        _ => "#E5E5E5",
    }
}

pub fn status_label(status: &str) -> String {
    match normalize_status(status).as_str() {
        "PENDING" => "Pending".to_string(),
        "CONFIRMED" => "Confirmed".to_string(),
        "PICKED_UP" => "Picked up".to_string(),
        "CANCELLED" => "Cancelled".to_string(),
        "EXPIRED" => "Expired".to_string(),
        _ => status.to_string(),
    }
}

/// Patch one entry of a local list after the server accepted a transition.
///
/// Sets the terminal timestamp that belongs to `next` (and clears the other one),
/// leaves every other entry untouched, and refuses edges the state machine does
/// not have. Returns whether an entry changed.
pub fn apply_transition(
    reservations: &mut [Reservation],
    id: i64,
    next: ReservationStatus,
    at: DateTime<Utc>,
) -> bool {
    let Some(entry) = reservations.iter_mut().find(|r| r.id == id) else {
        return false;
    };
    if !entry.status.can_transition_to(next) {
        tracing::debug!(
            reservation_id = %id,
            from = %entry.status,
            to = %next,
            "skipping local patch for impossible transition"
        );
        return false;
    }

    entry.status = next;
    entry.updated_at = Some(at);
    match next {
        ReservationStatus::Cancelled => {
            entry.cancelled_at.get_or_insert(at);
            entry.picked_up_at = None;
        }
        ReservationStatus::PickedUp => {
            entry.picked_up_at.get_or_insert(at);
            entry.cancelled_at = None;
        }
        _ => {}
    }
    true
}

/// Settle a local entry on the copy the server returned after a mutation.
///
/// The server's status always wins. When the local copy was stale and the
/// edge could not be patched, the entry still adopts the server state, and
/// any terminal stamp the server left out is filled with `at`. Display data
/// already joined onto the entry is kept.
pub fn reconcile(reservations: &mut [Reservation], server: &Reservation, at: DateTime<Utc>) -> bool {
    let patched = apply_transition(reservations, server.id, server.status, at);
    let Some(entry) = reservations.iter_mut().find(|r| r.id == server.id) else {
        return false;
    };
    if !patched && entry.status != server.status {
        tracing::debug!(
            reservation_id = %server.id,
            local = %entry.status,
            server = %server.status,
            "local copy was stale, adopting server state"
        );
    }

    entry.status = server.status;
    entry.updated_at = server.updated_at.or(entry.updated_at).or(Some(at));
    entry.expires_at = server.expires_at.or(entry.expires_at);
    entry.cancelled_at = server.cancelled_at.or(entry.cancelled_at);
    entry.picked_up_at = server.picked_up_at.or(entry.picked_up_at);
    match entry.status {
        ReservationStatus::Cancelled => {
            entry.cancelled_at.get_or_insert(at);
            entry.picked_up_at = None;
        }
        ReservationStatus::PickedUp => {
            entry.picked_up_at.get_or_insert(at);
            entry.cancelled_at = None;
        }
        ReservationStatus::Pending | ReservationStatus::Confirmed => {
            entry.cancelled_at = None;
            entry.picked_up_at = None;
        }
        ReservationStatus::Expired => {}
    }
    if entry.product.is_none() {
        entry.product = server.product.clone();
    }
    true
}
