// GraphQL documents for the reservation backend.

const RESERVATION_FIELDS: &str = "id userId productId outletId quantity status createdAt updatedAt expiresAt pickedUpAt cancelledAt";

pub const CREATE_RESERVATION: &str = "mutation CreateReservation($businessId: Int!, $productId: Int!, $token: String!, $quantity: Int!) { createReservation(businessId: $businessId, productId: $productId, token: $token, quantity: $quantity) { __FIELDS__ } }";

pub const GET_MY_RESERVATIONS: &str = "query GetMyReservations($token: String!, $status: String) { getMyReservations(token: $token, status: $status) { __FIELDS__ } }";

pub const CANCEL_RESERVATION: &str = "mutation CancelReservation($reservationId: Int!, $token: String!) { cancelReservation(reservationId: $reservationId, token: $token) { __FIELDS__ } }";

pub const UPDATE_RESERVATION_STATUS: &str = "mutation UpdateReservationStatus($reservationId: Int!, $token: String!, $status: String!) { updateReservationStatus(reservationId: $reservationId, token: $token, status: $status) { __FIELDS__ } }";

pub const MARK_AS_PICKED_UP: &str = "mutation MarkAsPickedUp($reservationId: Int!, $token: String!) { markReservationPickedUp(reservationId: $reservationId, token: $token) { __FIELDS__ } }";

pub const GET_BUSINESS_RESERVATIONS: &str = "query GetBusinessReservations($businessId: Int!, $token: String!, $status: String) { getBusinessReservations(businessId: $businessId, token: $token, status: $status) { __FIELDS__ } }";

pub const GET_PRODUCTS_BY_BUSINESS: &str = "query GetProductsByBusiness($businessId: Int!) { getProductsByBusiness(businessId: $businessId) { id businessId name description price discountedPrice stock imageUrl } }";

pub const GET_ALL_PRODUCTS: &str = "query GetAllProducts($limit: Int, $offset: Int) { getAllProducts(limit: $limit, offset: $offset) { id businessId name description price discountedPrice stock imageUrl } }";

pub const GET_ALL_BUSINESSES: &str = "query GetAllBusinesses { getAllBusinesses { id name description address phone latitude longitude isActive } }";

pub const GET_BUSINESSES_BY_USER: &str = "query GetBusinessesByUser($userId: Int!) { getBusinessesByUser(userId: $userId) { id name description address phone latitude longitude isActive } }";

/// Expand the shared reservation selection set into a document.
pub fn document(template: &str) -> String {
    template.replace("__FIELDS__", RESERVATION_FIELDS)
}
