pub mod graphql;
pub mod reservations;
