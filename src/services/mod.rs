pub mod business_service;
pub mod reservation_service;
