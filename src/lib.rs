pub mod api;
pub mod clock;
pub mod config;
pub mod dto;
pub mod enrich;
pub mod error;
pub mod hooks;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod pollers;
pub mod services;
pub mod session;
pub mod state;
