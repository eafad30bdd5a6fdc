//! HTTP surface for the segment listing and statistics service.

pub mod rest;
pub mod server;

pub use rest::AppState;
pub use server::ApiServer;
