//! REST API layer

pub mod dto;
pub mod error;
pub mod handlers;
pub mod mapper;
pub mod routes;

pub use handlers::ResourceController;
pub use routes::{register_routes, resource_router, ResourceApiDoc};
