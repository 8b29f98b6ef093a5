pub mod dto;
pub mod error;
pub mod ingress;
pub mod metrics;
pub mod routes;
pub mod webhook;

pub use ingress::{Ingress, Reply};
pub use routes::{build_router, ApiState};
